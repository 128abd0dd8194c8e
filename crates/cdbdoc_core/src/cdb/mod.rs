mod bytes;
mod chunk;
mod class;
mod database;
mod decode;
mod error;
mod field;
mod header;
mod inherit;
mod json;
mod listing;
mod load;
mod object;
mod resource;
mod source;
mod strings;
mod value;

/// Bounded little-endian byte cursor.
pub use bytes::Cursor;
/// Chunk container and iterator types.
pub use chunk::{Chunk, ChunkKind, ChunkReader};
/// Class schema registry types.
pub use class::{ClassField, ClassRegistry, ClassSchema, USER_DEFINED_FLAG, parse_class_chunk};
/// Database facade and entry points.
pub use database::{DEFAULT_DATABASE_PATH, MaterialDatabase};
/// Schema-driven value decoding.
pub use decode::{DecodeOptions, Primitive, TypeKind, ValueDecoder};
/// Error and result aliases.
pub use error::{CdbError, Result};
/// Diff/full field-number streams.
pub use field::FieldCursor;
/// File header representation.
pub use header::CdbHeader;
/// Inheritance materialization.
pub use inherit::resolve_inheritance;
/// JSON rendering of value trees and objects.
pub use json::{JsonRenderer, format_double, format_float};
/// Raw chunk listing for debugging.
pub use listing::{ChunkDetail, ChunkListing, ChunkSummary, scan_chunks};
/// Load-pass configuration and statistics.
pub use load::{LoadOptions, LoadStats};
/// Object graph types.
pub use object::{ComponentKey, Inheritance, MATERIAL_EXT, ObjectGraph, ObjectRecord, PersistentId, is_root_placeholder};
/// Resource path hashing.
pub use resource::{crc32_lowercase, hash_path};
/// Blob providers for locating database files.
pub use source::{BlobSource, DirectorySource};
/// String table and interned type identifiers.
pub use strings::{StringTable, TypeId};
/// Decoded runtime value types.
pub use value::{StructNode, ValueNode};
