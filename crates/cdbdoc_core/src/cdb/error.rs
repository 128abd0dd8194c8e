use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, CdbError>;

/// Errors produced while reading, decoding, and resolving `.cdb` data.
#[derive(Debug, Error)]
pub enum CdbError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// File does not start with a `BETH` header chunk of the expected size.
	#[error("invalid header (magic={magic:?})")]
	InvalidHeader {
		/// First up-to-4 bytes of the stream.
		magic: [u8; 4],
	},
	/// Header declared a version this reader does not understand.
	#[error("unsupported cdb version {version} (expected 4)")]
	UnsupportedVersion {
		/// Parsed version field.
		version: u32,
	},
	/// Not enough bytes remained for a requested read.
	#[error("unexpected eof at offset {at}, need {need} bytes, remaining {rem}")]
	UnexpectedEof {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// A nested value required a specific wrapper chunk that was not next in the stream.
	#[error("unexpected chunk at offset {at}: expected {expected}, got {got}")]
	UnexpectedChunkKind {
		/// Accepted chunk kind(s).
		expected: &'static str,
		/// Kind tag actually found, or `EOF`.
		got: String,
		/// File offset of the offending chunk header.
		at: usize,
	},
	/// `USER`/`USRD` chunk declared a class other than the one being decoded.
	#[error("user chunk at offset {at} declares {got}, expected {expected}")]
	UserTypeMismatch {
		/// Class name the decoder expected.
		expected: String,
		/// Class name found in the chunk.
		got: String,
		/// File offset of the user chunk payload.
		at: usize,
	},
	/// `CLAS` chunk names a predefined type or carries an invalid field name.
	#[error("invalid class definition at offset {at}: {reason}")]
	InvalidClassDefinition {
		/// File offset of the class payload.
		at: usize,
		/// Which part of the definition was rejected.
		reason: &'static str,
	},
	/// A second string table chunk was found.
	#[error("duplicate STRT chunk at offset {at}")]
	DuplicateStringTable {
		/// File offset of the second table.
		at: usize,
	},
	/// List or map element count exceeded the configured limit.
	#[error("list too large at offset {at}: count={count}, max={max}")]
	ListTooLarge {
		/// Declared element count.
		count: usize,
		/// Maximum permitted count.
		max: usize,
		/// File offset of the list chunk payload.
		at: usize,
	},
	/// Decoder recursion depth exceeded configured limit.
	#[error("decode depth exceeded at offset {at} (max={max_depth})")]
	DecodeDepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
		/// Offset where decoding was attempted.
		at: usize,
	},
	/// Base-object chain loops back on itself.
	#[error("cyclic inheritance through object {db_id}")]
	CyclicInheritance {
		/// Object at which the cycle was detected.
		db_id: u32,
	},
	/// Base-object chain is longer than the configured limit.
	#[error("inheritance chain of object {db_id} exceeds {max} levels")]
	InheritanceTooDeep {
		/// Object whose chain was being resolved.
		db_id: u32,
		/// Configured chain ceiling.
		max: usize,
	},
	/// Requested class is not defined in the database.
	#[error("class not found: {name}")]
	ClassNotFound {
		/// Requested class name.
		name: String,
	},
}
