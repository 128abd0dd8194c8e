//! Public library API for reading Starfield component database (`.cdb`) files.

/// CDB chunk parsing, schema-driven decoding, inheritance resolution, and JSON export.
pub mod cdb;
