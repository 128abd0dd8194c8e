//! Shared test helpers for workspace crates.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Resolve the workspace root path.
pub fn workspace_root() -> PathBuf {
	let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
	manifest_dir
		.join("..")
		.join("..")
		.canonicalize()
		.unwrap_or_else(|_| manifest_dir.join("..").join(".."))
}

/// Resolve the workspace target directory.
pub fn target_dir() -> PathBuf {
	std::env::var_os("CARGO_TARGET_DIR")
		.map(PathBuf::from)
		.unwrap_or_else(|| workspace_root().join("target"))
}

/// Create a fresh scratch directory under the target directory.
pub fn scratch_dir(name: &str) -> PathBuf {
	let dir = target_dir().join("cdbdoc-scratch").join(format!("{name}-{}", std::process::id()));
	let _ = std::fs::remove_dir_all(&dir);
	std::fs::create_dir_all(&dir).expect("scratch dir is creatable");
	dir
}

const PREDEFINED: [&str; 19] = [
	"None", "String", "List", "Map", "Ref", "", "", "Int8", "UInt8", "Int16", "UInt16", "Int32", "UInt32", "Int64", "UInt64", "Bool", "Float", "Double", "Unknown",
];

/// On-disk string reference of predefined type `id` (`0..=18`).
pub fn predefined_ref(id: u32) -> u32 {
	(id as i32 - 255) as u32
}

/// One `ObjectInfo` index entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectEntry {
	/// Object id.
	pub db_id: u32,
	/// Base object id, `0` for none.
	pub base: u32,
	/// Directory CRC.
	pub dir: u32,
	/// Base-name CRC.
	pub file: u32,
	/// Packed extension.
	pub ext: u32,
	/// `HasData` byte.
	pub has_data: bool,
}

/// Little-endian payload writer.
#[derive(Debug, Clone, Default)]
pub struct Payload(Vec<u8>);

impl Payload {
	/// Empty payload.
	pub fn new() -> Self {
		Self::default()
	}

	/// Append raw bytes.
	pub fn raw(mut self, bytes: &[u8]) -> Self {
		self.0.extend_from_slice(bytes);
		self
	}

	/// Append a byte.
	pub fn u8(self, value: u8) -> Self {
		self.raw(&[value])
	}

	/// Append a `u16`.
	pub fn u16(self, value: u16) -> Self {
		self.raw(&value.to_le_bytes())
	}

	/// Append a `u32`.
	pub fn u32(self, value: u32) -> Self {
		self.raw(&value.to_le_bytes())
	}

	/// Append an `i32`.
	pub fn i32(self, value: i32) -> Self {
		self.raw(&value.to_le_bytes())
	}

	/// Append a `u64`.
	pub fn u64(self, value: u64) -> Self {
		self.raw(&value.to_le_bytes())
	}

	/// Append an `f32`.
	pub fn f32(self, value: f32) -> Self {
		self.raw(&value.to_le_bytes())
	}

	/// Append an `f64`.
	pub fn f64(self, value: f64) -> Self {
		self.raw(&value.to_le_bytes())
	}

	/// Append a boolean byte.
	pub fn bool(self, value: bool) -> Self {
		self.u8(u8::from(value))
	}

	/// Append a `u16`-length-prefixed string.
	pub fn str(self, value: &str) -> Self {
		self.u16(value.len() as u16).raw(value.as_bytes())
	}

	/// Append a diff field number.
	pub fn field(self, index: u16) -> Self {
		self.u16(index)
	}

	/// Append the diff stream terminator.
	pub fn end_fields(self) -> Self {
		self.u16(0xFFFF)
	}

	/// Finished bytes.
	pub fn bytes(self) -> Vec<u8> {
		self.0
	}
}

/// Builder for synthetic `.cdb` files.
///
/// Names passed as types resolve to predefined references when they match a
/// predefined type name (`"Float"`, `"List"`, ...) and are interned into the
/// `STRT` chunk otherwise.
#[derive(Debug, Clone, Default)]
pub struct CdbBuilder {
	strings: Vec<u8>,
	offsets: HashMap<String, u32>,
	chunks: Vec<([u8; 4], Vec<u8>)>,
}

impl CdbBuilder {
	/// Empty file.
	pub fn new() -> Self {
		Self::default()
	}

	/// Intern `name` and return its string-table offset.
	pub fn str_ref(&mut self, name: &str) -> u32 {
		if let Some(offset) = self.offsets.get(name) {
			return *offset;
		}
		let offset = self.strings.len() as u32;
		self.strings.extend_from_slice(name.as_bytes());
		self.strings.push(0);
		self.offsets.insert(name.to_owned(), offset);
		offset
	}

	/// Reference for a type name, predefined or interned.
	pub fn type_ref(&mut self, name: &str) -> u32 {
		match PREDEFINED.iter().position(|predefined| !predefined.is_empty() && *predefined == name) {
			Some(id) => predefined_ref(id as u32),
			None => self.str_ref(name),
		}
	}

	/// Append a raw chunk.
	pub fn chunk(&mut self, tag: &[u8; 4], payload: Vec<u8>) -> &mut Self {
		self.chunks.push((*tag, payload));
		self
	}

	/// Append a `CLAS` chunk. Flag bit `4` marks user-defined classes.
	pub fn class(&mut self, name: &str, flags: u16, fields: &[(&str, &str)]) -> &mut Self {
		let mut payload = Payload::new().u32(self.str_ref(name)).u32(0).u16(flags).u16(fields.len() as u16);
		for (idx, (field_name, field_type)) in fields.iter().enumerate() {
			payload = payload
				.u32(self.str_ref(field_name))
				.u32(self.type_ref(field_type))
				.u16((idx * 4) as u16)
				.u16(4);
		}
		self.chunk(b"CLAS", payload.bytes())
	}

	/// Append an `ObjectInfo` index list.
	pub fn object_info(&mut self, objects: &[ObjectEntry]) -> &mut Self {
		let mut payload = Payload::new()
			.u32(self.str_ref("BSComponentDB2::DBFileIndex::ObjectInfo"))
			.u32(objects.len() as u32);
		for object in objects {
			payload = payload
				.u32(object.file)
				.u32(object.ext)
				.u32(object.dir)
				.u32(object.db_id)
				.u32(object.base)
				.bool(object.has_data);
		}
		self.chunk(b"LIST", payload.bytes())
	}

	/// Append a `ComponentInfo` index list of `(db_id, component_index)` slots.
	pub fn component_info(&mut self, slots: &[(u32, u16)]) -> &mut Self {
		let mut payload = Payload::new()
			.u32(self.str_ref("BSComponentDB2::DBFileIndex::ComponentInfo"))
			.u32(slots.len() as u32);
		for (db_id, index) in slots {
			payload = payload.u32(*db_id).u16(*index).u16(0);
		}
		self.chunk(b"LIST", payload.bytes())
	}

	/// Append an `EdgeInfo` index list of `(source, target)` edges.
	pub fn edge_info(&mut self, edges: &[(u32, u32)]) -> &mut Self {
		let mut payload = Payload::new().u32(self.str_ref("BSComponentDB2::DBFileIndex::EdgeInfo")).u32(edges.len() as u32);
		for (source, target) in edges {
			payload = payload.u32(*source).u32(*target).u16(0).u16(0);
		}
		self.chunk(b"LIST", payload.bytes())
	}

	/// Append a full component body of class `class`.
	pub fn objt(&mut self, class: &str, body: Payload) -> &mut Self {
		let payload = Payload::new().u32(self.type_ref(class)).raw(&body.bytes()).bytes();
		self.chunk(b"OBJT", payload)
	}

	/// Append a differential component body of class `class`.
	pub fn diff(&mut self, class: &str, body: Payload) -> &mut Self {
		let payload = Payload::new().u32(self.type_ref(class)).raw(&body.bytes()).bytes();
		self.chunk(b"DIFF", payload)
	}

	/// Append a `USER` wrapper; `stored` equal to `declared` means a field stream follows.
	pub fn user(&mut self, declared: &str, stored: &str, body: Payload) -> &mut Self {
		let payload = Payload::new().u32(self.type_ref(declared)).u32(self.type_ref(stored)).raw(&body.bytes()).bytes();
		self.chunk(b"USER", payload)
	}

	/// Append a `USRD` wrapper.
	pub fn usrd(&mut self, declared: &str, stored: &str, body: Payload) -> &mut Self {
		let payload = Payload::new().u32(self.type_ref(declared)).u32(self.type_ref(stored)).raw(&body.bytes()).bytes();
		self.chunk(b"USRD", payload)
	}

	/// Append a nested `LIST` chunk.
	pub fn list(&mut self, element: &str, count: u32, body: Payload) -> &mut Self {
		let payload = Payload::new().u32(self.type_ref(element)).u32(count).raw(&body.bytes()).bytes();
		self.chunk(b"LIST", payload)
	}

	/// Append a nested `MAPC` chunk.
	pub fn map(&mut self, key: &str, value: &str, count: u32, body: Payload) -> &mut Self {
		let payload = Payload::new()
			.u32(self.type_ref(key))
			.u32(self.type_ref(value))
			.u32(count)
			.raw(&body.bytes())
			.bytes();
		self.chunk(b"MAPC", payload)
	}

	/// Serialize `BETH`, `STRT` and the appended chunks.
	pub fn build(&self) -> Vec<u8> {
		let mut out = Vec::new();
		out.extend_from_slice(b"BETH");
		out.extend_from_slice(&8_u32.to_le_bytes());
		out.extend_from_slice(&4_u32.to_le_bytes());
		out.extend_from_slice(&(self.chunks.len() as u32 + 2).to_le_bytes());
		push_chunk(&mut out, b"STRT", &self.strings);
		for (tag, payload) in &self.chunks {
			push_chunk(&mut out, tag, payload);
		}
		out
	}
}

fn push_chunk(out: &mut Vec<u8>, tag: &[u8; 4], payload: &[u8]) {
	out.extend_from_slice(tag);
	out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
	out.extend_from_slice(payload);
}
