use std::collections::HashMap;
use std::fmt;

use crate::cdb::{Cursor, Result};

/// Interned name or type identifier.
///
/// Ids `0..=18` are the predefined types; ids from [`TypeId::FIRST_INTERNED`]
/// upward are strings from the file's `STRT` chunk, numbered in name order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
	/// No value.
	pub const NONE: Self = Self(0);
	/// Length-prefixed string.
	pub const STRING: Self = Self(1);
	/// Ordered list carried by a nested `LIST` chunk.
	pub const LIST: Self = Self(2);
	/// Ordered map carried by a nested `MAPC` chunk.
	pub const MAP: Self = Self(3);
	/// Typed reference to one child value.
	pub const REF: Self = Self(4);
	/// Signed 8-bit integer.
	pub const INT8: Self = Self(7);
	/// Unsigned 8-bit integer.
	pub const UINT8: Self = Self(8);
	/// Signed 16-bit integer.
	pub const INT16: Self = Self(9);
	/// Unsigned 16-bit integer.
	pub const UINT16: Self = Self(10);
	/// Signed 32-bit integer.
	pub const INT32: Self = Self(11);
	/// Unsigned 32-bit integer.
	pub const UINT32: Self = Self(12);
	/// Signed 64-bit integer.
	pub const INT64: Self = Self(13);
	/// Unsigned 64-bit integer.
	pub const UINT64: Self = Self(14);
	/// One-byte boolean.
	pub const BOOL: Self = Self(15);
	/// 32-bit IEEE754 float.
	pub const FLOAT: Self = Self(16);
	/// 64-bit IEEE754 float.
	pub const DOUBLE: Self = Self(17);
	/// Sentinel for anything that does not resolve.
	pub const UNKNOWN: Self = Self(18);
	/// First id assigned to a string-table entry.
	pub const FIRST_INTERNED: u32 = 19;

	/// True for the predefined ids below [`TypeId::UNKNOWN`].
	pub fn is_primitive(self) -> bool {
		self.0 < Self::UNKNOWN.0
	}

	/// True for ids that come from the string table.
	pub fn is_interned(self) -> bool {
		self.0 >= Self::FIRST_INTERNED
	}

	/// True for the fixed-width scalar ids (`Int8..=Double`) and `Unknown`.
	pub fn is_numeric(self) -> bool {
		(Self::INT8.0..=Self::UNKNOWN.0).contains(&self.0)
	}
}

const PREDEFINED: [&str; TypeId::FIRST_INTERNED as usize] = [
	"None", "String", "List", "Map", "Ref", "<reserved>", "<reserved>", "Int8", "UInt8", "Int16", "UInt16", "Int32", "UInt32", "Int64", "UInt64", "Bool", "Float", "Double", "Unknown",
];

const PREDEFINED_REF_MIN: i32 = -255;
const PREDEFINED_REF_MAX: i32 = -237;

/// Name of the index list carrying object identities.
pub const OBJECT_INFO_CLASS: &str = "BSComponentDB2::DBFileIndex::ObjectInfo";
/// Name of the index list carrying component slots.
pub const COMPONENT_INFO_CLASS: &str = "BSComponentDB2::DBFileIndex::ComponentInfo";
/// Name of the index list carrying parent edges.
pub const EDGE_INFO_CLASS: &str = "BSComponentDB2::DBFileIndex::EdgeInfo";
/// Name of the index list carrying component type descriptions.
pub const COMPONENT_TYPE_INFO_CLASS: &str = "BSComponentDB2::DBFileIndex::ComponentTypeInfo";
/// Struct whose first field is a dbID resolved to a resource reference.
pub const DB_ID_CLASS: &str = "BSComponentDB2::ID";

impl fmt::Display for TypeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match PREDEFINED.get(self.0 as usize) {
			Some(name) => f.write_str(name),
			None => write!(f, "#{}", self.0),
		}
	}
}

/// Name table built from the `STRT` chunk.
#[derive(Debug, Clone)]
pub struct StringTable {
	names: Vec<Box<str>>,
	by_offset: HashMap<u32, TypeId>,
	by_name: HashMap<Box<str>, TypeId>,
}

impl Default for StringTable {
	fn default() -> Self {
		let names: Vec<Box<str>> = PREDEFINED.iter().map(|name| Box::from(*name)).collect();
		let by_name = names
			.iter()
			.enumerate()
			.filter(|(idx, _)| *idx != 5 && *idx != 6)
			.map(|(idx, name)| (name.clone(), TypeId(idx as u32)))
			.collect();
		Self {
			names,
			by_offset: HashMap::new(),
			by_name,
		}
	}
}

impl StringTable {
	/// Parse concatenated NUL-terminated strings.
	///
	/// Distinct names are interned in sorted order so that id order equals
	/// name order. An unterminated tail is kept as a final string; empty
	/// strings resolve to [`TypeId::UNKNOWN`].
	pub fn parse(payload: &[u8]) -> Self {
		let mut entries: Vec<(u32, String)> = Vec::new();
		let mut start = 0_usize;
		while start < payload.len() {
			let end = payload[start..].iter().position(|byte| *byte == 0).map_or(payload.len(), |rel| start + rel);
			entries.push((start as u32, String::from_utf8_lossy(&payload[start..end]).into_owned()));
			start = end + 1;
		}

		let mut sorted: Vec<&str> = entries.iter().map(|(_, name)| name.as_str()).filter(|name| !name.is_empty()).collect();
		sorted.sort_unstable();
		sorted.dedup();

		let mut table = Self::default();
		for name in sorted {
			let id = TypeId(table.names.len() as u32);
			table.names.push(Box::from(name));
			table.by_name.insert(Box::from(name), id);
		}

		for (offset, name) in &entries {
			let id = table.by_name.get(name.as_str()).copied().filter(|id| id.is_interned()).unwrap_or(TypeId::UNKNOWN);
			table.by_offset.insert(*offset, id);
		}

		table
	}

	/// Map a raw on-disk string reference to an id.
	pub fn resolve(&self, raw: u32) -> TypeId {
		let signed = raw as i32;
		if (PREDEFINED_REF_MIN..=PREDEFINED_REF_MAX).contains(&signed) {
			return TypeId((signed - PREDEFINED_REF_MIN) as u32);
		}
		self.by_offset.get(&raw).copied().unwrap_or(TypeId::UNKNOWN)
	}

	/// Read a `u32` string reference and resolve it.
	pub fn read_ref(&self, cursor: &mut Cursor<'_>) -> Result<TypeId> {
		Ok(self.resolve(cursor.read_u32_le()?))
	}

	/// Return the name for `id`, or `"<unknown>"` when out of range.
	pub fn name(&self, id: TypeId) -> &str {
		self.names.get(id.0 as usize).map_or("<unknown>", |name| &**name)
	}

	/// Find the id of an exact name.
	pub fn find(&self, name: &str) -> Option<TypeId> {
		self.by_name.get(name).copied()
	}

	/// Number of ids, predefined block included.
	pub fn len(&self) -> usize {
		self.names.len()
	}

	/// True when no string-table entries were interned.
	pub fn is_empty(&self) -> bool {
		self.names.len() == TypeId::FIRST_INTERNED as usize
	}
}

#[cfg(test)]
mod tests {
	use super::{StringTable, TypeId};

	fn predefined_ref(id: u32) -> u32 {
		(id as i32 - 255) as u32
	}

	#[test]
	fn predefined_refs_map_to_fixed_ids() {
		let table = StringTable::default();
		assert_eq!(table.resolve(predefined_ref(0)), TypeId::NONE);
		assert_eq!(table.resolve(predefined_ref(16)), TypeId::FLOAT);
		assert_eq!(table.resolve(predefined_ref(18)), TypeId::UNKNOWN);
		assert_eq!(table.resolve((-236_i32) as u32), TypeId::UNKNOWN);
		assert_eq!(table.resolve((-256_i32) as u32), TypeId::UNKNOWN);
		assert_eq!(table.name(TypeId::FLOAT), "Float");
	}

	#[test]
	fn interns_in_name_order() {
		let table = StringTable::parse(b"Zeta\0Alpha\0\0Mid\0Alpha\0");
		let zeta = table.resolve(0);
		let alpha = table.resolve(5);
		let mid = table.resolve(12);
		assert!(alpha < mid && mid < zeta);
		assert_eq!(alpha.0, TypeId::FIRST_INTERNED);
		assert_eq!(table.resolve(16), alpha);
		assert_eq!(table.resolve(11), TypeId::UNKNOWN);
		assert_eq!(table.resolve(3), TypeId::UNKNOWN);
		assert_eq!(table.name(mid), "Mid");
		assert_eq!(table.find("Zeta"), Some(zeta));
		assert_eq!(table.find("Float"), Some(TypeId::FLOAT));
		assert_eq!(table.find("<reserved>"), None);
	}

	#[test]
	fn keeps_unterminated_tail() {
		let table = StringTable::parse(b"One\0Two");
		assert_eq!(table.name(table.resolve(4)), "Two");
		assert!(!table.is_empty());
		assert!(StringTable::parse(b"").is_empty());
	}
}
