use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use crate::cdb::{TypeId, ValueNode};

/// Packed extension marking a material-file root (`"mat\0"`).
pub const MATERIAL_EXT: u32 = 0x0074_616D;

/// Highest reserved root-placeholder dbID.
const ROOT_PLACEHOLDER_MAX: u32 = 7;

/// True for the reserved ids `0..=7`, which never inherit.
pub fn is_root_placeholder(db_id: u32) -> bool {
	db_id <= ROOT_PLACEHOLDER_MAX
}

/// Hashed resource identity of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PersistentId {
	/// CRC of the lowercased directory.
	pub dir: u32,
	/// CRC of the lowercased base name.
	pub file: u32,
	/// Packed lowercased extension.
	pub ext: u32,
}

impl PersistentId {
	/// True when the extension is `mat`.
	pub fn is_material(&self) -> bool {
		self.ext == MATERIAL_EXT
	}
}

impl fmt::Display for PersistentId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "res:{:08X}:{:08X}:{:08X}", self.dir, self.file, self.ext)
	}
}

/// Component slot key: component class and per-object index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentKey {
	/// Component class id.
	pub component_type: TypeId,
	/// Index among components of the same object.
	pub index: u32,
}

/// Inheritance state of one object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inheritance {
	/// Base components have not been copied yet.
	Pending {
		/// Base object id.
		base: u32,
	},
	/// Nothing left to inherit.
	Resolved,
}

/// One object of the database.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRecord {
	/// Object id.
	pub db_id: u32,
	/// Resource identity.
	pub persistent_id: PersistentId,
	/// `HasData` flag from the index, informational.
	pub has_data: bool,
	/// Parent object set by an edge.
	pub parent: Option<u32>,
	/// Inheritance state.
	pub inheritance: Inheritance,
	/// Root placeholder reached through the base chain, once known.
	pub root_base: Option<u32>,
	/// Decoded components in key order.
	pub components: BTreeMap<ComponentKey, ValueNode>,
}

impl ObjectRecord {
	/// New record without components.
	///
	/// Objects that are themselves root placeholders, or whose base is one,
	/// start resolved.
	pub fn new(db_id: u32, persistent_id: PersistentId, base_object: u32, has_data: bool) -> Self {
		let inheritance = if is_root_placeholder(db_id) || is_root_placeholder(base_object) {
			Inheritance::Resolved
		} else {
			Inheritance::Pending { base: base_object }
		};
		let root_base = (base_object != 0 && is_root_placeholder(base_object) && !is_root_placeholder(db_id)).then_some(base_object);
		Self {
			db_id,
			persistent_id,
			has_data,
			parent: None,
			inheritance,
			root_base,
			components: BTreeMap::new(),
		}
	}

	/// Base object still to be copied; `None` once resolved.
	pub fn base_object(&self) -> Option<u32> {
		match self.inheritance {
			Inheritance::Pending { base } => Some(base),
			Inheritance::Resolved => None,
		}
	}

	/// Component by key.
	pub fn component(&self, key: ComponentKey) -> Option<&ValueNode> {
		self.components.get(&key)
	}
}

/// Arena of object records indexed by dbID.
///
/// Records keep their discovery order.
#[derive(Debug, Clone, Default)]
pub struct ObjectGraph {
	records: Vec<ObjectRecord>,
	index: HashMap<u32, usize>,
}

impl ObjectGraph {
	/// Empty graph.
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert a record, replacing one with the same dbID in place.
	pub fn insert(&mut self, record: ObjectRecord) {
		match self.index.get(&record.db_id) {
			Some(&slot) => self.records[slot] = record,
			None => {
				self.index.insert(record.db_id, self.records.len());
				self.records.push(record);
			}
		}
	}

	/// Record by dbID.
	pub fn get(&self, db_id: u32) -> Option<&ObjectRecord> {
		self.index.get(&db_id).map(|&slot| &self.records[slot])
	}

	/// Mutable record by dbID.
	pub fn get_mut(&mut self, db_id: u32) -> Option<&mut ObjectRecord> {
		self.index.get(&db_id).map(|&slot| &mut self.records[slot])
	}

	/// True when `db_id` is known.
	pub fn contains(&self, db_id: u32) -> bool {
		self.index.contains_key(&db_id)
	}

	/// Number of records.
	pub fn len(&self) -> usize {
		self.records.len()
	}

	/// True when the graph holds no records.
	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	/// Records in discovery order.
	pub fn iter(&self) -> impl Iterator<Item = &ObjectRecord> {
		self.records.iter()
	}

	/// Set `source.parent = target` when both exist.
	pub fn set_parent(&mut self, source: u32, target: u32) -> bool {
		if !self.contains(target) {
			return false;
		}
		match self.get_mut(source) {
			Some(record) => {
				record.parent = Some(target);
				true
			}
			None => false,
		}
	}

	/// Follow parent links to the top; `None` for unknown ids and cycles.
	pub fn root_of(&self, db_id: u32) -> Option<&ObjectRecord> {
		let mut seen = HashSet::new();
		let mut current = self.get(db_id)?;
		while let Some(parent) = current.parent {
			if !seen.insert(current.db_id) {
				return None;
			}
			current = self.get(parent)?;
		}
		Some(current)
	}

	/// Remove and return one component slot, leaving the key absent.
	pub fn take_component(&mut self, db_id: u32, key: ComponentKey) -> ValueNode {
		self.get_mut(db_id).and_then(|record| record.components.remove(&key)).unwrap_or_default()
	}
}

#[cfg(test)]
mod tests {
	use super::{Inheritance, ObjectGraph, ObjectRecord, PersistentId};

	fn record(db_id: u32, base: u32) -> ObjectRecord {
		ObjectRecord::new(db_id, PersistentId::default(), base, true)
	}

	#[test]
	fn placeholders_start_resolved() {
		assert_eq!(record(3, 10).inheritance, Inheritance::Resolved);
		assert_eq!(record(3, 10).root_base, None);
		let derived = record(20, 4);
		assert_eq!(derived.inheritance, Inheritance::Resolved);
		assert_eq!(derived.root_base, Some(4));
		assert_eq!(record(20, 0).root_base, None);
		assert_eq!(record(20, 30).base_object(), Some(30));
	}

	#[test]
	fn display_is_dir_file_ext() {
		let id = PersistentId {
			dir: 0x1D95_562F,
			file: 0x7EA3_660C,
			ext: 0x0074_616D,
		};
		assert_eq!(id.to_string(), "res:1D95562F:7EA3660C:0074616D");
		assert!(id.is_material());
	}

	#[test]
	fn root_walk_and_cycles() {
		let mut graph = ObjectGraph::new();
		for db_id in [10, 11, 12, 20, 21] {
			graph.insert(record(db_id, 0));
		}
		assert!(graph.set_parent(12, 11));
		assert!(graph.set_parent(11, 10));
		assert!(!graph.set_parent(12, 99));
		assert!(!graph.set_parent(99, 10));
		assert_eq!(graph.root_of(12).map(|root| root.db_id), Some(10));
		assert_eq!(graph.root_of(10).map(|root| root.db_id), Some(10));

		assert!(graph.set_parent(20, 21));
		assert!(graph.set_parent(21, 20));
		assert!(graph.root_of(20).is_none());
	}

	#[test]
	fn insert_replaces_in_place() {
		let mut graph = ObjectGraph::new();
		graph.insert(record(10, 0));
		graph.insert(record(11, 0));
		graph.insert(ObjectRecord::new(10, PersistentId { dir: 1, file: 2, ext: 3 }, 0, false));
		let order: Vec<_> = graph.iter().map(|record| record.db_id).collect();
		assert_eq!(order, vec![10, 11]);
		assert_eq!(graph.get(10).map(|record| record.persistent_id.ext), Some(3));
	}
}
