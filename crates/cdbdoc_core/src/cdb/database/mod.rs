use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;

use crate::cdb::load::{LoadOptions, LoadStats, load};
use crate::cdb::{BlobSource, CdbHeader, ClassRegistry, JsonRenderer, ObjectGraph, ObjectRecord, PersistentId, Result, StringTable, hash_path};

/// Conventional location of the material database inside the game data.
pub const DEFAULT_DATABASE_PATH: &str = "materials/materialsbeta.cdb";

/// Loaded material database.
///
/// Immutable after loading; lookups and JSON dumps borrow it shared.
#[derive(Debug)]
pub struct MaterialDatabase {
	header: CdbHeader,
	strings: StringTable,
	classes: ClassRegistry,
	graph: ObjectGraph,
	materials: HashMap<PersistentId, Vec<u32>>,
	stats: LoadStats,
}

impl MaterialDatabase {
	/// Load from raw `.cdb` bytes with default limits.
	pub fn load(bytes: &[u8]) -> Result<Self> {
		Self::load_with(bytes, &LoadOptions::default())
	}

	/// Load from raw `.cdb` bytes.
	pub fn load_with(bytes: &[u8], options: &LoadOptions) -> Result<Self> {
		let loaded = load(bytes, options)?;
		Ok(Self {
			header: loaded.header,
			strings: loaded.strings,
			classes: loaded.classes,
			graph: loaded.graph,
			materials: loaded.materials,
			stats: loaded.stats,
		})
	}

	/// Read and load a `.cdb` file from disk.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let bytes = std::fs::read(path)?;
		Self::load(&bytes)
	}

	/// Fetch `path` from a blob source and load it.
	pub fn open_from(source: &impl BlobSource, path: &str, options: &LoadOptions) -> Result<Self> {
		let bytes = source.read_blob(path)?;
		Self::load_with(&bytes, options)
	}

	/// dbIDs of the objects belonging to the material file at `path`.
	pub fn find(&self, path: &str) -> Option<&[u32]> {
		self.find_by_id(hash_path(path))
	}

	/// dbIDs of the objects whose root has persistent id `id`.
	pub fn find_by_id(&self, id: PersistentId) -> Option<&[u32]> {
		self.materials.get(&id).map(Vec::as_slice)
	}

	/// Objects belonging to `path`; empty for unknown paths.
	pub fn objects_for(&self, path: &str) -> Vec<&ObjectRecord> {
		self.find(path)
			.unwrap_or_default()
			.iter()
			.filter_map(|db_id| self.graph.get(*db_id))
			.collect()
	}

	/// Object by dbID.
	pub fn object(&self, db_id: u32) -> Option<&ObjectRecord> {
		self.graph.get(db_id)
	}

	/// JSON document for `path`, or `None` when the path is unknown.
	pub fn dump(&self, path: &str) -> Option<Value> {
		let objects = self.objects_for(path);
		if objects.is_empty() {
			return None;
		}
		Some(self.renderer().render_document(objects))
	}

	/// Pretty-printed JSON for `path`; empty when the path is unknown.
	pub fn dump_json(&self, path: &str) -> String {
		self.dump(path).and_then(|value| serde_json::to_string_pretty(&value).ok()).unwrap_or_default()
	}

	/// Renderer bound to this database.
	pub fn renderer(&self) -> JsonRenderer<'_> {
		JsonRenderer::new(&self.strings, &self.classes, &self.graph)
	}

	/// Persistent ids of every material root, sorted.
	pub fn material_ids(&self) -> Vec<PersistentId> {
		let mut ids: Vec<_> = self.materials.keys().copied().collect();
		ids.sort_unstable();
		ids
	}

	/// Parsed file header.
	pub fn header(&self) -> CdbHeader {
		self.header
	}

	/// Name table.
	pub fn strings(&self) -> &StringTable {
		&self.strings
	}

	/// Declared classes.
	pub fn classes(&self) -> &ClassRegistry {
		&self.classes
	}

	/// Object graph.
	pub fn graph(&self) -> &ObjectGraph {
		&self.graph
	}

	/// Load counters.
	pub fn stats(&self) -> LoadStats {
		self.stats
	}
}
