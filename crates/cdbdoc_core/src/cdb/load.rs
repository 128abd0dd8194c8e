use std::collections::{HashMap, VecDeque};

use tracing::{debug, info, warn};

use crate::cdb::strings::{COMPONENT_INFO_CLASS, COMPONENT_TYPE_INFO_CLASS, EDGE_INFO_CLASS, OBJECT_INFO_CLASS};
use crate::cdb::{
	CdbError, CdbHeader, Chunk, ChunkKind, ChunkReader, ClassRegistry, ComponentKey, Cursor, DecodeOptions, ObjectGraph, ObjectRecord, PersistentId,
	Result, StringTable, TypeId, ValueDecoder, ValueNode, parse_class_chunk, resolve_inheritance,
};

const OBJECT_INFO_SIZE: usize = 21;

/// Limits applied while loading a database.
#[derive(Debug, Clone)]
pub struct LoadOptions {
	/// Maximum nested value depth.
	pub max_depth: u32,
	/// Maximum elements per list or map.
	pub max_list_len: usize,
	/// Maximum base-object chain length.
	pub max_inheritance_depth: usize,
}

impl Default for LoadOptions {
	fn default() -> Self {
		let decode = DecodeOptions::default();
		Self {
			max_depth: decode.max_depth,
			max_list_len: decode.max_list_len,
			max_inheritance_depth: 1024,
		}
	}
}

impl LoadOptions {
	/// Preset with tight limits for untrusted or fuzzed input.
	pub fn strict() -> Self {
		Self {
			max_depth: 16,
			max_list_len: 65_536,
			max_inheritance_depth: 64,
		}
	}

	/// Value decoder limits derived from these options.
	pub fn decode_options(&self) -> DecodeOptions {
		DecodeOptions {
			max_depth: self.max_depth,
			max_list_len: self.max_list_len,
		}
	}
}

/// Counters collected during one load pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
	/// Chunks read after the header.
	pub chunks: usize,
	/// `CLAS` chunks that defined a class.
	pub classes: usize,
	/// Component bodies decoded into an object.
	pub components: usize,
	/// Component bodies skipped (no slot, unknown object, predefined class).
	pub skipped_bodies: usize,
	/// Chunks of an unrecognized kind, or wrappers found at top level.
	pub skipped_chunks: usize,
	/// Objects with no reachable root because of a parent cycle.
	pub orphaned: usize,
}

/// Everything produced by one load pass.
#[derive(Debug)]
pub(crate) struct Loaded {
	pub header: CdbHeader,
	pub strings: StringTable,
	pub classes: ClassRegistry,
	pub graph: ObjectGraph,
	pub materials: HashMap<PersistentId, Vec<u32>>,
	pub stats: LoadStats,
}

/// Stream all chunks once, building the class registry and object graph.
pub(crate) fn load(bytes: &[u8], options: &LoadOptions) -> Result<Loaded> {
	let mut reader = ChunkReader::new(bytes)?;
	let mut loader = Loader {
		header: reader.header(),
		options,
		decode: options.decode_options(),
		strings: StringTable::default(),
		seen_strings: false,
		classes: ClassRegistry::new(),
		graph: ObjectGraph::new(),
		pending: VecDeque::new(),
		stats: LoadStats::default(),
	};

	while let Some(chunk) = reader.next() {
		loader.chunk(chunk?, &mut reader)?;
	}
	loader.finish()
}

struct Loader<'o> {
	header: CdbHeader,
	options: &'o LoadOptions,
	decode: DecodeOptions,
	strings: StringTable,
	seen_strings: bool,
	classes: ClassRegistry,
	graph: ObjectGraph,
	pending: VecDeque<(u32, u16)>,
	stats: LoadStats,
}

impl Loader<'_> {
	fn chunk<'a>(&mut self, chunk: Chunk<'a>, reader: &mut ChunkReader<'a>) -> Result<()> {
		self.stats.chunks += 1;
		match chunk.kind {
			ChunkKind::Strt => {
				if self.seen_strings {
					return Err(CdbError::DuplicateStringTable { at: chunk.offset });
				}
				self.strings = StringTable::parse(chunk.payload);
				self.seen_strings = true;
			}
			ChunkKind::Clas => {
				if let Some(schema) = parse_class_chunk(&mut chunk.cursor(), &self.strings)? {
					self.classes.define_class(schema);
					self.stats.classes += 1;
				}
			}
			ChunkKind::Objt | ChunkKind::Diff => self.body(chunk, reader)?,
			ChunkKind::List => self.index_list(chunk)?,
			ChunkKind::Type => {}
			kind => {
				debug!(at = chunk.offset, %kind, size = chunk.payload.len(), "skipping chunk");
				self.stats.skipped_chunks += 1;
			}
		}
		Ok(())
	}

	fn body<'a>(&mut self, chunk: Chunk<'a>, reader: &mut ChunkReader<'a>) -> Result<()> {
		let is_diff = chunk.kind == ChunkKind::Diff;
		let mut cursor = chunk.cursor();
		let class = if cursor.remaining() >= 4 { self.strings.read_ref(&mut cursor)? } else { TypeId::NONE };

		let Some((db_id, index)) = self.pending.pop_front() else {
			debug!(at = chunk.offset, "component body without a pending slot");
			self.stats.skipped_bodies += 1;
			return Ok(());
		};
		if !class.is_interned() || !self.graph.contains(db_id) {
			debug!(at = chunk.offset, db_id, class = self.strings.name(class), "skipping component body");
			self.stats.skipped_bodies += 1;
			return Ok(());
		}

		resolve_inheritance(&mut self.graph, db_id, self.options.max_inheritance_depth)?;

		let key = ComponentKey {
			component_type: class,
			index: u32::from(index),
		};
		let mut slot = if is_diff { self.graph.take_component(db_id, key) } else { ValueNode::Null };
		ValueDecoder::new(&self.strings, &self.classes, &self.graph, reader, &self.decode).decode_into(&mut slot, class, &mut cursor, is_diff)?;

		if let Some(record) = self.graph.get_mut(db_id) {
			record.components.insert(key, slot);
		}
		self.stats.components += 1;
		Ok(())
	}

	fn index_list(&mut self, chunk: Chunk<'_>) -> Result<()> {
		let mut cursor = chunk.cursor();
		let class = if cursor.remaining() >= 4 { self.strings.read_ref(&mut cursor)? } else { TypeId::NONE };
		let count = if cursor.remaining() >= 4 { cursor.read_u32_le()? as usize } else { 0 };

		let name = self.strings.name(class).to_owned();
		match name.as_str() {
			OBJECT_INFO_CLASS => self.object_info(&mut cursor, count),
			COMPONENT_INFO_CLASS => {
				for _ in 0..count {
					let db_id = cursor.read_u32_le()?;
					let index = cursor.read_u16_le()?;
					let _component_type = cursor.read_u16_le()?;
					self.pending.push_back((db_id, index));
				}
				Ok(())
			}
			EDGE_INFO_CLASS => {
				for _ in 0..count {
					let source = cursor.read_u32_le()?;
					let target = cursor.read_u32_le()?;
					let _index = cursor.read_u16_le()?;
					let _edge_type = cursor.read_u16_le()?;
					if !self.graph.set_parent(source, target) {
						debug!(source, target, "edge between unknown objects");
					}
				}
				Ok(())
			}
			COMPONENT_TYPE_INFO_CLASS => Ok(()),
			_ => {
				debug!(at = chunk.offset, class = %name, count, "skipping top-level list");
				self.stats.skipped_chunks += 1;
				Ok(())
			}
		}
	}

	fn object_info(&mut self, cursor: &mut Cursor<'_>, count: usize) -> Result<()> {
		let need = count.saturating_mul(OBJECT_INFO_SIZE);
		if need > cursor.remaining() {
			return Err(CdbError::UnexpectedEof {
				at: cursor.offset(),
				need,
				rem: cursor.remaining(),
			});
		}

		for _ in 0..count {
			let file = cursor.read_u32_le()?;
			let ext = cursor.read_u32_le()?;
			let dir = cursor.read_u32_le()?;
			let db_id = cursor.read_u32_le()?;
			let base_object = cursor.read_u32_le()?;
			let has_data = cursor.read_u8()? != 0;
			if db_id == 0 {
				warn!(at = cursor.offset() - OBJECT_INFO_SIZE, "object entry with dbID 0, skipping");
				continue;
			}
			self.graph.insert(ObjectRecord::new(db_id, PersistentId { dir, file, ext }, base_object, has_data));
		}
		Ok(())
	}

	fn finish(mut self) -> Result<Loaded> {
		let ids: Vec<u32> = self.graph.iter().map(|record| record.db_id).collect();
		for db_id in ids {
			resolve_inheritance(&mut self.graph, db_id, self.options.max_inheritance_depth)?;
		}

		let mut materials: HashMap<PersistentId, Vec<u32>> = HashMap::new();
		for record in self.graph.iter() {
			match self.graph.root_of(record.db_id) {
				Some(root) if root.persistent_id.is_material() => materials.entry(root.persistent_id).or_default().push(record.db_id),
				Some(_) => {}
				None => {
					warn!(db_id = record.db_id, "parent chain loops, object has no root");
					self.stats.orphaned += 1;
				}
			}
		}

		if !self.pending.is_empty() {
			debug!(left = self.pending.len(), "component slots without a body");
		}
		info!(
			chunks = self.stats.chunks,
			classes = self.classes.len(),
			objects = self.graph.len(),
			components = self.stats.components,
			materials = materials.len(),
			"loaded component database"
		);

		Ok(Loaded {
			header: self.header,
			strings: self.strings,
			classes: self.classes,
			graph: self.graph,
			materials,
			stats: self.stats,
		})
	}
}
