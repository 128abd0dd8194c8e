use std::mem;

use tracing::debug;

use crate::cdb::strings::DB_ID_CLASS;
use crate::cdb::{
	CdbError, ChunkKind, ChunkReader, ClassRegistry, ClassSchema, Cursor, FieldCursor, ObjectGraph, Result, StringTable, StructNode, TypeId, ValueNode,
};

/// Runtime limits for value decoding.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
	/// Maximum recursive nesting depth.
	pub max_depth: u32,
	/// Maximum element count of one list or map, appended entries included.
	pub max_list_len: usize,
}

impl Default for DecodeOptions {
	fn default() -> Self {
		Self {
			max_depth: 64,
			max_list_len: 1 << 20,
		}
	}
}

/// Fixed-size or length-prefixed scalar encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
	/// Consumes nothing.
	None,
	/// `u16` length followed by bytes.
	String,
	/// One byte, non-zero is true.
	Bool,
	/// Signed byte.
	Int8,
	/// Unsigned byte.
	UInt8,
	/// Signed 16-bit.
	Int16,
	/// Unsigned 16-bit.
	UInt16,
	/// Signed 32-bit.
	Int32,
	/// Unsigned 32-bit.
	UInt32,
	/// Signed 64-bit.
	Int64,
	/// Unsigned 64-bit.
	UInt64,
	/// IEEE754 single.
	Float,
	/// IEEE754 double.
	Double,
}

impl Primitive {
	/// Scalar encoding for a predefined type id.
	pub fn from_type(type_id: TypeId) -> Option<Self> {
		Some(match type_id {
			TypeId::NONE => Self::None,
			TypeId::STRING => Self::String,
			TypeId::BOOL => Self::Bool,
			TypeId::INT8 => Self::Int8,
			TypeId::UINT8 => Self::UInt8,
			TypeId::INT16 => Self::Int16,
			TypeId::UINT16 => Self::UInt16,
			TypeId::INT32 => Self::Int32,
			TypeId::UINT32 => Self::UInt32,
			TypeId::INT64 => Self::Int64,
			TypeId::UINT64 => Self::UInt64,
			TypeId::FLOAT => Self::Float,
			TypeId::DOUBLE => Self::Double,
			_ => return None,
		})
	}

	/// Read one value.
	pub fn decode(self, cursor: &mut Cursor<'_>) -> Result<ValueNode> {
		Ok(match self {
			Self::None => ValueNode::Null,
			Self::String => {
				let len = usize::from(cursor.read_u16_le()?);
				let raw = cursor.read_exact(len)?;
				let end = raw.iter().position(|byte| *byte == 0).unwrap_or(raw.len());
				ValueNode::Str(String::from_utf8_lossy(&raw[..end]).into_owned())
			}
			Self::Bool => ValueNode::Bool(cursor.read_u8()? != 0),
			Self::Int8 => ValueNode::Int8(cursor.read_u8()? as i8),
			Self::UInt8 => ValueNode::UInt8(cursor.read_u8()?),
			Self::Int16 => ValueNode::Int16(cursor.read_u16_le()? as i16),
			Self::UInt16 => ValueNode::UInt16(cursor.read_u16_le()?),
			Self::Int32 => ValueNode::Int32(cursor.read_u32_le()? as i32),
			Self::UInt32 => ValueNode::UInt32(cursor.read_u32_le()?),
			Self::Int64 => ValueNode::Int64(cursor.read_u64_le()? as i64),
			Self::UInt64 => ValueNode::UInt64(cursor.read_u64_le()?),
			Self::Float => ValueNode::Float(cursor.read_f32_le()?),
			Self::Double => ValueNode::Double(cursor.read_f64_le()?),
		})
	}
}

/// Decoding strategy selected once per type id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
	/// Inline scalar.
	Primitive(Primitive),
	/// Nested `LIST` chunk.
	List,
	/// Nested `MAPC` chunk.
	Map,
	/// Inline type token followed by one child.
	Ref,
	/// Registered class.
	Class(TypeId),
	/// Unregistered class, reserved id, or `Unknown`.
	Unresolved,
}

impl TypeKind {
	/// Classify `type_id` against the registry.
	pub fn classify(type_id: TypeId, classes: &ClassRegistry) -> Self {
		match type_id {
			TypeId::LIST => Self::List,
			TypeId::MAP => Self::Map,
			TypeId::REF => Self::Ref,
			_ if classes.contains(type_id) => Self::Class(type_id),
			_ => Primitive::from_type(type_id).map_or(Self::Unresolved, Self::Primitive),
		}
	}
}

/// Schema-driven decoder for component bodies.
///
/// Nested `LIST`, `MAPC`, `USER` and `USRD` wrappers are not embedded in the
/// owning payload; they are the chunks that immediately follow it, so the
/// decoder pulls them from the shared top-level reader.
pub struct ValueDecoder<'d, 'a> {
	strings: &'d StringTable,
	classes: &'d ClassRegistry,
	graph: &'d ObjectGraph,
	chunks: &'d mut ChunkReader<'a>,
	options: &'d DecodeOptions,
	db_id_class: Option<TypeId>,
}

impl<'d, 'a> ValueDecoder<'d, 'a> {
	/// Create a decoder over the shared chunk stream.
	pub fn new(
		strings: &'d StringTable,
		classes: &'d ClassRegistry,
		graph: &'d ObjectGraph,
		chunks: &'d mut ChunkReader<'a>,
		options: &'d DecodeOptions,
	) -> Self {
		Self {
			strings,
			classes,
			graph,
			chunks,
			options,
			db_id_class: strings.find(DB_ID_CLASS),
		}
	}

	/// Decode a fresh value of `type_id`.
	pub fn decode(&mut self, type_id: TypeId, cursor: &mut Cursor<'a>, is_diff: bool) -> Result<ValueNode> {
		let mut slot = ValueNode::Null;
		self.decode_at(&mut slot, type_id, cursor, is_diff, 0)?;
		Ok(slot)
	}

	/// Decode into an existing value, keeping whatever a diff does not touch.
	pub fn decode_into(&mut self, slot: &mut ValueNode, type_id: TypeId, cursor: &mut Cursor<'a>, is_diff: bool) -> Result<()> {
		self.decode_at(slot, type_id, cursor, is_diff, 0)
	}

	fn node_type(&self, node: &ValueNode) -> Option<TypeId> {
		match node {
			ValueNode::ResourceRef(_) => self.db_id_class,
			_ => node.type_id(),
		}
	}

	fn decode_at(&mut self, slot: &mut ValueNode, type_id: TypeId, cursor: &mut Cursor<'a>, is_diff: bool, depth: u32) -> Result<()> {
		if depth >= self.options.max_depth {
			return Err(CdbError::DecodeDepthExceeded {
				max_depth: self.options.max_depth,
				at: cursor.offset(),
			});
		}

		match TypeKind::classify(type_id, self.classes) {
			TypeKind::Primitive(primitive) => *slot = primitive.decode(cursor)?,
			TypeKind::List => self.decode_list(slot, is_diff, depth)?,
			TypeKind::Map => self.decode_map(slot, is_diff, depth)?,
			TypeKind::Ref => {
				let child_type = self.strings.read_ref(cursor)?;
				let mut child = match mem::take(slot) {
					ValueNode::Ref(child) => *child,
					_ => ValueNode::Null,
				};
				self.decode_at(&mut child, child_type, cursor, is_diff, depth + 1)?;
				*slot = ValueNode::Ref(Box::new(child));
			}
			TypeKind::Class(class) => self.decode_class(slot, class, cursor, is_diff, depth)?,
			TypeKind::Unresolved => {
				debug!(
					at = cursor.offset(),
					type_name = self.strings.name(type_id),
					skipped = cursor.remaining(),
					"unresolved type, skipping rest of chunk"
				);
				cursor.skip_rest();
				*slot = ValueNode::Unknown;
			}
		}
		Ok(())
	}

	fn read_count(&self, cursor: &mut Cursor<'_>, at: usize, pairs: bool) -> Result<usize> {
		if cursor.remaining() < 4 {
			return Ok(0);
		}
		let count = cursor.read_u32_le()? as usize;
		let max = if pairs { self.options.max_list_len / 2 } else { self.options.max_list_len };
		if count > max {
			return Err(CdbError::ListTooLarge { count, max, at });
		}
		Ok(count)
	}

	fn decode_list(&mut self, slot: &mut ValueNode, is_diff: bool, depth: u32) -> Result<()> {
		let chunk = self.chunks.expect_next(&[ChunkKind::List], "LIST")?;
		let mut cursor = chunk.cursor();
		let element = self.strings.read_ref(&mut cursor)?;
		let count = self.read_count(&mut cursor, chunk.payload_offset(), false)?;

		let existing = match mem::take(slot) {
			ValueNode::List(items) => items,
			_ => Vec::new(),
		};
		let appending = is_diff && !element.is_numeric() && existing.first().is_some_and(|first| self.node_type(first) == Some(element));

		let (mut items, start) = if appending {
			let start = existing.len();
			if start + count > self.options.max_list_len {
				return Err(CdbError::ListTooLarge {
					count: start + count,
					max: self.options.max_list_len,
					at: chunk.payload_offset(),
				});
			}
			(existing, start)
		} else if existing.len() >= count {
			let mut reused = existing;
			reused.truncate(count);
			(reused, 0)
		} else {
			(Vec::with_capacity(count), 0)
		};
		items.resize(start + count, ValueNode::Null);

		for item in &mut items[start..] {
			self.decode_at(item, element, &mut cursor, is_diff, depth + 1)?;
		}
		*slot = ValueNode::List(items);
		Ok(())
	}

	fn decode_map(&mut self, slot: &mut ValueNode, is_diff: bool, depth: u32) -> Result<()> {
		let chunk = self.chunks.expect_next(&[ChunkKind::Mapc], "MAPC")?;
		let mut cursor = chunk.cursor();
		let key_type = self.strings.read_ref(&mut cursor)?;
		let value_type = self.strings.read_ref(&mut cursor)?;
		let count = self.read_count(&mut cursor, chunk.payload_offset(), true)?;

		let existing = match mem::take(slot) {
			ValueNode::Map(pairs) => pairs,
			_ => Vec::new(),
		};
		let appending = is_diff
			&& existing
				.first()
				.is_some_and(|(key, value)| self.node_type(key) == Some(key_type) && self.node_type(value) == Some(value_type));

		let (mut pairs, start) = if appending {
			let start = existing.len();
			if (start + count) * 2 > self.options.max_list_len {
				return Err(CdbError::ListTooLarge {
					count: (start + count) * 2,
					max: self.options.max_list_len,
					at: chunk.payload_offset(),
				});
			}
			(existing, start)
		} else if existing.len() >= count {
			let mut reused = existing;
			reused.truncate(count);
			(reused, 0)
		} else {
			(Vec::with_capacity(count), 0)
		};
		pairs.resize(start + count, (ValueNode::Null, ValueNode::Null));

		let mut next = start;
		for _ in 0..count {
			self.decode_at(&mut pairs[next].0, key_type, &mut cursor, false, depth + 1)?;

			let (earlier, rest) = pairs.split_at_mut(next);
			let duplicate = match &rest[0].0 {
				ValueNode::Str(key) if key_type == TypeId::STRING => earlier.iter_mut().find(|(prior, _)| matches!(prior, ValueNode::Str(prior) if prior == key)),
				_ => None,
			};
			if let Some((_, value)) = duplicate {
				self.decode_at(value, value_type, &mut cursor, is_diff, depth + 1)?;
				continue;
			}

			self.decode_at(&mut pairs[next].1, value_type, &mut cursor, is_diff, depth + 1)?;
			next += 1;
		}
		pairs.truncate(next);
		*slot = ValueNode::Map(pairs);
		Ok(())
	}

	fn decode_class(&mut self, slot: &mut ValueNode, class: TypeId, cursor: &mut Cursor<'a>, is_diff: bool, depth: u32) -> Result<()> {
		let classes = self.classes;
		let Some(schema) = classes.get(class) else {
			cursor.skip_rest();
			*slot = ValueNode::Unknown;
			return Ok(());
		};

		if Some(class) == self.db_id_class {
			return self.decode_db_id(slot, schema, cursor, is_diff, depth);
		}

		let mut node = match mem::take(slot) {
			ValueNode::Struct(node) if node.class == class => node,
			_ => StructNode::new(class),
		};
		if schema.is_user_defined {
			self.decode_user(&mut node, schema, depth)?;
		} else {
			self.decode_fields(&mut node, schema, cursor, is_diff, depth)?;
		}
		*slot = ValueNode::Struct(node);
		Ok(())
	}

	fn decode_fields(&mut self, node: &mut StructNode, schema: &ClassSchema, cursor: &mut Cursor<'a>, is_diff: bool, depth: u32) -> Result<()> {
		let mut stream = FieldCursor::new(schema.fields.len(), is_diff);
		while let Some(index) = stream.next(cursor) {
			let Some(field) = schema.field(index) else {
				break;
			};
			let child = node.fields.entry(index).or_default();
			self.decode_at(child, field.type_id, cursor, is_diff, depth + 1)?;
		}
		Ok(())
	}

	fn decode_user(&mut self, node: &mut StructNode, schema: &ClassSchema, depth: u32) -> Result<()> {
		let chunk = self.chunks.expect_next(&[ChunkKind::User, ChunkKind::Usrd], "USER or USRD")?;
		let is_diff = chunk.kind == ChunkKind::Usrd;
		let mut cursor = chunk.cursor();

		let declared = self.strings.read_ref(&mut cursor)?;
		if declared != schema.name {
			return Err(CdbError::UserTypeMismatch {
				expected: self.strings.name(schema.name).to_owned(),
				got: self.strings.name(declared).to_owned(),
				at: chunk.payload_offset(),
			});
		}

		let mut stored = self.strings.read_ref(&mut cursor)?;
		if stored == declared {
			return self.decode_fields(node, schema, &mut cursor, is_diff, depth);
		}

		if !stored.is_primitive() {
			debug!(
				at = chunk.payload_offset(),
				class = self.strings.name(declared),
				stored = self.strings.name(stored),
				"user chunk stores an unrelated type, leaving fields untouched"
			);
			return Ok(());
		}

		let budget = schema.fields.len().max(1) as u32;
		let mut index = 0_u32;
		loop {
			let child = node.fields.entry(index).or_default();
			self.decode_at(child, stored, &mut cursor, is_diff, depth + 1)?;
			index += 1;
			if index >= budget || cursor.remaining() < 4 {
				break;
			}
			stored = self.strings.read_ref(&mut cursor)?;
			if !stored.is_primitive() {
				break;
			}
		}
		Ok(())
	}

	fn decode_db_id(&mut self, slot: &mut ValueNode, schema: &ClassSchema, cursor: &mut Cursor<'a>, is_diff: bool, depth: u32) -> Result<()> {
		let mut node = StructNode::new(schema.name);
		if schema.is_user_defined {
			self.decode_user(&mut node, schema, depth)?;
		} else {
			self.decode_fields(&mut node, schema, cursor, is_diff, depth)?;
		}

		let resolved = match node.fields.get(&0) {
			Some(ValueNode::UInt32(db_id)) => self.graph.get(*db_id).map(|record| record.persistent_id.to_string()).unwrap_or_default(),
			_ => match mem::take(slot) {
				ValueNode::ResourceRef(existing) => existing,
				_ => String::new(),
			},
		};
		*slot = ValueNode::ResourceRef(resolved);
		Ok(())
	}
}
