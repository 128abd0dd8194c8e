use std::collections::BTreeMap;

use crate::cdb::TypeId;

/// Decoded value tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ValueNode {
	/// Absent value (`None` type, or a slot not yet written).
	#[default]
	Null,
	/// Content whose type could not be resolved.
	Unknown,
	/// Boolean.
	Bool(bool),
	/// Signed 8-bit integer.
	Int8(i8),
	/// Unsigned 8-bit integer.
	UInt8(u8),
	/// Signed 16-bit integer.
	Int16(i16),
	/// Unsigned 16-bit integer.
	UInt16(u16),
	/// Signed 32-bit integer.
	Int32(i32),
	/// Unsigned 32-bit integer.
	UInt32(u32),
	/// Signed 64-bit integer.
	Int64(i64),
	/// Unsigned 64-bit integer.
	UInt64(u64),
	/// 32-bit float.
	Float(f32),
	/// 64-bit float.
	Double(f64),
	/// String, cut at the first embedded NUL.
	Str(String),
	/// Class instance.
	Struct(StructNode),
	/// Ordered list.
	List(Vec<ValueNode>),
	/// Ordered key/value pairs.
	Map(Vec<(ValueNode, ValueNode)>),
	/// Typed reference wrapping one child.
	Ref(Box<ValueNode>),
	/// `res:DIR:FILE:EXT` reference resolved from a dbID, or empty.
	ResourceRef(String),
}

/// Class instance with fields keyed by field number.
#[derive(Debug, Clone, PartialEq)]
pub struct StructNode {
	/// Class name id.
	pub class: TypeId,
	/// Present fields in field-number order.
	pub fields: BTreeMap<u32, ValueNode>,
}

impl StructNode {
	/// Empty instance of `class`.
	pub fn new(class: TypeId) -> Self {
		Self {
			class,
			fields: BTreeMap::new(),
		}
	}
}

impl ValueNode {
	/// Type id this node was decoded as.
	///
	/// `ResourceRef` has no fixed id; its class id depends on the string table.
	pub fn type_id(&self) -> Option<TypeId> {
		Some(match self {
			Self::Null => TypeId::NONE,
			Self::Unknown => TypeId::UNKNOWN,
			Self::Bool(_) => TypeId::BOOL,
			Self::Int8(_) => TypeId::INT8,
			Self::UInt8(_) => TypeId::UINT8,
			Self::Int16(_) => TypeId::INT16,
			Self::UInt16(_) => TypeId::UINT16,
			Self::Int32(_) => TypeId::INT32,
			Self::UInt32(_) => TypeId::UINT32,
			Self::Int64(_) => TypeId::INT64,
			Self::UInt64(_) => TypeId::UINT64,
			Self::Float(_) => TypeId::FLOAT,
			Self::Double(_) => TypeId::DOUBLE,
			Self::Str(_) => TypeId::STRING,
			Self::Struct(node) => node.class,
			Self::List(_) => TypeId::LIST,
			Self::Map(_) => TypeId::MAP,
			Self::Ref(_) => TypeId::REF,
			Self::ResourceRef(_) => return None,
		})
	}

	/// Borrow as a struct.
	pub fn as_struct(&self) -> Option<&StructNode> {
		match self {
			Self::Struct(node) => Some(node),
			_ => None,
		}
	}

	/// Field of a struct by field number.
	pub fn field(&self, index: u32) -> Option<&ValueNode> {
		self.as_struct().and_then(|node| node.fields.get(&index))
	}

	/// True for [`ValueNode::Null`].
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}
}
