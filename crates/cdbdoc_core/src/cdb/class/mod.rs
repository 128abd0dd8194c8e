use std::collections::BTreeMap;

use crate::cdb::{CdbError, Cursor, Result, StringTable, TypeId};

/// `CLAS` flag bit marking classes serialized inside `USER`/`USRD` wrappers.
pub const USER_DEFINED_FLAG: u16 = 4;

const FIELD_RECORD_SIZE: usize = 12;

/// One field of a class schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassField {
	/// Field name id.
	pub name: TypeId,
	/// Field type id (predefined or class).
	pub type_id: TypeId,
	/// Native layout offset, informational.
	pub data_offset: u16,
	/// Native layout size, informational.
	pub data_size: u16,
}

/// Class schema declared by one `CLAS` chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSchema {
	/// Class name id.
	pub name: TypeId,
	/// Declared class version.
	pub version: u32,
	/// Raw flag word.
	pub flags: u16,
	/// Field count stored in the header, which may disagree with `fields`.
	pub declared_fields: u16,
	/// Fields in serialization order; the index is the field number.
	pub fields: Vec<ClassField>,
	/// Serialized as a `USER` blob rather than a flat field sequence.
	pub is_user_defined: bool,
}

impl ClassSchema {
	/// Build a schema, deriving `is_user_defined` from `flags`.
	pub fn new(name: TypeId, version: u32, flags: u16, fields: Vec<ClassField>) -> Self {
		Self {
			name,
			version,
			flags,
			declared_fields: u16::try_from(fields.len()).unwrap_or(u16::MAX),
			fields,
			is_user_defined: flags & USER_DEFINED_FLAG != 0,
		}
	}

	/// Field descriptor by field number.
	pub fn field(&self, index: u32) -> Option<&ClassField> {
		self.fields.get(index as usize)
	}
}

/// Class schemas keyed by class name id.
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
	classes: BTreeMap<TypeId, ClassSchema>,
}

impl ClassRegistry {
	/// Create an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Store a schema, replacing and returning any earlier definition.
	pub fn define_class(&mut self, schema: ClassSchema) -> Option<ClassSchema> {
		self.classes.insert(schema.name, schema)
	}

	/// Schema for `name`, if declared.
	pub fn get(&self, name: TypeId) -> Option<&ClassSchema> {
		self.classes.get(&name)
	}

	/// True when `name` has a schema.
	pub fn contains(&self, name: TypeId) -> bool {
		self.classes.contains_key(&name)
	}

	/// Number of declared classes.
	pub fn len(&self) -> usize {
		self.classes.len()
	}

	/// True when no classes are declared.
	pub fn is_empty(&self) -> bool {
		self.classes.is_empty()
	}

	/// Iterate schemas in class-name order.
	pub fn iter(&self) -> impl Iterator<Item = &ClassSchema> {
		self.classes.values()
	}
}

/// Parse one `CLAS` payload.
///
/// Returns `Ok(None)` when the class name does not resolve to a known string.
pub fn parse_class_chunk(cursor: &mut Cursor<'_>, strings: &StringTable) -> Result<Option<ClassSchema>> {
	let at = cursor.offset();
	let name = strings.read_ref(cursor)?;
	if name.is_primitive() {
		return Err(CdbError::InvalidClassDefinition {
			at,
			reason: "class name is a predefined type",
		});
	}
	if name == TypeId::UNKNOWN {
		return Ok(None);
	}

	let version = cursor.read_u32_le()?;
	let flags = cursor.read_u16_le()?;
	let declared_fields = cursor.read_u16_le()?;

	let mut fields = Vec::with_capacity(usize::from(declared_fields).min(cursor.remaining() / FIELD_RECORD_SIZE));
	while cursor.remaining() >= FIELD_RECORD_SIZE {
		let field_at = cursor.offset();
		let field_name = strings.read_ref(cursor)?;
		if !field_name.is_interned() {
			return Err(CdbError::InvalidClassDefinition {
				at: field_at,
				reason: "field name does not resolve to a string",
			});
		}
		fields.push(ClassField {
			name: field_name,
			type_id: strings.read_ref(cursor)?,
			data_offset: cursor.read_u16_le()?,
			data_size: cursor.read_u16_le()?,
		});
	}

	let mut schema = ClassSchema::new(name, version, flags, fields);
	schema.declared_fields = declared_fields;
	Ok(Some(schema))
}

#[cfg(test)]
mod tests;
