use super::{ClassRegistry, ClassSchema, parse_class_chunk};
use crate::cdb::{CdbError, Cursor, StringTable, TypeId};

const STRINGS: &[u8] = b"Layer\0Color\0Enabled\0";
const LAYER: u32 = 0;
const COLOR: u32 = 6;
const ENABLED: u32 = 12;

fn prim(id: TypeId) -> u32 {
	(id.0 as i32 - 255) as u32
}

fn clas(name: u32, flags: u16, fields: &[(u32, u32)]) -> Vec<u8> {
	let mut out = Vec::new();
	out.extend_from_slice(&name.to_le_bytes());
	out.extend_from_slice(&3_u32.to_le_bytes());
	out.extend_from_slice(&flags.to_le_bytes());
	out.extend_from_slice(&(fields.len() as u16).to_le_bytes());
	for (idx, (field_name, field_type)) in fields.iter().enumerate() {
		out.extend_from_slice(&field_name.to_le_bytes());
		out.extend_from_slice(&field_type.to_le_bytes());
		out.extend_from_slice(&(idx as u16 * 4).to_le_bytes());
		out.extend_from_slice(&4_u16.to_le_bytes());
	}
	out
}

#[test]
fn parses_fields_in_order() {
	let strings = StringTable::parse(STRINGS);
	let payload = clas(LAYER, 0, &[(COLOR, prim(TypeId::FLOAT)), (ENABLED, prim(TypeId::BOOL))]);
	let schema = parse_class_chunk(&mut Cursor::new(&payload), &strings).expect("parse").expect("known class");

	assert_eq!(strings.name(schema.name), "Layer");
	assert_eq!(schema.version, 3);
	assert!(!schema.is_user_defined);
	let fields: Vec<_> = schema.fields.iter().map(|field| (strings.name(field.name), field.type_id)).collect();
	assert_eq!(fields, vec![("Color", TypeId::FLOAT), ("Enabled", TypeId::BOOL)]);
	assert_eq!(schema.fields[1].data_offset, 4);
}

#[test]
fn user_flag_and_trailing_bytes() {
	let strings = StringTable::parse(STRINGS);
	let mut payload = clas(LAYER, 4, &[(COLOR, prim(TypeId::FLOAT))]);
	payload.extend_from_slice(&[0xAA; 11]);
	let schema = parse_class_chunk(&mut Cursor::new(&payload), &strings).expect("parse").expect("known class");
	assert!(schema.is_user_defined);
	assert_eq!(schema.fields.len(), 1);
}

#[test]
fn rejects_predefined_class_and_field_names() {
	let strings = StringTable::parse(STRINGS);
	let payload = clas(prim(TypeId::INT32), 0, &[]);
	assert!(matches!(
		parse_class_chunk(&mut Cursor::new(&payload), &strings),
		Err(CdbError::InvalidClassDefinition { .. })
	));

	let payload = clas(LAYER, 0, &[(0xFFFF_0000, prim(TypeId::FLOAT))]);
	assert!(matches!(
		parse_class_chunk(&mut Cursor::new(&payload), &strings),
		Err(CdbError::InvalidClassDefinition { .. })
	));
}

#[test]
fn unresolved_class_name_is_skipped() {
	let strings = StringTable::parse(STRINGS);
	let payload = clas(9999, 0, &[(COLOR, prim(TypeId::FLOAT))]);
	assert!(parse_class_chunk(&mut Cursor::new(&payload), &strings).expect("parse").is_none());
}

#[test]
fn last_definition_wins() {
	let mut registry = ClassRegistry::new();
	let name = TypeId(40);
	assert!(registry.define_class(ClassSchema::new(name, 1, 0, Vec::new())).is_none());
	let previous = registry.define_class(ClassSchema::new(name, 2, 4, Vec::new())).expect("replaced");
	assert_eq!(previous.version, 1);
	let current = registry.get(name).expect("defined");
	assert_eq!(current.version, 2);
	assert!(current.is_user_defined);
	assert_eq!(registry.len(), 1);
}
