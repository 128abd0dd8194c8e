#![allow(missing_docs)]

use cdbdoc::cdb::{ComponentKey, MaterialDatabase, ValueNode, hash_path};
use cdbdoc_testkit::{CdbBuilder, ObjectEntry, Payload};
use proptest::prelude::*;

const FIELDS: usize = 4;

fn entry(db_id: u32, base: u32, path: &str) -> ObjectEntry {
	let id = hash_path(path);
	ObjectEntry {
		db_id,
		base,
		dir: id.dir,
		file: id.file,
		ext: id.ext,
		has_data: true,
	}
}

proptest! {
	#[test]
	fn diff_overrides_exactly_the_named_fields(
		base in prop::array::uniform4(-1000_i32..1000),
		diff in prop::collection::btree_map(0_u16..FIELDS as u16, -1000_i32..1000, 0..=FIELDS),
	) {
		let mut builder = CdbBuilder::new();
		builder
			.class("Quad", 0, &[("A", "Int32"), ("B", "Int32"), ("C", "Int32"), ("D", "Int32")])
			.object_info(&[entry(30, 0, "materials/law/base.mat"), entry(31, 30, "materials/law/derived.mat")])
			.component_info(&[(30, 0), (31, 0)]);

		let mut full = Payload::new();
		for value in base {
			full = full.i32(value);
		}
		let mut partial = Payload::new();
		for (field, value) in &diff {
			partial = partial.field(*field).i32(*value);
		}
		builder.objt("Quad", full).diff("Quad", partial.end_fields());

		let db = MaterialDatabase::load(&builder.build()).expect("loads");
		let key = ComponentKey { component_type: db.strings().find("Quad").expect("interned"), index: 0 };
		let merged = db.object(31).and_then(|record| record.component(key)).expect("merged component");

		for field in 0..FIELDS {
			let expected = diff.get(&(field as u16)).copied().unwrap_or(base[field]);
			prop_assert_eq!(merged.field(field as u32), Some(&ValueNode::Int32(expected)));
		}
		let untouched = db.object(30).and_then(|record| record.component(key)).expect("base component");
		for field in 0..FIELDS {
			prop_assert_eq!(untouched.field(field as u32), Some(&ValueNode::Int32(base[field])));
		}
	}
}
