use serde_json::json;

use super::{JsonRenderer, format_double, format_float};
use crate::cdb::{
	ClassField, ClassRegistry, ClassSchema, ComponentKey, ObjectGraph, ObjectRecord, PersistentId, StringTable, StructNode, TypeId, ValueNode, hash_path,
};

struct Fixture {
	strings: StringTable,
	classes: ClassRegistry,
	graph: ObjectGraph,
}

impl Fixture {
	fn new() -> Self {
		let strings = StringTable::parse(b"Layer\0Color\0Enabled\0");
		let mut classes = ClassRegistry::new();
		let field = |name: &str, type_id| ClassField {
			name: strings.find(name).expect("interned"),
			type_id,
			data_offset: 0,
			data_size: 0,
		};
		classes.define_class(ClassSchema::new(
			strings.find("Layer").expect("interned"),
			0,
			0,
			vec![field("Color", TypeId::FLOAT), field("Enabled", TypeId::BOOL)],
		));
		Self {
			strings,
			classes,
			graph: ObjectGraph::new(),
		}
	}

	fn renderer(&self) -> JsonRenderer<'_> {
		JsonRenderer::new(&self.strings, &self.classes, &self.graph)
	}

	fn layer(&self, fields: Vec<(u32, ValueNode)>) -> ValueNode {
		let mut node = StructNode::new(self.strings.find("Layer").expect("interned"));
		node.fields.extend(fields);
		ValueNode::Struct(node)
	}
}

#[test]
fn struct_uses_schema_field_names_in_order() {
	let fixture = Fixture::new();
	let node = fixture.layer(vec![(1, ValueNode::Bool(true)), (0, ValueNode::Float(1.0))]);
	let value = fixture.renderer().render(&node);
	assert_eq!(value, json!({ "Data": { "Color": "1", "Enabled": "true" }, "Type": "Layer" }));

	let keys: Vec<_> = value["Data"].as_object().expect("object").keys().cloned().collect();
	assert_eq!(keys, vec!["Color", "Enabled"]);
}

#[test]
fn unknown_field_numbers_render_as_null_names() {
	let fixture = Fixture::new();
	let node = fixture.layer(vec![(7, ValueNode::UInt8(3))]);
	assert_eq!(fixture.renderer().render(&node), json!({ "Data": { "null": "3" }, "Type": "Layer" }));
}

#[test]
fn collections_refs_and_sentinels() {
	let fixture = Fixture::new();
	let renderer = fixture.renderer();

	let list = ValueNode::List(vec![ValueNode::Str("a\"b".to_owned()), ValueNode::Str("c".to_owned())]);
	assert_eq!(
		renderer.render(&list),
		json!({ "Data": ["a\"b", "c"], "ElementType": "BSFixedString", "Type": "<collection>" })
	);
	assert_eq!(renderer.render(&ValueNode::List(Vec::new())), json!({ "Data": [], "Type": "<collection>" }));
	assert_eq!(
		renderer.render(&ValueNode::List(vec![ValueNode::Float(0.5)]))["ElementType"],
		json!("float")
	);
	assert_eq!(
		renderer.render(&ValueNode::List(vec![fixture.layer(Vec::new())]))["ElementType"],
		json!("Layer")
	);
	assert_eq!(renderer.render(&ValueNode::List(vec![ValueNode::Int32(-1)]))["ElementType"], json!("Int32"));

	let map = ValueNode::Map(vec![(ValueNode::Str("k".to_owned()), ValueNode::UInt16(9))]);
	assert_eq!(
		renderer.render(&map),
		json!({
			"Data": [{ "Data": { "Key": "k", "Value": "9" }, "Type": "StdMapType::Pair" }],
			"ElementType": "StdMapType::Pair",
			"Type": "<collection>"
		})
	);

	let reference = ValueNode::Ref(Box::new(ValueNode::Int64(-5)));
	assert_eq!(renderer.render(&reference), json!({ "Data": "-5", "Type": "<ref>" }));
	assert_eq!(renderer.render(&ValueNode::Null), json!(null));
	assert_eq!(renderer.render(&ValueNode::Unknown), json!("<unknown>"));
	assert_eq!(renderer.render(&ValueNode::ResourceRef(String::new())), json!(""));
}

#[test]
fn component_index_and_parent_name() {
	let mut fixture = Fixture::new();
	let root_id = hash_path("materials\\layered\\root\\layers.mat");
	fixture.graph.insert(ObjectRecord::new(4, root_id, 0, false));

	let mut record = ObjectRecord::new(50, PersistentId { dir: 1, file: 2, ext: 0x0074_616D }, 4, true);
	let key = ComponentKey {
		component_type: fixture.strings.find("Layer").expect("interned"),
		index: 3,
	};
	record.components.insert(key, fixture.layer(vec![(0, ValueNode::Float(0.25))]));
	fixture.graph.insert(record.clone());

	let renderer = fixture.renderer();
	assert_eq!(renderer.parent_name(&record), "materials\\layered\\root\\layers.mat");
	assert_eq!(
		renderer.render_document([&record]),
		json!({
			"Objects": [{
				"Components": [{ "Data": { "Color": "0.25" }, "Type": "Layer", "Index": 3 }],
				"ID": "res:00000001:00000002:0074616D",
				"Parent": "materials\\layered\\root\\layers.mat"
			}],
			"Version": "1"
		})
	);

	let orphan = ObjectRecord::new(51, PersistentId::default(), 0, true);
	assert_eq!(renderer.parent_name(&orphan), "");
	assert_eq!(
		renderer.render_component(key, &ValueNode::ResourceRef("res:x".to_owned())),
		json!("res:x")
	);
}

#[test]
fn general_float_formatting() {
	assert_eq!(format_float(1.0), "1");
	assert_eq!(format_float(0.1), "0.1");
	assert_eq!(format_float(-2.5), "-2.5");
	assert_eq!(format_float(1234567.0), "1234567");
	assert_eq!(format_float(12345678.0), "1.234568e+07");
	assert_eq!(format_float(0.0001), "0.0001");
	assert_eq!(format_float(0.00001), "1e-05");
	assert_eq!(format_float(-0.0), "-0");
	assert_eq!(format_float(f32::INFINITY), "inf");
	assert_eq!(format_double(0.1), "0.1");
	assert_eq!(format_double(1.0 / 3.0), "0.33333333333333");
	assert_eq!(format_double(1.0e100), "1e+100");
}
