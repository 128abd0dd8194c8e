use serde_json::{Map, Value, json};

use crate::cdb::resource::crc32_lowercase;
use crate::cdb::strings::DB_ID_CLASS;
use crate::cdb::{ClassRegistry, ComponentKey, ObjectGraph, ObjectRecord, StringTable, TypeId, ValueNode};

/// Base names of the root placeholder materials, relative to [`ROOT_MATERIAL_DIR`].
const ROOT_MATERIALS: [&str; 6] = ["layeredmaterials", "blenders", "layers", "materials", "texturesets", "uvstreams"];
const ROOT_MATERIAL_DIR: &str = "materials\\layered\\root\\";

/// Renders value trees and objects as JSON documents.
pub struct JsonRenderer<'a> {
	strings: &'a StringTable,
	classes: &'a ClassRegistry,
	graph: &'a ObjectGraph,
}

impl<'a> JsonRenderer<'a> {
	/// Renderer over a loaded database.
	pub fn new(strings: &'a StringTable, classes: &'a ClassRegistry, graph: &'a ObjectGraph) -> Self {
		Self { strings, classes, graph }
	}

	/// Render one value.
	pub fn render(&self, node: &ValueNode) -> Value {
		match node {
			ValueNode::Null => Value::Null,
			ValueNode::Unknown => Value::from("<unknown>"),
			ValueNode::Bool(value) => Value::from(value.to_string()),
			ValueNode::Int8(value) => Value::from(value.to_string()),
			ValueNode::UInt8(value) => Value::from(value.to_string()),
			ValueNode::Int16(value) => Value::from(value.to_string()),
			ValueNode::UInt16(value) => Value::from(value.to_string()),
			ValueNode::Int32(value) => Value::from(value.to_string()),
			ValueNode::UInt32(value) => Value::from(value.to_string()),
			ValueNode::Int64(value) => Value::from(value.to_string()),
			ValueNode::UInt64(value) => Value::from(value.to_string()),
			ValueNode::Float(value) => Value::from(format_float(*value)),
			ValueNode::Double(value) => Value::from(format_double(*value)),
			ValueNode::Str(value) | ValueNode::ResourceRef(value) => Value::from(value.as_str()),
			ValueNode::Struct(node) => {
				let schema = self.classes.get(node.class);
				let mut data = Map::new();
				for (index, child) in &node.fields {
					let name = schema.and_then(|schema| schema.field(*index)).map_or("null", |field| self.strings.name(field.name));
					data.insert(name.to_owned(), self.render(child));
				}
				json!({ "Data": data, "Type": self.strings.name(node.class) })
			}
			ValueNode::List(items) => {
				let mut out = Map::new();
				out.insert("Data".to_owned(), Value::Array(items.iter().map(|item| self.render(item)).collect()));
				if let Some(first) = items.first() {
					out.insert("ElementType".to_owned(), Value::from(self.element_type(first)));
				}
				out.insert("Type".to_owned(), Value::from("<collection>"));
				Value::Object(out)
			}
			ValueNode::Map(pairs) => {
				let data: Vec<Value> = pairs
					.iter()
					.map(|(key, value)| {
						json!({
							"Data": { "Key": self.render(key), "Value": self.render(value) },
							"Type": "StdMapType::Pair"
						})
					})
					.collect();
				json!({ "Data": data, "ElementType": "StdMapType::Pair", "Type": "<collection>" })
			}
			ValueNode::Ref(child) => json!({ "Data": self.render(child), "Type": "<ref>" }),
		}
	}

	fn element_type(&self, first: &ValueNode) -> &str {
		match first {
			ValueNode::Null => "null",
			ValueNode::Str(_) => "BSFixedString",
			ValueNode::Float(_) => "float",
			ValueNode::ResourceRef(_) => DB_ID_CLASS,
			other => self.strings.name(other.type_id().unwrap_or(TypeId::UNKNOWN)),
		}
	}

	/// Render one component, annotating object output with its `Index`.
	pub fn render_component(&self, key: ComponentKey, node: &ValueNode) -> Value {
		let mut value = self.render(node);
		if let Value::Object(map) = &mut value {
			map.insert("Index".to_owned(), Value::from(key.index));
		}
		value
	}

	/// Render one object with its components, `ID` and `Parent`.
	pub fn render_object(&self, record: &ObjectRecord) -> Value {
		let components: Vec<Value> = record.components.iter().map(|(key, node)| self.render_component(*key, node)).collect();
		json!({
			"Components": components,
			"ID": record.persistent_id.to_string(),
			"Parent": self.parent_name(record)
		})
	}

	/// Render the `{"Objects": [...], "Version": "1"}` document.
	pub fn render_document<'r>(&self, records: impl IntoIterator<Item = &'r ObjectRecord>) -> Value {
		let objects: Vec<Value> = records.into_iter().map(|record| self.render_object(record)).collect();
		json!({ "Objects": objects, "Version": "1" })
	}

	/// Path of the root placeholder material this object derives from, or empty.
	pub fn parent_name(&self, record: &ObjectRecord) -> String {
		let Some(root) = record.root_base.and_then(|db_id| self.graph.get(db_id)) else {
			return String::new();
		};
		ROOT_MATERIALS
			.iter()
			.find(|name| crc32_lowercase(name) == root.persistent_id.file)
			.map(|name| format!("{ROOT_MATERIAL_DIR}{name}.mat"))
			.unwrap_or_default()
	}
}

/// Format like C's `%.7g`.
pub fn format_float(value: f32) -> String {
	format_general(f64::from(value), 7)
}

/// Format like C's `%.14g`.
pub fn format_double(value: f64) -> String {
	format_general(value, 14)
}

fn format_general(value: f64, precision: usize) -> String {
	if value.is_nan() {
		return if value.is_sign_negative() { "-nan" } else { "nan" }.to_owned();
	}
	if value.is_infinite() {
		return if value.is_sign_negative() { "-inf" } else { "inf" }.to_owned();
	}
	if value == 0.0 {
		return if value.is_sign_negative() { "-0" } else { "0" }.to_owned();
	}

	let scientific = format!("{:.*e}", precision - 1, value);
	let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
	let exponent: i32 = exponent.parse().unwrap_or(0);

	if exponent < -4 || exponent >= precision as i32 {
		let sign = if exponent < 0 { '-' } else { '+' };
		format!("{}e{sign}{:02}", trim_fraction(mantissa), exponent.unsigned_abs())
	} else {
		let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
		trim_fraction(&format!("{value:.decimals$}")).to_owned()
	}
}

fn trim_fraction(text: &str) -> &str {
	if text.contains('.') { text.trim_end_matches('0').trim_end_matches('.') } else { text }
}

#[cfg(test)]
mod tests;
