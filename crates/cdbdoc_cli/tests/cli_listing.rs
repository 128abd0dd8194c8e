#![allow(missing_docs)]

use std::process::{Command, Output};

use cdbdoc_testkit::{CdbBuilder, Payload, scratch_dir};

fn write_sample(name: &str) -> String {
	let mut builder = CdbBuilder::new();
	builder
		.class("Layer", 0, &[("Color", "Float"), ("Enabled", "Bool")])
		.class("Blend", 4, &[("Mode", "String")])
		.objt("Layer", Payload::new().f32(1.0).bool(true))
		.chunk(b"ZZZZ", vec![1, 2, 3]);
	let path = scratch_dir(name).join("sample.cdb");
	std::fs::write(&path, builder.build()).expect("fixture is writable");
	path.to_string_lossy().into_owned()
}

fn cdbdoc(args: &[&str]) -> Output {
	Command::new(env!("CARGO_BIN_EXE_cdbdoc")).args(args).output().expect("cdbdoc command executes")
}

fn cdbdoc_json(args: &[&str]) -> serde_json::Value {
	let output = cdbdoc(args);
	assert!(output.status.success(), "cdbdoc failed: {}", String::from_utf8_lossy(&output.stderr));
	serde_json::from_slice(&output.stdout).expect("stdout should be valid json")
}

#[test]
fn chunks_json_lists_stream_in_order() {
	let file = write_sample("cli-chunks");
	let json = cdbdoc_json(&["chunks", &file, "--json"]);

	let kinds: Vec<&str> = json["chunks"]
		.as_array()
		.expect("chunks array")
		.iter()
		.filter_map(|chunk| chunk["kind"].as_str())
		.collect();
	assert_eq!(kinds, vec!["STRT", "CLAS", "CLAS", "OBJT", "ZZZZ"]);
	assert_eq!(json["chunks"][1]["class"], "Layer");
	assert_eq!(json["chunks"][1]["fields"][1]["type"], "Bool");
	assert_eq!(json["chunks"][3]["class"], "Layer");
	assert!(json["error"].is_null());
}

#[test]
fn chunks_kind_filter_is_case_insensitive() {
	let file = write_sample("cli-chunks-filter");
	let json = cdbdoc_json(&["chunks", &file, "--kind", "clas", "--json"]);
	assert_eq!(json["chunks"].as_array().map(Vec::len), Some(2));
}

#[test]
fn classes_json_reports_fields_and_user_flag() {
	let file = write_sample("cli-classes");
	let json = cdbdoc_json(&["classes", &file, "--class", "Blend", "--json"]);

	let classes = json["classes"].as_array().expect("classes array");
	assert_eq!(classes.len(), 1);
	assert_eq!(classes[0]["name"], "Blend");
	assert_eq!(classes[0]["user_defined"], true);
	assert_eq!(classes[0]["fields"][0]["name"], "Mode");
	assert_eq!(classes[0]["fields"][0]["type"], "String");
}

#[test]
fn unknown_class_is_an_error() {
	let file = write_sample("cli-classes-missing");
	let output = cdbdoc(&["classes", &file, "--class", "Nope"]);

	assert!(!output.status.success());
	assert_eq!(String::from_utf8_lossy(&output.stderr).trim_end(), "error: class not found: Nope");
}

#[test]
fn truncated_file_fails_to_load() {
	let dir = scratch_dir("cli-truncated");
	let path = dir.join("bad.cdb");
	std::fs::write(&path, b"BETH\x08\x00\x00\x00\x04").expect("fixture is writable");
	let output = cdbdoc(&["info", &path.to_string_lossy()]);

	assert!(!output.status.success());
	assert!(String::from_utf8_lossy(&output.stderr).contains("error: "));
}
