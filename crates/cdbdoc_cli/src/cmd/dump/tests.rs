use std::path::Path;

use serde_json::json;

use super::output_path;
use crate::cmd::test_support::{BASE_PATH, DERIVED_PATH, run_cdbdoc, run_cdbdoc_json, sample_data_dir, sample_file};

#[test]
fn dump_prints_merged_material_document() {
	let file = sample_file("cli-dump-print");
	let json = run_cdbdoc_json(&["dump", &file, DERIVED_PATH]);

	assert_eq!(json["Version"], "1");
	assert_eq!(json["Objects"][0]["Parent"], "materials\\layered\\root\\layers.mat");
	assert_eq!(
		json["Objects"][0]["Components"][0],
		json!({ "Data": { "Color": "1", "Enabled": "true" }, "Type": "Layer", "Index": 0 })
	);
}

#[test]
fn dump_writes_json_files_under_out_dir() {
	let dir = sample_data_dir("cli-dump-out");
	let out = dir.join("export");
	let dir_arg = dir.to_string_lossy().into_owned();
	let out_arg = out.to_string_lossy().into_owned();
	let output = run_cdbdoc(&["dump", &dir_arg, BASE_PATH, "MATERIALS\\TEST\\DERIVED.MAT", "--out", &out_arg]);
	assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
	assert!(output.stdout.is_empty());

	let base: serde_json::Value = serde_json::from_slice(&std::fs::read(out.join("materials/test/base.mat.json")).expect("base written")).expect("valid json");
	assert_eq!(base["Objects"][0]["Components"][0]["Data"]["Enabled"], "false");
	assert!(out.join("MATERIALS/TEST/DERIVED.MAT.json").exists());
}

#[test]
fn unknown_path_prints_nothing() {
	let file = sample_file("cli-dump-unknown");
	let output = run_cdbdoc(&["dump", &file, "materials/test/missing.mat"]);
	assert!(output.status.success());
	assert!(output.stdout.is_empty());
}

#[test]
fn output_path_drops_parent_components() {
	let root = Path::new("out");
	assert_eq!(output_path(root, "materials\\a\\b.mat"), root.join("materials").join("a").join("b.mat.json"));
	assert_eq!(output_path(root, "../../etc/x.mat"), root.join("etc").join("x.mat.json"));
}
