use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::OnceLock;

use cdbdoc::cdb::hash_path;
use cdbdoc_testkit::{CdbBuilder, ObjectEntry, Payload, scratch_dir, target_dir as workspace_target_dir};

static CDBDOC_BIN: OnceLock<PathBuf> = OnceLock::new();

pub(crate) const ROOT_PATH: &str = "materials/layered/root/layers.mat";
pub(crate) const BASE_PATH: &str = "materials/test/base.mat";
pub(crate) const DERIVED_PATH: &str = "materials/test/derived.mat";

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

/// Small database: a root placeholder, a base material and a derived one.
pub(crate) fn sample_cdb() -> Vec<u8> {
	let mut builder = CdbBuilder::new();
	builder
		.class("Layer", 0, &[("Color", "Float"), ("Enabled", "Bool")])
		.object_info(&[entry(3, 0, ROOT_PATH), entry(20, 3, BASE_PATH), entry(21, 20, DERIVED_PATH)])
		.component_info(&[(20, 0), (21, 0)])
		.objt("Layer", Payload::new().f32(1.0).bool(false))
		.diff("Layer", Payload::new().field(1).bool(true).end_fields());
	builder.build()
}

/// Write [`sample_cdb`] into a fresh scratch directory, under the default data path.
pub(crate) fn sample_data_dir(name: &str) -> PathBuf {
	let dir = scratch_dir(name);
	let file = dir.join("materials").join("materialsbeta.cdb");
	std::fs::create_dir_all(file.parent().expect("cdb parent")).expect("data dir is creatable");
	std::fs::write(&file, sample_cdb()).expect("fixture is writable");
	dir
}

pub(crate) fn sample_file(name: &str) -> String {
	sample_data_dir(name).join("materials").join("materialsbeta.cdb").to_string_lossy().into_owned()
}

pub(crate) fn run_cdbdoc(args: &[&str]) -> Output {
	Command::new(cdbdoc_bin()).args(args).output().expect("cdbdoc command executes")
}

pub(crate) fn run_cdbdoc_json(args: &[&str]) -> serde_json::Value {
	let output = run_cdbdoc(args);
	assert!(
		output.status.success(),
		"cdbdoc command failed with status={}: {}",
		output.status,
		String::from_utf8_lossy(&output.stderr)
	);
	serde_json::from_slice(&output.stdout).expect("stdout should be valid json")
}

fn cdbdoc_bin() -> &'static PathBuf {
	CDBDOC_BIN.get_or_init(resolve_cdbdoc_bin)
}

fn resolve_cdbdoc_bin() -> PathBuf {
	if let Ok(path) = std::env::var("CARGO_BIN_EXE_cdbdoc") {
		return PathBuf::from(path);
	}

	let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
	let target_dir = workspace_target_dir();

	let mut bin = target_dir.join("debug");
	bin.push(if cfg!(windows) { "cdbdoc.exe" } else { "cdbdoc" });

	let status = Command::new("cargo")
		.current_dir(&manifest_dir)
		.args(["build", "--quiet", "--bin", "cdbdoc"])
		.status()
		.expect("cargo build executes");
	assert!(status.success(), "failed to build cdbdoc binary at {}", bin.display());

	bin
}
