use std::path::PathBuf;

use cdbdoc::cdb::{BlobSource, DEFAULT_DATABASE_PATH, DirectorySource, LoadOptions, MaterialDatabase, Result};
use tracing::debug;

/// Where the database bytes come from.
#[derive(clap::Args)]
pub struct SourceArgs {
	/// A `.cdb` file, or a game data directory containing one.
	pub source: PathBuf,
	/// Database path inside a data directory.
	#[arg(long, default_value = DEFAULT_DATABASE_PATH)]
	pub cdb: String,
}

impl SourceArgs {
	/// Human-readable origin of the bytes.
	pub(crate) fn label(&self) -> String {
		if self.source.is_dir() {
			format!("{}:{}", self.source.display(), self.cdb)
		} else {
			self.source.display().to_string()
		}
	}

	/// Raw database bytes.
	pub(crate) fn read(&self) -> Result<Vec<u8>> {
		if self.source.is_dir() {
			debug!(root = %self.source.display(), cdb = %self.cdb, "reading database from directory");
			DirectorySource::new(&self.source).read_blob(&self.cdb)
		} else {
			Ok(std::fs::read(&self.source)?)
		}
	}

	/// Loaded database.
	pub(crate) fn open(&self) -> Result<MaterialDatabase> {
		MaterialDatabase::load_with(&self.read()?, &LoadOptions::default())
	}
}

/// Print one pretty JSON document to stdout.
pub(crate) fn emit_json<T: serde::Serialize>(payload: &T) {
	match serde_json::to_string_pretty(payload) {
		Ok(text) => println!("{text}"),
		Err(err) => eprintln!("error: json encode failed: {err}"),
	}
}

