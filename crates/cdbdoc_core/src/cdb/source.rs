use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::cdb::Result;

/// Provider of named blobs, such as an archive or a directory of loose files.
pub trait BlobSource {
	/// Read the blob stored under a `/`- or `\`-separated, case-insensitive path.
	fn read_blob(&self, path: &str) -> Result<Vec<u8>>;
}

/// Loose files under a root directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
	root: PathBuf,
}

impl DirectorySource {
	/// Source rooted at `root`.
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	/// Root directory.
	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Map a blob path to a file, matching each component case-insensitively
	/// when the exact spelling does not exist.
	pub fn resolve(&self, path: &str) -> Result<PathBuf> {
		let mut out = self.root.clone();
		for part in path.split(['/', '\\']).filter(|part| !part.is_empty()) {
			let exact = out.join(part);
			if exact.exists() {
				out = exact;
				continue;
			}
			out = find_ignore_case(&out, part)?.ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("{path} not found under {}", self.root.display())))?;
		}
		Ok(out)
	}
}

fn find_ignore_case(dir: &Path, name: &str) -> Result<Option<PathBuf>> {
	for entry in fs::read_dir(dir)? {
		let entry = entry?;
		if entry.file_name().to_string_lossy().eq_ignore_ascii_case(name) {
			return Ok(Some(entry.path()));
		}
	}
	Ok(None)
}

impl BlobSource for DirectorySource {
	fn read_blob(&self, path: &str) -> Result<Vec<u8>> {
		Ok(fs::read(self.resolve(path)?)?)
	}
}

#[cfg(test)]
mod tests {
	use super::{BlobSource, DirectorySource};
	use crate::cdb::CdbError;

	#[test]
	fn reads_with_either_separator_and_any_case() {
		let root = cdbdoc_testkit::scratch_dir("directory-source");
		std::fs::create_dir_all(root.join("Materials")).expect("mkdir");
		std::fs::write(root.join("Materials").join("MaterialsBeta.cdb"), b"blob").expect("write");

		let source = DirectorySource::new(&root);
		assert_eq!(source.read_blob("materials/materialsbeta.cdb").expect("lowercase"), b"blob");
		assert_eq!(source.read_blob("MATERIALS\\MATERIALSBETA.CDB").expect("uppercase"), b"blob");
		assert!(matches!(source.read_blob("materials/missing.cdb"), Err(CdbError::Io(_))));
	}
}
