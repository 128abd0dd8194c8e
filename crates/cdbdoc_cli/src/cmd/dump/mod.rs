use std::path::{Path, PathBuf};

use cdbdoc::cdb::{MaterialDatabase, Result};
use tracing::{info, warn};

use crate::cmd::util::SourceArgs;

#[derive(clap::Args)]
pub struct Args {
	#[command(flatten)]
	pub source: SourceArgs,
	/// Material paths, `/` or `\` separated.
	#[arg(required = true)]
	pub paths: Vec<String>,
	/// Write `<out>/<path>.json` files instead of printing.
	#[arg(long)]
	pub out: Option<PathBuf>,
}

/// Export material JSON documents.
pub fn run(args: Args) -> Result<()> {
	let Args { source, paths, out } = args;

	let db = MaterialDatabase::load(&source.read()?)?;
	for path in &paths {
		let text = db.dump_json(path);
		if text.is_empty() {
			warn!(path = %path, "material not found");
			continue;
		}

		match &out {
			Some(root) => {
				let target = output_path(root, path);
				if let Some(parent) = target.parent() {
					std::fs::create_dir_all(parent)?;
				}
				std::fs::write(&target, format!("{text}\n"))?;
				info!(path = %path, out = %target.display(), "wrote material");
			}
			None => println!("{text}"),
		}
	}

	Ok(())
}

/// `<root>/<path>.json`, keeping only normal path components.
fn output_path(root: &Path, path: &str) -> PathBuf {
	let mut target = root.to_path_buf();
	for part in path.split(['/', '\\']).filter(|part| !part.is_empty() && *part != "." && *part != "..") {
		target.push(part);
	}
	let mut name = target.file_name().map(|name| name.to_os_string()).unwrap_or_default();
	name.push(".json");
	target.set_file_name(name);
	target
}

#[cfg(test)]
mod tests;
