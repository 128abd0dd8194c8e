use cdbdoc::cdb::{Result, hash_path};

use crate::cmd::util::emit_json;

#[derive(clap::Args)]
pub struct Args {
	/// Resource paths, `/` or `\` separated.
	#[arg(required = true)]
	pub paths: Vec<String>,
	#[arg(long)]
	pub json: bool,
}

/// Print the persistent id of each path.
pub fn run(args: Args) -> Result<()> {
	let Args { paths, json } = args;

	let hashes: Vec<HashJson> = paths
		.into_iter()
		.map(|path| {
			let id = hash_path(&path);
			HashJson {
				id: id.to_string(),
				dir: id.dir,
				file: id.file,
				ext: id.ext,
				path,
			}
		})
		.collect();

	if json {
		emit_json(&hashes);
		return Ok(());
	}

	for item in &hashes {
		println!("{} {}", item.id, item.path);
	}
	Ok(())
}

#[derive(serde::Serialize)]
struct HashJson {
	path: String,
	id: String,
	dir: u32,
	file: u32,
	ext: u32,
}
