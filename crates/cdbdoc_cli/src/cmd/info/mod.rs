use cdbdoc::cdb::{MaterialDatabase, Result};

use crate::cmd::util::{SourceArgs, emit_json};

#[derive(clap::Args)]
pub struct Args {
	#[command(flatten)]
	pub source: SourceArgs,
	#[arg(long)]
	pub json: bool,
}

/// Print header, load counters and object totals.
pub fn run(args: Args) -> Result<()> {
	let Args { source, json } = args;

	let bytes = source.read()?;
	let db = MaterialDatabase::load(&bytes)?;
	let header = db.header();
	let stats = db.stats();
	let materials = db.material_ids().len();
	let components: usize = db.graph().iter().map(|record| record.components.len()).sum();

	if json {
		let payload = InfoJson {
			path: source.label(),
			size: bytes.len(),
			version: header.version,
			chunk_count: header.chunk_count,
			strings: db.strings().len(),
			classes: db.classes().len(),
			objects: db.graph().len(),
			materials,
			components,
			load: LoadJson {
				chunks: stats.chunks,
				classes: stats.classes,
				components: stats.components,
				skipped_bodies: stats.skipped_bodies,
				skipped_chunks: stats.skipped_chunks,
				orphaned: stats.orphaned,
			},
		};
		emit_json(&payload);
		return Ok(());
	}

	println!("path: {}", source.label());
	println!("size: {}", bytes.len());
	println!("version: {}", header.version);
	println!("chunk_count: {}", header.chunk_count);
	println!("strings: {}", db.strings().len());
	println!("classes: {}", db.classes().len());
	println!("objects: {}", db.graph().len());
	println!("materials: {materials}");
	println!("components: {components}");
	println!("load:");
	println!("  chunks: {}", stats.chunks);
	println!("  class_chunks: {}", stats.classes);
	println!("  component_bodies: {}", stats.components);
	println!("  skipped_bodies: {}", stats.skipped_bodies);
	println!("  skipped_chunks: {}", stats.skipped_chunks);
	println!("  orphaned: {}", stats.orphaned);

	Ok(())
}

#[derive(serde::Serialize)]
struct InfoJson {
	path: String,
	size: usize,
	version: u32,
	chunk_count: u32,
	strings: usize,
	classes: usize,
	objects: usize,
	materials: usize,
	components: usize,
	load: LoadJson,
}

#[derive(serde::Serialize)]
struct LoadJson {
	chunks: usize,
	classes: usize,
	components: usize,
	skipped_bodies: usize,
	skipped_chunks: usize,
	orphaned: usize,
}
