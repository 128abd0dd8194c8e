use cdbdoc::cdb::{MaterialDatabase, ObjectRecord, Result, hash_path};
use tracing::warn;

use crate::cmd::util::{SourceArgs, emit_json};

#[derive(clap::Args)]
pub struct Args {
	#[command(flatten)]
	pub source: SourceArgs,
	/// Material paths, `/` or `\` separated.
	#[arg(required = true)]
	pub paths: Vec<String>,
	#[arg(long)]
	pub json: bool,
}

/// Resolve material paths to the objects that belong to them.
pub fn run(args: Args) -> Result<()> {
	let Args { source, paths, json } = args;

	let db = MaterialDatabase::load(&source.read()?)?;
	let results: Vec<FindJson> = paths
		.iter()
		.map(|path| {
			let objects = db.objects_for(path);
			if objects.is_empty() {
				warn!(path = %path, "material not found");
			}
			FindJson {
				path: path.clone(),
				id: hash_path(path).to_string(),
				objects: objects.into_iter().map(|record| object_json(&db, record)).collect(),
			}
		})
		.collect();

	if json {
		emit_json(&results);
		return Ok(());
	}

	for result in &results {
		println!("{} {} objects={}", result.path, result.id, result.objects.len());
		for object in &result.objects {
			println!(
				"  db_id={} id={} parent={} components={}{}",
				object.db_id,
				object.id,
				object.parent.map_or_else(|| "-".to_owned(), |parent| parent.to_string()),
				object.components,
				object.root.as_deref().map(|root| format!(" root={root}")).unwrap_or_default()
			);
		}
	}

	Ok(())
}

fn object_json(db: &MaterialDatabase, record: &ObjectRecord) -> FindObjectJson {
	let root = db.renderer().parent_name(record);
	FindObjectJson {
		db_id: record.db_id,
		id: record.persistent_id.to_string(),
		parent: record.parent,
		root: (!root.is_empty()).then_some(root),
		components: record.components.len(),
	}
}

#[derive(serde::Serialize)]
struct FindJson {
	path: String,
	id: String,
	objects: Vec<FindObjectJson>,
}

#[derive(serde::Serialize)]
struct FindObjectJson {
	db_id: u32,
	id: String,
	parent: Option<u32>,
	root: Option<String>,
	components: usize,
}
