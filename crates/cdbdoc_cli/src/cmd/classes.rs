use cdbdoc::cdb::{CdbError, ClassSchema, MaterialDatabase, Result, StringTable};

use crate::cmd::util::{SourceArgs, emit_json};

#[derive(clap::Args)]
pub struct Args {
	#[command(flatten)]
	pub source: SourceArgs,
	/// Print the fields of one class.
	#[arg(long = "class")]
	pub class_name: Option<String>,
	#[arg(long)]
	pub json: bool,
}

/// List class definitions, or the fields of one class.
pub fn run(args: Args) -> Result<()> {
	let Args { source, class_name, json } = args;

	let db = MaterialDatabase::load(&source.read()?)?;
	let strings = db.strings();

	let schemas: Vec<&ClassSchema> = match &class_name {
		Some(name) => {
			let schema = strings
				.find(name)
				.and_then(|id| db.classes().get(id))
				.ok_or_else(|| CdbError::ClassNotFound { name: name.clone() })?;
			vec![schema]
		}
		None => db.classes().iter().collect(),
	};

	if json {
		let payload = ClassesJson {
			path: source.label(),
			classes: schemas.iter().map(|schema| class_json(strings, schema)).collect(),
		};
		emit_json(&payload);
		return Ok(());
	}

	println!("path: {}", source.label());
	println!("classes: {}", db.classes().len());
	for schema in schemas {
		println!(
			"{} version={} flags={:#06x} fields={}{}",
			strings.name(schema.name),
			schema.version,
			schema.flags,
			schema.fields.len(),
			if schema.is_user_defined { " user" } else { "" }
		);
		if class_name.is_some() {
			for (idx, field) in schema.fields.iter().enumerate() {
				println!("  [{idx}] {} {}", strings.name(field.type_id), strings.name(field.name));
			}
		}
	}

	Ok(())
}

fn class_json(strings: &StringTable, schema: &ClassSchema) -> ClassJson {
	ClassJson {
		name: strings.name(schema.name).to_owned(),
		version: schema.version,
		flags: schema.flags,
		user_defined: schema.is_user_defined,
		fields: schema
			.fields
			.iter()
			.map(|field| ClassFieldJson {
				name: strings.name(field.name).to_owned(),
				type_name: strings.name(field.type_id).to_owned(),
				offset: field.data_offset,
				size: field.data_size,
			})
			.collect(),
	}
}

#[derive(serde::Serialize)]
struct ClassesJson {
	path: String,
	classes: Vec<ClassJson>,
}

#[derive(serde::Serialize)]
struct ClassJson {
	name: String,
	version: u32,
	flags: u16,
	user_defined: bool,
	fields: Vec<ClassFieldJson>,
}

#[derive(serde::Serialize)]
struct ClassFieldJson {
	name: String,
	#[serde(rename = "type")]
	type_name: String,
	offset: u16,
	size: u16,
}
