use cdbdoc::cdb::{ChunkDetail, ChunkSummary, Result, scan_chunks};

use crate::cmd::util::{SourceArgs, emit_json};

#[derive(clap::Args)]
pub struct Args {
	#[command(flatten)]
	pub source: SourceArgs,
	/// Only list chunks with this kind tag.
	#[arg(long)]
	pub kind: Option<String>,
	#[arg(long)]
	pub json: bool,
}

/// List every chunk of the file in stream order.
pub fn run(args: Args) -> Result<()> {
	let Args { source, kind, json } = args;

	let listing = scan_chunks(&source.read()?)?;
	let selected: Vec<&ChunkSummary> = listing
		.chunks
		.iter()
		.filter(|chunk| kind.as_deref().is_none_or(|wanted| chunk.kind.to_string().eq_ignore_ascii_case(wanted)))
		.collect();

	if json {
		let payload = ChunksJson {
			path: source.label(),
			version: listing.header.version,
			chunk_count: listing.header.chunk_count,
			chunks: selected.iter().map(|chunk| chunk_json(chunk)).collect(),
			error: listing.error.clone(),
		};
		emit_json(&payload);
		return Ok(());
	}

	println!("path: {}", source.label());
	println!("version: {}", listing.header.version);
	println!("chunk_count: {}", listing.header.chunk_count);
	for chunk in &selected {
		let class = chunk.class.as_deref().unwrap_or("-");
		println!("{:>10} {} {:>8} {} {}", chunk.offset, chunk.kind, chunk.size, class, detail_label(&chunk.detail));
		if let ChunkDetail::Class { fields, .. } = &chunk.detail {
			for (name, type_name) in fields {
				println!("{:>24} {type_name} {name}", "");
			}
		}
	}
	if let Some(err) = &listing.error {
		println!("error: {err}");
	}

	Ok(())
}

fn detail_label(detail: &ChunkDetail) -> String {
	match detail {
		ChunkDetail::None => String::new(),
		ChunkDetail::Strings { count } => format!("strings={count}"),
		ChunkDetail::Class { version, flags, fields } => format!("version={version} flags={flags:#06x} fields={}", fields.len()),
		ChunkDetail::List { count } => format!("count={count}"),
		ChunkDetail::Map { value, count } => format!("value={value} count={count}"),
		ChunkDetail::User { stored } => format!("stored={stored}"),
		ChunkDetail::Error(err) => format!("error={err}"),
	}
}

fn chunk_json(chunk: &ChunkSummary) -> ChunkJson {
	let mut out = ChunkJson {
		offset: chunk.offset,
		kind: chunk.kind.to_string(),
		size: chunk.size,
		class: chunk.class.clone(),
		..ChunkJson::default()
	};
	match &chunk.detail {
		ChunkDetail::None => {}
		ChunkDetail::Strings { count } => out.count = Some(*count as u64),
		ChunkDetail::Class { version, flags, fields } => {
			out.version = Some(*version);
			out.flags = Some(*flags);
			out.fields = Some(
				fields
					.iter()
					.map(|(name, type_name)| FieldJson {
						name: name.clone(),
						type_name: type_name.clone(),
					})
					.collect(),
			);
		}
		ChunkDetail::List { count } => out.count = Some(u64::from(*count)),
		ChunkDetail::Map { value, count } => {
			out.value = Some(value.clone());
			out.count = Some(u64::from(*count));
		}
		ChunkDetail::User { stored } => out.stored = Some(stored.clone()),
		ChunkDetail::Error(err) => out.error = Some(err.clone()),
	}
	out
}

#[derive(serde::Serialize)]
struct ChunksJson {
	path: String,
	version: u32,
	chunk_count: u32,
	chunks: Vec<ChunkJson>,
	error: Option<String>,
}

#[derive(serde::Serialize, Default)]
struct ChunkJson {
	offset: usize,
	kind: String,
	size: usize,
	class: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	count: Option<u64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	version: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	flags: Option<u16>,
	#[serde(skip_serializing_if = "Option::is_none")]
	fields: Option<Vec<FieldJson>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	value: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	stored: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	error: Option<String>,
}

#[derive(serde::Serialize)]
struct FieldJson {
	name: String,
	#[serde(rename = "type")]
	type_name: String,
}
