use crate::cdb::{CdbHeader, Chunk, ChunkKind, ChunkReader, Cursor, Result, StringTable, TypeId, parse_class_chunk};

/// Kind-specific summary of one chunk.
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkDetail {
	/// Nothing beyond kind and size.
	None,
	/// String table with this many strings.
	Strings {
		/// Number of NUL-terminated entries.
		count: usize,
	},
	/// Class definition.
	Class {
		/// Declared version.
		version: u32,
		/// Raw flag word.
		flags: u16,
		/// `(name, type)` pairs in field order.
		fields: Vec<(String, String)>,
	},
	/// List with element count.
	List {
		/// Declared element count.
		count: u32,
	},
	/// Map with value type and pair count.
	Map {
		/// Value type name.
		value: String,
		/// Declared pair count.
		count: u32,
	},
	/// User wrapper with its stored type.
	User {
		/// Stored type name.
		stored: String,
	},
	/// The record could not be summarized.
	Error(String),
}

/// One listed chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkSummary {
	/// File offset of the chunk header.
	pub offset: usize,
	/// Kind tag.
	pub kind: ChunkKind,
	/// Payload size.
	pub size: usize,
	/// Leading class token: class name, list element, map key, or body class.
	pub class: Option<String>,
	/// Kind-specific detail.
	pub detail: ChunkDetail,
}

/// Raw chunk listing of one file.
#[derive(Debug, Clone)]
pub struct ChunkListing {
	/// Parsed header.
	pub header: CdbHeader,
	/// Chunks in file order.
	pub chunks: Vec<ChunkSummary>,
	/// Reader error that ended the listing early.
	pub error: Option<String>,
}

/// List every chunk without decoding object bodies.
///
/// Errors inside a single record become [`ChunkDetail::Error`]; an error of
/// the chunk stream itself ends the listing and is kept in `error`.
pub fn scan_chunks(bytes: &[u8]) -> Result<ChunkListing> {
	let reader = ChunkReader::new(bytes)?;
	let mut listing = ChunkListing {
		header: reader.header(),
		chunks: Vec::new(),
		error: None,
	};
	let mut strings = StringTable::default();

	for chunk in reader {
		let chunk = match chunk {
			Ok(chunk) => chunk,
			Err(err) => {
				listing.error = Some(err.to_string());
				break;
			}
		};
		if chunk.kind == ChunkKind::Strt {
			strings = StringTable::parse(chunk.payload);
		}

		let (class, detail) = summarize(&chunk, &strings).unwrap_or_else(|err| (None, ChunkDetail::Error(err.to_string())));
		listing.chunks.push(ChunkSummary {
			offset: chunk.offset,
			kind: chunk.kind,
			size: chunk.payload.len(),
			class,
			detail,
		});
	}

	Ok(listing)
}

fn summarize(chunk: &Chunk<'_>, strings: &StringTable) -> Result<(Option<String>, ChunkDetail)> {
	let mut cursor = chunk.cursor();
	let name = |cursor: &mut Cursor<'_>| -> Result<String> { Ok(strings.name(strings.read_ref(cursor)?).to_owned()) };

	Ok(match chunk.kind {
		ChunkKind::Strt => (
			None,
			ChunkDetail::Strings {
				count: chunk.payload.iter().filter(|byte| **byte == 0).count(),
			},
		),
		ChunkKind::Clas => match parse_class_chunk(&mut cursor, strings)? {
			Some(schema) => (
				Some(strings.name(schema.name).to_owned()),
				ChunkDetail::Class {
					version: schema.version,
					flags: schema.flags,
					fields: schema
						.fields
						.iter()
						.map(|field| (strings.name(field.name).to_owned(), strings.name(field.type_id).to_owned()))
						.collect(),
				},
			),
			None => (Some(strings.name(TypeId::UNKNOWN).to_owned()), ChunkDetail::None),
		},
		ChunkKind::List => {
			let class = name(&mut cursor)?;
			let count = if cursor.remaining() >= 4 { cursor.read_u32_le()? } else { 0 };
			(Some(class), ChunkDetail::List { count })
		}
		ChunkKind::Mapc => {
			let key = name(&mut cursor)?;
			let value = name(&mut cursor)?;
			let count = if cursor.remaining() >= 4 { cursor.read_u32_le()? } else { 0 };
			(Some(key), ChunkDetail::Map { value, count })
		}
		ChunkKind::User | ChunkKind::Usrd => {
			let declared = name(&mut cursor)?;
			let stored = name(&mut cursor)?;
			(Some(declared), ChunkDetail::User { stored })
		}
		ChunkKind::Objt | ChunkKind::Diff => (Some(name(&mut cursor)?), ChunkDetail::None),
		_ => (None, ChunkDetail::None),
	})
}
