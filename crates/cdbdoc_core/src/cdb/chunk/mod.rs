use std::fmt;

use crate::cdb::{CdbError, CdbHeader, Cursor, Result};

/// Four-character kind tag of a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkKind {
	/// File header.
	Beth,
	/// String table.
	Strt,
	/// Type marker.
	Type,
	/// Class definition.
	Clas,
	/// Ordered list, or a top-level index list.
	List,
	/// Ordered map.
	Mapc,
	/// Full object component body.
	Objt,
	/// Differential object component body.
	Diff,
	/// User-typed wrapper.
	User,
	/// User-typed wrapper carrying a diff.
	Usrd,
	/// Anything else; skipped by the loader.
	Other([u8; 4]),
}

impl ChunkKind {
	/// Classify a raw tag.
	pub fn from_tag(tag: [u8; 4]) -> Self {
		match &tag {
			b"BETH" => Self::Beth,
			b"STRT" => Self::Strt,
			b"TYPE" => Self::Type,
			b"CLAS" => Self::Clas,
			b"LIST" => Self::List,
			b"MAPC" => Self::Mapc,
			b"OBJT" => Self::Objt,
			b"DIFF" => Self::Diff,
			b"USER" => Self::User,
			b"USRD" => Self::Usrd,
			_ => Self::Other(tag),
		}
	}

	/// Raw four-byte tag.
	pub fn tag(self) -> [u8; 4] {
		match self {
			Self::Beth => *b"BETH",
			Self::Strt => *b"STRT",
			Self::Type => *b"TYPE",
			Self::Clas => *b"CLAS",
			Self::List => *b"LIST",
			Self::Mapc => *b"MAPC",
			Self::Objt => *b"OBJT",
			Self::Diff => *b"DIFF",
			Self::User => *b"USER",
			Self::Usrd => *b"USRD",
			Self::Other(tag) => tag,
		}
	}
}

impl fmt::Display for ChunkKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for byte in self.tag() {
			let ch = if byte.is_ascii_graphic() { char::from(byte) } else { '?' };
			write!(f, "{ch}")?;
		}
		Ok(())
	}
}

/// One tagged, length-delimited region of the file.
#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
	/// Kind tag.
	pub kind: ChunkKind,
	/// File offset of the 8-byte chunk header.
	pub offset: usize,
	/// Payload bytes, excluding the header.
	pub payload: &'a [u8],
}

impl<'a> Chunk<'a> {
	/// Size of the tag and length prefix.
	pub const HEADER_SIZE: usize = 8;

	/// Fresh cursor bounded to this chunk's payload.
	pub fn cursor(&self) -> Cursor<'a> {
		Cursor::with_base(self.payload, self.payload_offset())
	}

	/// File offset of the first payload byte.
	pub fn payload_offset(&self) -> usize {
		self.offset + Self::HEADER_SIZE
	}
}

/// Sequential chunk iterator over a whole `.cdb` file.
///
/// Iteration starts after the `BETH` header and stops once the declared
/// chunk count is exhausted or the bytes run out. After an error the
/// iterator is fused.
pub struct ChunkReader<'a> {
	cursor: Cursor<'a>,
	header: CdbHeader,
	left: u32,
	done: bool,
}

impl<'a> ChunkReader<'a> {
	/// Validate the header and position the reader at the first chunk.
	pub fn new(bytes: &'a [u8]) -> Result<Self> {
		let header = CdbHeader::parse(bytes)?;
		let mut cursor = Cursor::new(bytes);
		let _ = cursor.read_exact(CdbHeader::SIZE)?;
		Ok(Self {
			cursor,
			header,
			left: header.chunk_count.saturating_sub(1),
			done: false,
		})
	}

	/// Parsed file header.
	pub fn header(&self) -> CdbHeader {
		self.header
	}

	/// File offset of the next chunk header.
	pub fn offset(&self) -> usize {
		self.cursor.offset()
	}

	/// Take the next chunk, requiring it to be one of `accept`.
	///
	/// Used for nested wrappers (`LIST`, `MAPC`, `USER`, `USRD`) that are
	/// stored as the chunks directly following their owner.
	pub fn expect_next(&mut self, accept: &[ChunkKind], expected: &'static str) -> Result<Chunk<'a>> {
		let at = self.offset();
		match self.next() {
			Some(Ok(chunk)) if accept.contains(&chunk.kind) => Ok(chunk),
			Some(Ok(chunk)) => Err(CdbError::UnexpectedChunkKind {
				expected,
				got: chunk.kind.to_string(),
				at: chunk.offset,
			}),
			Some(Err(err)) => Err(err),
			None => Err(CdbError::UnexpectedChunkKind {
				expected,
				got: "EOF".to_owned(),
				at,
			}),
		}
	}

	fn read_chunk(&mut self) -> Result<Chunk<'a>> {
		let offset = self.cursor.offset();
		let kind = ChunkKind::from_tag(self.cursor.read_code4()?);
		let size = self.cursor.read_u32_le()? as usize;
		let payload = self.cursor.read_exact(size)?;
		Ok(Chunk { kind, offset, payload })
	}
}

impl<'a> Iterator for ChunkReader<'a> {
	type Item = Result<Chunk<'a>>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.done {
			return None;
		}

		if self.left == 0 || self.cursor.remaining() == 0 {
			self.done = true;
			return None;
		}

		match self.read_chunk() {
			Ok(chunk) => {
				self.left -= 1;
				Some(Ok(chunk))
			}
			Err(err) => {
				self.done = true;
				Some(Err(err))
			}
		}
	}
}
