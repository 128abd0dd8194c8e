use crate::cdb::{CdbError, Result};

/// Parsed `BETH` header chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CdbHeader {
	/// Container version; only `4` is supported.
	pub version: u32,
	/// Declared number of chunks, header included.
	pub chunk_count: u32,
}

impl CdbHeader {
	/// Size of the header chunk in bytes.
	pub const SIZE: usize = 16;
	/// Four-byte tag of the header chunk.
	pub const MAGIC: [u8; 4] = *b"BETH";
	/// The only supported container version.
	pub const VERSION: u32 = 4;

	/// Parse the header from the beginning of `bytes`.
	pub fn parse(bytes: &[u8]) -> Result<Self> {
		let mut magic = [0_u8; 4];
		let prefix = &bytes[..bytes.len().min(4)];
		magic[..prefix.len()].copy_from_slice(prefix);

		let header = bytes.get(0..Self::SIZE).ok_or(CdbError::InvalidHeader { magic })?;
		if magic != Self::MAGIC || le_u32(&header[4..8]) != 8 {
			return Err(CdbError::InvalidHeader { magic });
		}

		let version = le_u32(&header[8..12]);
		if version != Self::VERSION {
			return Err(CdbError::UnsupportedVersion { version });
		}

		Ok(Self {
			version,
			chunk_count: le_u32(&header[12..16]),
		})
	}
}

fn le_u32(bytes: &[u8]) -> u32 {
	let mut buf = [0_u8; 4];
	buf.copy_from_slice(&bytes[..4]);
	u32::from_le_bytes(buf)
}

#[cfg(test)]
mod tests {
	use super::CdbHeader;
	use crate::cdb::CdbError;

	fn header(version: u32, count: u32) -> Vec<u8> {
		let mut out = b"BETH".to_vec();
		out.extend_from_slice(&8_u32.to_le_bytes());
		out.extend_from_slice(&version.to_le_bytes());
		out.extend_from_slice(&count.to_le_bytes());
		out
	}

	#[test]
	fn parses_valid_header() {
		let parsed = CdbHeader::parse(&header(4, 12)).expect("header parses");
		assert_eq!(parsed, CdbHeader { version: 4, chunk_count: 12 });
	}

	#[test]
	fn rejects_wrong_magic_and_version() {
		let mut bad = header(4, 1);
		bad[0] = b'X';
		assert!(matches!(CdbHeader::parse(&bad), Err(CdbError::InvalidHeader { .. })));
		assert!(matches!(CdbHeader::parse(&header(5, 1)), Err(CdbError::UnsupportedVersion { version: 5 })));
		assert!(matches!(CdbHeader::parse(b"BE"), Err(CdbError::InvalidHeader { magic }) if magic == *b"BE\0\0"));
	}
}
