use crate::cdb::PersistentId;

/// Raw reflected CRC-32 (polynomial `0xEDB88320`) with a zero initial register and no final xor.
fn raw_crc32(bytes: impl IntoIterator<Item = u8>) -> u32 {
	// crc32fast inverts the register on entry and exit; pre-inverting the
	// initial value and inverting the result yields the raw register.
	let mut hasher = crc32fast::Hasher::new_with_initial(0xFFFF_FFFF);
	for byte in bytes {
		hasher.update(&[byte]);
	}
	!hasher.finalize()
}

/// CRC of an ASCII-lowercased name, as used for base names.
pub fn crc32_lowercase(name: &str) -> u32 {
	raw_crc32(name.bytes().map(|byte| byte.to_ascii_lowercase()))
}

/// Hash a resource path into its persistent identity.
///
/// The path splits at the last `/` or `\` and at the last `.` after it.
/// Directory separators are normalized to `\` and ASCII letters are
/// lowercased, so the result is case-insensitive.
pub fn hash_path(path: &str) -> PersistentId {
	let bytes = path.as_bytes();
	let sep = bytes.iter().rposition(|byte| matches!(byte, b'/' | b'\\'));
	let dot = bytes.iter().rposition(|byte| *byte == b'.').filter(|dot| sep.is_none_or(|sep| *dot > sep));

	let (dir, name_start) = match sep {
		Some(sep) => (&bytes[..sep], sep + 1),
		None => (&bytes[..0], 0),
	};
	let name_end = dot.unwrap_or(bytes.len());
	let ext = dot.map_or(&bytes[..0], |dot| &bytes[dot + 1..]);

	PersistentId {
		dir: raw_crc32(dir.iter().map(|byte| match byte {
			b'/' => b'\\',
			other => other.to_ascii_lowercase(),
		})),
		file: raw_crc32(bytes[name_start..name_end].iter().map(u8::to_ascii_lowercase)),
		ext: pack_extension(ext),
	}
}

fn pack_extension(ext: &[u8]) -> u32 {
	let mut packed = [0_u8; 4];
	let used = match ext.len() {
		0 => 0,
		1 => 1,
		2 => 2,
		_ => ext.len().min(4),
	};
	packed[..used].copy_from_slice(&ext[..used]);
	let value = u32::from_le_bytes(packed);
	value | ((value >> 1) & 0x2020_2020)
}
