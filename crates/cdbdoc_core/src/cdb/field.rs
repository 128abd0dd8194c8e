use tracing::debug;

use crate::cdb::Cursor;

/// Field-number stream of a struct body.
///
/// Full bodies visit every field in order. Diff bodies carry explicit `u16`
/// field numbers: a negative number ends the stream, running out of data ends
/// it, and an out-of-range number discards the rest of the enclosing chunk.
#[derive(Debug, Clone)]
pub struct FieldCursor {
	count: u32,
	is_diff: bool,
	next_full: u32,
	done: bool,
}

impl FieldCursor {
	/// Stream over a schema with `field_count` fields.
	pub fn new(field_count: usize, is_diff: bool) -> Self {
		Self {
			count: u32::try_from(field_count).unwrap_or(u32::MAX),
			is_diff,
			next_full: 0,
			done: false,
		}
	}

	/// Next field number to decode, reading diff indices from `cursor`.
	pub fn next(&mut self, cursor: &mut Cursor<'_>) -> Option<u32> {
		if self.done {
			return None;
		}

		if !self.is_diff {
			if self.next_full >= self.count {
				self.done = true;
				return None;
			}
			let index = self.next_full;
			self.next_full += 1;
			return Some(index);
		}

		let Ok(raw) = cursor.read_u16_le() else {
			cursor.skip_rest();
			self.done = true;
			return None;
		};

		if (raw as i16) < 0 {
			self.done = true;
			return None;
		}

		let index = u32::from(raw);
		if index >= self.count {
			debug!(at = cursor.offset() - 2, index, count = self.count, "diff field number out of range, skipping rest of chunk");
			cursor.skip_rest();
			self.done = true;
			return None;
		}

		Some(index)
	}
}

#[cfg(test)]
mod tests {
	use super::FieldCursor;
	use crate::cdb::Cursor;

	fn drain(stream: &mut FieldCursor, cursor: &mut Cursor<'_>) -> Vec<u32> {
		let mut out = Vec::new();
		while let Some(index) = stream.next(cursor) {
			out.push(index);
		}
		out
	}

	#[test]
	fn full_stream_yields_every_field() {
		let mut cursor = Cursor::new(&[]);
		assert_eq!(drain(&mut FieldCursor::new(3, false), &mut cursor), vec![0, 1, 2]);
		assert!(drain(&mut FieldCursor::new(0, false), &mut cursor).is_empty());
	}

	#[test]
	fn diff_stream_stops_on_terminator() {
		let bytes = [2, 0, 0, 0, 0xFF, 0xFF, 9, 9];
		let mut cursor = Cursor::new(&bytes);
		assert_eq!(drain(&mut FieldCursor::new(4, true), &mut cursor), vec![2, 0]);
		assert_eq!(cursor.remaining(), 2);
	}

	#[test]
	fn diff_stream_skips_rest_on_out_of_range() {
		let bytes = [1, 0, 7, 0, 1, 2, 3];
		let mut cursor = Cursor::new(&bytes);
		assert_eq!(drain(&mut FieldCursor::new(2, true), &mut cursor), vec![1]);
		assert_eq!(cursor.remaining(), 0);
	}

	#[test]
	fn diff_stream_ends_on_short_data() {
		let bytes = [1];
		let mut cursor = Cursor::new(&bytes);
		assert!(drain(&mut FieldCursor::new(2, true), &mut cursor).is_empty());
		assert_eq!(cursor.remaining(), 0);
	}
}
