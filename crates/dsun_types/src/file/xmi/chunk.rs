//! Chunk envelope of XMI music files.
//!
//! XMI files wrap their payload in an IFF-like envelope with big-endian
//! chunk lengths:
//!
//! ```text
//! FORM <len> <body>          Info block, skipped whole
//! CAT  <len> <subtag>        Catalog holding the sequence
//! FORM <len> <subtag>        The sequence itself, then its chunks:
//!   EVNT <len> <body>        Event stream (the part worth editing)
//!   RBRN <len> <body>        Sequence-branch table, LE16 count first
//!   .... <len> <body>        Anything else is skipped
//! ```
//!
//! Only the chunks the rewriter touches are interpreted; everything else
//! is carried through byte-for-byte.

use crate::file::XmiError;

/// Chunk tags the scanner recognizes.
pub mod tags {
	/// IFF `FORM` group tag
	pub const FORM: [u8; 4] = *b"FORM";

	/// IFF `CAT ` group tag
	pub const CAT: [u8; 4] = *b"CAT ";

	/// Event-stream chunk
	pub const EVNT: [u8; 4] = *b"EVNT";

	/// Sequence-branch chunk
	pub const RBRN: [u8; 4] = *b"RBRN";
}

/// Location of the EVNT chunk body inside the file buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvntChunk {
	/// Absolute offset of the body's first byte
	pub start: usize,

	/// Body length in bytes
	pub len: usize,
}

/// Location of the RBRN chunk body and its branch count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RbrnChunk {
	/// Absolute offset of the body's first byte; the little-endian 16-bit
	/// branch count sits right here
	pub start: usize,

	/// Branch count read at scan time
	pub branch_count: u16,
}

/// Chunk locations found by a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ChunkScan {
	pub evnt: EvntChunk,
	pub rbrn: Option<RbrnChunk>,
}

/// Walks the envelope and locates the EVNT and RBRN chunks.
pub(crate) fn scan(data: &[u8]) -> Result<ChunkScan, XmiError> {
	let mut pos = 0;

	// Info FORM, body skipped whole
	expect_tag(data, pos, tags::FORM)?;
	let info_len = read_u32_be(data, pos + 4)?;
	pos += 8 + info_len as usize;

	// Catalog and sequence headers carry a subtag after the length
	expect_tag(data, pos, tags::CAT)?;
	let _ = read_u32_be(data, pos + 4)?;
	pos += 12;

	expect_tag(data, pos, tags::FORM)?;
	let _ = read_u32_be(data, pos + 4)?;
	pos += 12;

	let mut evnt = None;
	let mut rbrn = None;

	while pos + 8 <= data.len() {
		let tag = [data[pos], data[pos + 1], data[pos + 2], data[pos + 3]];
		let len = read_u32_be(data, pos + 4)? as usize;
		let body = pos + 8;

		if body + len > data.len() {
			return Err(XmiError::InsufficientData {
				expected: body + len,
				actual: data.len(),
			});
		}

		match tag {
			tags::EVNT => {
				if evnt.is_none() {
					evnt = Some(EvntChunk {
						start: body,
						len,
					});
				}
			}
			tags::RBRN => {
				let branch_count = read_u16_le(data, body)?;
				rbrn = Some(RbrnChunk {
					start: body,
					branch_count,
				});
			}
			_ => {}
		}

		pos = body + len;
	}

	let evnt = evnt.ok_or(XmiError::MissingChunk(tags::EVNT))?;
	Ok(ChunkScan {
		evnt,
		rbrn,
	})
}

fn expect_tag(data: &[u8], pos: usize, expected: [u8; 4]) -> Result<(), XmiError> {
	let bytes = data.get(pos..pos + 4).ok_or(XmiError::InsufficientData {
		expected: pos + 4,
		actual: data.len(),
	})?;
	let actual = [bytes[0], bytes[1], bytes[2], bytes[3]];
	if actual != expected {
		return Err(XmiError::UnexpectedTag {
			offset: pos,
			expected,
			actual,
		});
	}
	Ok(())
}

fn read_u32_be(data: &[u8], pos: usize) -> Result<u32, XmiError> {
	let bytes = data.get(pos..pos + 4).ok_or(XmiError::InsufficientData {
		expected: pos + 4,
		actual: data.len(),
	})?;
	Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

pub(crate) fn read_u16_le(data: &[u8], pos: usize) -> Result<u16, XmiError> {
	let bytes = data.get(pos..pos + 2).ok_or(XmiError::InsufficientData {
		expected: pos + 2,
		actual: data.len(),
	})?;
	Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
}
