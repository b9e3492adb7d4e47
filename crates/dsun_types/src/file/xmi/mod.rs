//! XMI music file support for `dsun-rs` project.
//!
//! XMI files carry the game's music sequences in a MIDI dialect wrapped
//! in an IFF-like envelope (see [`chunk`]). The interesting part is the
//! EVNT chunk: a stream of delays and events in which a handful of
//! controller messages drive looping and host callbacks.
//!
//! All edits are byte-precise rewrites inside the EVNT body, so the file
//! layout, every event offset, and the stream length never change:
//!
//! - **Obliteration** rewrites a 3-byte controller message into
//!   `BF 00 00`, a controller change the game ignores.
//! - **Loop rewrites** adjust the value byte of `FOR` controllers or
//!   fuse several infinite loops into one.
//!
//! # Usage Examples
//!
//! ```no_run
//! use dsun_types::file::xmi::File;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut xmi = File::open("TUNE.XMI")?;
//!
//! // Strip host-control hooks, then make every infinite loop play 4 times
//! xmi.remove_api_control();
//! xmi.set_all_loops(4);
//! xmi.save("TUNE.XMI")?;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;

use crate::file::XmiError;

pub mod chunk;
pub mod event;

pub use chunk::{EvntChunk, RbrnChunk};
pub use event::{ControllerKind, EventIndex};

/// XMI rewrite constants.
pub mod constants {
	/// Replacement bytes for an obliterated controller message: a
	/// controller change on channel 15 with controller and value zero
	pub const OBLITERATED_MESSAGE: [u8; 3] = [0xBF, 0x00, 0x00];

	/// `FOR` value bytes that mean "loop forever"
	pub const INFINITE_LOOP_VALUES: [u8; 2] = [0, 127];

	/// Byte distance from a controller's status byte to its value byte
	pub const VALUE_BYTE_OFFSET: usize = 2;
}

/// XMI file structure, owning the whole-file buffer and the scan results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
	/// Complete file bytes; mutations edit the EVNT slice in place
	data: Vec<u8>,

	evnt: EvntChunk,
	rbrn: Option<RbrnChunk>,
	index: EventIndex,
}

impl File {
	/// Loads an XMI file from a byte slice.
	///
	/// # Errors
	///
	/// Returns an error if the chunk envelope is malformed, the EVNT chunk
	/// is absent, or the event stream cannot be sized.
	pub fn from_bytes(data: &[u8]) -> Result<Self, XmiError> {
		Self::from_vec(data.to_vec())
	}

	/// Loads an XMI file, taking ownership of the buffer.
	pub fn from_vec(data: Vec<u8>) -> Result<Self, XmiError> {
		let scan = chunk::scan(&data)?;
		let index = event::scan(&data[scan.evnt.start..scan.evnt.start + scan.evnt.len])?;

		Ok(Self {
			data,
			evnt: scan.evnt,
			rbrn: scan.rbrn,
			index,
		})
	}

	/// Loads an XMI file from any reader.
	pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self, XmiError> {
		let mut data = Vec::new();
		reader.read_to_end(&mut data)?;
		Self::from_vec(data)
	}

	/// Opens and parses an XMI file from the specified path.
	pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, XmiError> {
		let data = std::fs::read(path)?;
		Self::from_vec(data)
	}

	/// Returns the location of the EVNT chunk body.
	pub fn evnt(&self) -> EvntChunk {
		self.evnt
	}

	/// Returns the location of the RBRN chunk body, if the file has one.
	pub fn rbrn(&self) -> Option<RbrnChunk> {
		self.rbrn
	}

	/// Returns the controller index built at scan time and kept current
	/// through mutations.
	pub fn index(&self) -> &EventIndex {
		&self.index
	}

	/// Returns the EVNT body bytes.
	pub fn evnt_body(&self) -> &[u8] {
		&self.data[self.evnt.start..self.evnt.start + self.evnt.len]
	}

	/// Obliterates every `CALLBACK` message, then every
	/// `INDIRECT_CONTROL` message, cutting the hosting program out of
	/// playback.
	pub fn remove_api_control(&mut self) {
		for kind in [ControllerKind::Callback, ControllerKind::IndirectControl] {
			let offsets: Vec<usize> = self.index.offsets(kind).iter().copied().collect();
			for offset in offsets {
				self.obliterate(kind, offset);
			}
		}
	}

	/// Pairs every `NEXT` with the greatest `FOR` before it and keeps the
	/// pairs whose `FOR` value byte means "loop forever".
	///
	/// The result maps `FOR` offsets to their `NEXT` offsets, ordered by
	/// `FOR` offset.
	pub fn infinite_loops(&self) -> BTreeMap<usize, usize> {
		let body = self.evnt_body();
		let fors = self.index.offsets(ControllerKind::For);

		let mut pairs = BTreeMap::new();
		for &next in self.index.offsets(ControllerKind::Next) {
			let Some(&for_offset) = fors.range(..next).next_back() else {
				continue;
			};
			let value = body[for_offset + constants::VALUE_BYTE_OFFSET];
			if constants::INFINITE_LOOP_VALUES.contains(&value) {
				pairs.insert(for_offset, next);
			}
		}
		pairs
	}

	/// Fuses the infinite loops into one outer loop by obliterating every
	/// `FOR` except the first and every paired `NEXT` except the last.
	///
	/// Does nothing when fewer than two infinite loops exist.
	pub fn unify_loops(&mut self) {
		let pairs = self.infinite_loops();
		if pairs.len() < 2 {
			return;
		}

		let last_next = pairs.values().copied().max().unwrap_or(0);
		for (i, (for_offset, next_offset)) in pairs.into_iter().enumerate() {
			if i > 0 {
				self.obliterate(ControllerKind::For, for_offset);
			}
			if next_offset != last_next {
				self.obliterate(ControllerKind::Next, next_offset);
			}
		}
	}

	/// Writes `count` into the value byte of every infinite `FOR`.
	pub fn set_all_loops(&mut self, count: u8) {
		let fors: Vec<usize> = self.infinite_loops().into_keys().collect();
		for for_offset in fors {
			self.data[self.evnt.start + for_offset + constants::VALUE_BYTE_OFFSET] = count;
		}
	}

	/// Zeroes the RBRN chunk's branch count, if the file has one.
	pub fn zero_rbrn_count(&mut self) {
		if let Some(rbrn) = &mut self.rbrn {
			self.data[rbrn.start..rbrn.start + 2].copy_from_slice(&0u16.to_le_bytes());
			rbrn.branch_count = 0;
		}
	}

	/// Returns the file bytes, including any rewrites.
	pub fn as_bytes(&self) -> &[u8] {
		&self.data
	}

	/// Serializes the file to bytes.
	pub fn to_bytes(&self) -> Vec<u8> {
		self.data.clone()
	}

	/// Saves the file to disk.
	pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), XmiError> {
		std::fs::write(path, &self.data)?;
		Ok(())
	}

	/// Rewrites the 3-byte controller message at `offset` into a no-op and
	/// drops it from the index.
	fn obliterate(&mut self, kind: ControllerKind, offset: usize) {
		let start = self.evnt.start + offset;
		self.data[start..start + 3].copy_from_slice(&constants::OBLITERATED_MESSAGE);
		self.index.remove(kind, offset);
	}
}

impl fmt::Display for File {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"XMI File: {} bytes, EVNT {} bytes, {} controllers, {} ticks",
			self.data.len(),
			self.evnt.len,
			self.index.controller_count(),
			self.index.total_ticks()
		)
	}
}

impl TryFrom<&[u8]> for File {
	type Error = XmiError;

	fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
		Self::from_bytes(value)
	}
}

impl TryFrom<Vec<u8>> for File {
	type Error = XmiError;

	fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
		Self::from_vec(value)
	}
}
