//! Planar frame decoding (`PLAN` and `PLNR`).
//!
//! Both planar encodings share one layout:
//!
//! ```text
//! Offset  Size       Field     Description
//! ------  ---------  --------  ------------------------------------------
//! +0x00   2          width     Frame width in pixels (little-endian)
//! +0x02   2          height    Frame height in pixels (little-endian)
//! +0x04   1          marker    0xFF
//! +0x05   4          variant   ASCII "PLAN" or "PLNR"
//! +0x09   1          bps       Bits per symbol (0 = empty frame)
//! +0x0A   1 << bps   dict      Pixel-value dictionary, indexed by symbol
//! +...    ...        stream    Big-endian bit stream of symbols
//! ```
//!
//! Every pixel is produced by drawing a symbol and looking it up in the
//! dictionary; a dictionary value of 0 is transparent. `PLAN` draws one
//! `bps`-bit code per pixel. `PLNR` feeds the same codes through a
//! run-length state machine: a non-zero code stands for itself, the pair
//! `(0, 0)` is a single explicit zero, and `(0, n)` repeats the previous
//! code `n + 2` times.

use crate::file::ImgError;
use crate::file::bits::{BitOrder, BitReader};

use super::frame::{Frame, PixelRun, read_u8, read_u16_le};

/// Offset of the bits-per-symbol byte within a planar frame header
const BPS_OFFSET: usize = 9;

/// Offset of the dictionary within a planar frame header
const DICT_OFFSET: usize = 10;

/// Widest symbol the dictionary scheme supports (dictionary values are
/// single bytes, so 256 entries at most)
const MAX_SYMBOL_BITS: u8 = 8;

/// The two planar frame encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanarVariant {
	/// One symbol per pixel
	Plan,

	/// Run-length symbol stream
	Plnr,
}

impl PlanarVariant {
	/// Recognizes a 4-byte frame signature.
	pub fn from_signature(signature: &[u8]) -> Option<Self> {
		match signature {
			b"PLAN" => Some(Self::Plan),
			b"PLNR" => Some(Self::Plnr),
			_ => None,
		}
	}
}

/// Run-length symbol source used by `PLNR` frames.
///
/// Two fields of state: the last code produced and how many more times it
/// is due. Kept as an explicit struct so the control flow stays visible.
#[derive(Debug, Default)]
struct RunLengthSymbols {
	last_value: u16,
	remaining: u32,
}

impl RunLengthSymbols {
	fn next(&mut self, reader: &mut BitReader<'_>, bps: u32) -> Result<u16, ImgError> {
		if self.remaining == 0 {
			let code = reader.chomp(bps)?;
			if code != 0 {
				self.last_value = code;
				self.remaining = 1;
			} else {
				let count = reader.chomp(bps)?;
				if count == 0 {
					self.last_value = 0;
					self.remaining = 1;
				} else {
					// Repeat the previous code, whatever it was
					self.remaining = u32::from(count) + 2;
				}
			}
		}
		self.remaining -= 1;
		Ok(self.last_value)
	}
}

/// Decodes a planar frame stored at `offset`.
pub(crate) fn parse(data: &[u8], offset: usize, variant: PlanarVariant) -> Result<Frame, ImgError> {
	let width = read_u16_le(data, offset)?;
	let height = read_u16_le(data, offset + 2)?;

	let bps = read_u8(data, offset + BPS_OFFSET)?;
	if bps == 0 {
		return Ok(Frame::from_runs(width, height, Vec::new()));
	}
	if bps > MAX_SYMBOL_BITS {
		return Err(ImgError::UnsupportedSymbolWidth(bps));
	}

	let dict_size = 1usize << bps;
	let dict_start = offset + DICT_OFFSET;
	let dict = data.get(dict_start..dict_start + dict_size).ok_or(ImgError::InsufficientData {
		expected: dict_start + dict_size,
		actual: data.len(),
	})?;

	let mut reader = BitReader::new(&data[dict_start + dict_size..], BitOrder::BigEndian);
	let mut symbols = RunLengthSymbols::default();
	let bps = u32::from(bps);

	let mut runs = Vec::new();
	for row in 0..height {
		let mut run_start = 0u16;
		let mut run_pixels: Vec<u8> = Vec::new();

		for column in 0..width {
			let symbol = match variant {
				PlanarVariant::Plan => reader.chomp(bps)?,
				PlanarVariant::Plnr => symbols.next(&mut reader, bps)?,
			};
			let value = dict[usize::from(symbol)];

			if value == 0 {
				if !run_pixels.is_empty() {
					runs.push(PixelRun::new(row, run_start, std::mem::take(&mut run_pixels)));
				}
			} else {
				if run_pixels.is_empty() {
					run_start = column;
				}
				run_pixels.push(value);
			}
		}

		if !run_pixels.is_empty() {
			runs.push(PixelRun::new(row, run_start, run_pixels));
		}
	}

	Ok(Frame::from_runs(width, height, runs))
}
