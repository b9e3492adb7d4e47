//! Run-length codec for row-based image frames.
//!
//! Each pixel run inside a row-based frame is compressed with a code-byte
//! scheme: an even code `c` is followed by `c/2 + 1` literal bytes, an odd
//! code `c` is followed by a single byte that is repeated `(c + 1)/2`
//! times. The caller knows the uncompressed length out-of-band (it is part
//! of the run header) and decoding stops once that many bytes exist.

use crate::file::ImgError;

/// Decodes run-length data into exactly `output_len` bytes.
///
/// # Errors
///
/// Returns [`ImgError::TruncatedRun`] when `input` runs out before
/// `output_len` bytes have been produced, and [`ImgError::RunOverflow`]
/// when a run would write past `output_len`.
pub fn decode(input: &[u8], output_len: usize) -> Result<Vec<u8>, ImgError> {
	let mut output = Vec::with_capacity(output_len);
	let mut pos = 0;

	while output.len() < output_len {
		let code = take(input, &mut pos, output.len(), output_len)?;

		if code % 2 == 0 {
			let count = usize::from(code) / 2 + 1;
			ensure_fits(output.len(), count, output_len)?;
			for _ in 0..count {
				let literal = take(input, &mut pos, output.len(), output_len)?;
				output.push(literal);
			}
		} else {
			let count = (usize::from(code) + 1) / 2;
			ensure_fits(output.len(), count, output_len)?;
			let value = take(input, &mut pos, output.len(), output_len)?;
			output.extend(std::iter::repeat_n(value, count));
		}
	}

	Ok(output)
}

fn take(input: &[u8], pos: &mut usize, produced: usize, expected: usize) -> Result<u8, ImgError> {
	let byte = *input.get(*pos).ok_or(ImgError::TruncatedRun {
		produced,
		expected,
	})?;
	*pos += 1;
	Ok(byte)
}

fn ensure_fits(produced: usize, run: usize, expected: usize) -> Result<(), ImgError> {
	if produced + run > expected {
		return Err(ImgError::RunOverflow {
			produced,
			run,
			expected,
		});
	}
	Ok(())
}
