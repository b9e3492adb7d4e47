//! Error types for file format parsing and manipulation.

use thiserror::Error;

use super::gff::Tag;

/// Errors that can occur when extracting bit codes from a byte buffer
#[derive(Debug, Error)]
pub enum BitstreamError {
	/// Requested chunk width outside the supported range
	#[error("Invalid bit count: {0} (supported range is 1-16)")]
	InvalidBitCount(u32),

	/// Ran past the end of the buffer
	#[error("Bit stream exhausted: requested {requested} bits, {available} available")]
	UnexpectedEnd {
		/// Number of bits requested
		requested: u32,
		/// Number of unread bits left in the buffer
		available: u64,
	},
}

/// Errors that can occur when parsing or manipulating GFF archives
#[derive(Debug, Error)]
pub enum GffError {
	/// Not enough data to parse
	#[error("Insufficient data: expected at least {expected} bytes, got {actual} bytes")]
	InsufficientData {
		/// Expected number of bytes
		expected: usize,
		/// Actual number of bytes
		actual: usize,
	},

	/// A tag appeared more than once in the archive index
	#[error("Duplicate tag in archive index: {0}")]
	DuplicateTag(Tag),

	/// A table entry points outside the archive buffer
	#[error("Entry out of bounds: {tag} #{number} at offset {offset} with size {size} exceeds archive length {len}")]
	EntryOutOfBounds {
		/// Tag of the offending table
		tag: Tag,
		/// Resource number of the offending entry
		number: u32,
		/// Entry offset
		offset: usize,
		/// Entry size
		size: u32,
		/// Length of the archive buffer
		len: usize,
	},

	/// A secondary table was declared but the archive has no `GFFI` table
	#[error("Missing GFFI table: secondary tag {0} cannot be resolved")]
	MissingIndexTable(Tag),

	/// A secondary table index points past the `GFFI` entry list
	#[error("Secondary table index {index} for tag {tag} out of range (GFFI has {count} entries)")]
	SecondaryIndexOutOfRange {
		/// Tag of the secondary table
		tag: Tag,
		/// Index into the `GFFI` table
		index: u32,
		/// Number of entries in the `GFFI` table
		count: usize,
	},

	/// The numbering segments do not cover every entry of a secondary table
	#[error("Numbering mismatch for tag {tag}: {entries} entries but segments number only {numbered}")]
	NumberingMismatch {
		/// Tag of the secondary table
		tag: Tag,
		/// Number of entries in the table
		entries: usize,
		/// Number of resource numbers the segments provide
		numbered: usize,
	},

	/// Resource lookup failed
	#[error("No such resource: {tag} #{number}")]
	NoSuchResource {
		/// Tag that was looked up
		tag: Tag,
		/// Resource number that was looked up
		number: u32,
	},

	/// IO error
	#[error(transparent)]
	IOError(#[from] std::io::Error),
}

/// Errors that can occur when decoding image resources
#[derive(Debug, Error)]
pub enum ImgError {
	/// Not enough data to parse
	#[error("Insufficient data: expected at least {expected} bytes, got {actual} bytes")]
	InsufficientData {
		/// Expected number of bytes
		expected: usize,
		/// Actual number of bytes
		actual: usize,
	},

	/// Run-length input ended before producing the expected output
	#[error("Truncated run-length data: produced {produced} of {expected} bytes")]
	TruncatedRun {
		/// Bytes produced before the input ran out
		produced: usize,
		/// Bytes the caller expected
		expected: usize,
	},

	/// A run would write past the expected output length
	#[error("Run overflow: {produced} bytes produced, next run of {run} exceeds {expected}")]
	RunOverflow {
		/// Bytes produced so far
		produced: usize,
		/// Length of the offending run
		run: usize,
		/// Bytes the caller expected
		expected: usize,
	},

	/// A row record names a row past the frame height
	#[error("Row {row} out of range (frame height is {height})")]
	RowOutOfRange {
		/// Row number from the record
		row: u8,
		/// Frame height
		height: u16,
	},

	/// A pixel run extends past the right edge of the frame
	#[error("Run out of bounds: row {row}, start column {start_x}, length {len} exceeds frame width {width}")]
	RunOutOfBounds {
		/// Row of the offending run
		row: u16,
		/// Starting column of the run
		start_x: u16,
		/// Length of the run in pixels
		len: u16,
		/// Frame width
		width: u16,
	},

	/// A planar frame declares a symbol width its dictionary cannot support
	#[error("Unsupported symbol width: {0} bits per symbol")]
	UnsupportedSymbolWidth(u8),

	/// Bit stream error while decoding a planar frame
	#[error(transparent)]
	Bitstream(#[from] BitstreamError),

	/// IO error
	#[error(transparent)]
	IOError(#[from] std::io::Error),
}

/// Errors that can occur when parsing or rewriting XMI music files
#[derive(Debug, Error)]
pub enum XmiError {
	/// Not enough data to parse
	#[error("Insufficient data: expected at least {expected} bytes, got {actual} bytes")]
	InsufficientData {
		/// Expected number of bytes
		expected: usize,
		/// Actual number of bytes
		actual: usize,
	},

	/// A chunk tag did not match the expected envelope layout
	#[error("Unexpected tag at offset {offset}: expected {expected:02X?}, got {actual:02X?}")]
	UnexpectedTag {
		/// Offset of the tag in the file
		offset: usize,
		/// Tag bytes that were expected
		expected: [u8; 4],
		/// Tag bytes that were found
		actual: [u8; 4],
	},

	/// A required chunk is absent
	#[error("Missing chunk: {0:02X?}")]
	MissingChunk([u8; 4]),

	/// An event ran past the end of the EVNT body
	#[error("Truncated event at offset {offset}")]
	TruncatedEvent {
		/// Offset of the event's status byte in the EVNT body
		offset: usize,
	},

	/// The event scan met a system message it cannot size
	#[error("Unhandled system message: status 0x{0:02X}")]
	UnhandledStatus(u8),

	/// IO error
	#[error(transparent)]
	IOError(#[from] std::io::Error),
}
