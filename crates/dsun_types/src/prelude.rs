//! Prelude module for `dsun_types`.
//!
//! This module provides a convenient way to import commonly used types, traits, and constants.
//!
//! # Examples
//!
//! ```no_run
//! use dsun_types::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let gff = GffFile::open("ARCHIVE.GFF")?;
//! let palette = Palette::from_bytes(&gff.get_resource(Tag::new(*b"PAL "), 1)?);
//! # Ok(())
//! # }
//! ```

// File module types
#[doc(inline)]
pub use crate::file::{
	// Bit reader
	BitOrder,
	BitReader,
	BitstreamError,

	// Image types
	Color,

	// XMI types
	ControllerKind,
	EventIndex,
	EvntChunk,
	Frame,

	// GFF types
	GffEntry,
	GffError,
	GffFile,
	GffTable,
	ImgError,
	ImgFile,
	Palette,
	PixelRun,
	RbrnChunk,
	ResourceDesc,
	TableKind,

	Tag,
	XmiError,
	XmiFile,
};

// Re-export the file module for advanced usage
#[doc(inline)]
pub use crate::file;
