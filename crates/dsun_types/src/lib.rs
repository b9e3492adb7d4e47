//! This crate provides core data types and file format support for the `dsun-rs` project.
//!
//! # File Formats
//!
//! - **GFF**: Tagged resource archives that index every asset of the game
//!   by a 4-byte tag and a resource number
//! - **IMG**: Multi-frame image resources in three encodings (row-based
//!   run-length, `PLAN`, and `PLNR` planar)
//! - **Palette**: 3-byte-per-color palettes with 6-bit components
//! - **XMI**: Music sequences in a MIDI dialect, rewritten byte-in-place
//!
//! # Examples
//!
//! ```no_run
//! use dsun_types::file::{GffFile, ImgFile, Tag};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let gff = GffFile::open("ARCHIVE.GFF")?;
//! let bytes = gff.get_resource(Tag::new(*b"BMP "), 1)?;
//! let img = ImgFile::from_bytes(&bytes)?;
//! println!("{img}");
//! # Ok(())
//! # }
//! ```

pub mod file;
pub mod prelude;

// Re-export commonly used file types at crate root for convenience
pub use file::{
	BitOrder, BitReader, BitstreamError, Color, ControllerKind, Frame, GffError, GffFile, ImgError,
	ImgFile, Palette, ResourceDesc, Tag, XmiError, XmiFile,
};
