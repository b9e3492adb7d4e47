//! File type support for `dsun-rs` project.

mod error;

pub mod bits;
pub mod gff;
pub mod img;
pub mod xmi;

// Re-export unified error types
pub use error::{BitstreamError, GffError, ImgError, XmiError};

// Re-export main file types
pub use bits::{BitOrder, BitReader};
pub use gff::{
	Entry as GffEntry, File as GffFile, ResourceDesc, Table as GffTable, TableKind, Tag,
};
pub use img::{Color, File as ImgFile, Frame, Palette, PixelRun};
pub use xmi::{ControllerKind, EventIndex, EvntChunk, File as XmiFile, RbrnChunk};
