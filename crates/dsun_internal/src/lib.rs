//! Internal crate for `dsun-rs`.
//!
//! This module is separated into its own crate to keep the public facade
//! of `dsun-rs` thin, and should not be used directly.
//!
//! # Examples
//!
//! ```no_run
//! use dsun_internal::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let gff = GffFile::open("ARCHIVE.GFF")?;
//! println!("{gff}");
//! # Ok(())
//! # }
//! ```

/// `use dsun_internal::prelude::*;` to import commonly used items.
pub mod prelude;

// Re-export dsun_types for convenience
pub use dsun_types;
