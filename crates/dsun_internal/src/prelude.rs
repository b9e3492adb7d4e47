//! Prelude module for `dsun_internal`.
//!
//! This module provides a convenient way to import commonly used types and traits.
//!
//! # Examples
//!
//! ```no_run
//! use dsun_internal::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let xmi = XmiFile::open("TUNE.XMI")?;
//! let loops = xmi.infinite_loops();
//! # Ok(())
//! # }
//! ```

// Re-export everything from dsun_types::prelude
#[doc(inline)]
pub use dsun_types::prelude::*;

// Re-export the entire dsun_types module for advanced usage
#[doc(inline)]
pub use dsun_types;
