#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! `dsun-rs` is a toolkit for reading and modifying the proprietary resource
//! files of a 1990s tile-based SSI role-playing game: GFF resource archives
//! with their run-length and planar image resources, 6-bit palettes, and XMI
//! music files.

pub use dsun_internal::*;
