//! GFF archive support for `dsun-rs` project.
//!
//! GFF files are tagged resource archives: a header points at an index
//! area, the index maps 4-byte tags to tables, and every table entry names
//! one resource by `(tag, number)` with its byte offset and size. The
//! reserved tag [`Tag::GFFI`] carries a primary table whose entries locate
//! the archive's secondary tables.
//!
//! # File Structure
//!
//! ```text
//! Offset       Size  Field        Description
//! -----------  ----  -----------  ------------------------------------
//! 0x0C         4     index_start  Absolute offset of the index area
//! index_start  8     (skipped)    Two 32-bit fields
//! +0x08        2     tag_count    Number of tag records
//! +0x0A        ...   records      Variable-size tag records
//! ```
//!
//! Each record starts with a 4-byte tag followed by a 32-bit count. A
//! non-zero count introduces a primary table in place (the count field is
//! the table's first field). A zero count marks a secondary tag: one
//! skipped word, the index of the table's locator entry inside `GFFI`,
//! and the numbering segments that assign resource numbers to the table's
//! entries.
//!
//! # Usage Examples
//!
//! ```no_run
//! use dsun_types::file::gff::{File, Tag};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut gff = File::open("ARCHIVE.GFF")?;
//!
//! for desc in gff.describe_resources() {
//!     println!("{desc}");
//! }
//!
//! let song = gff.get_resource(Tag::new(*b"SEQ "), 100)?;
//! gff.replace_resource(Tag::new(*b"SEQ "), 100, &song)?;
//! gff.save("ARCHIVE.GFF")?;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;

use serde::Serialize;

use crate::file::GffError;

pub mod table;

pub use table::{Entry, Table, TableKind, Tag};

use table::{read_u16_le, read_u32_le};

/// GFF archive constants.
pub mod constants {
	/// Absolute offset of the index-start field in the header
	pub const INDEX_START_FIELD: usize = 12;

	/// Bytes skipped at the start of the index area
	pub const INDEX_SKIP: usize = 8;
}

/// Describes one resource of an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResourceDesc {
	/// Tag the resource belongs to
	pub tag: Tag,

	/// Resource number within the tag's namespace
	pub number: u32,

	/// Absolute byte offset of the resource
	pub offset: u32,

	/// Size of the resource in bytes
	pub size: u32,
}

impl fmt::Display for ResourceDesc {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} #{}: {} bytes at 0x{:08X}",
			self.tag, self.number, self.size, self.offset
		)
	}
}

/// A secondary tag record waiting for `GFFI` resolution.
struct DeferredSecondary {
	tag: Tag,
	table_index: u32,
	numbering_pos: usize,
}

/// GFF archive structure, owning the backing buffer and the parsed index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
	/// Complete archive bytes; grows when a replacement does not fit
	data: Vec<u8>,

	/// Parsed tables, keyed by tag
	tables: BTreeMap<Tag, Table>,
}

impl File {
	/// Loads a GFF archive from a byte slice.
	///
	/// # Errors
	///
	/// Returns an error if the header or index is truncated, a tag appears
	/// twice, an entry points outside the buffer, or a secondary table
	/// cannot be resolved through `GFFI`.
	pub fn from_bytes(data: &[u8]) -> Result<Self, GffError> {
		Self::from_vec(data.to_vec())
	}

	/// Loads a GFF archive, taking ownership of the buffer.
	pub fn from_vec(data: Vec<u8>) -> Result<Self, GffError> {
		let index_start = read_u32_le(&data, constants::INDEX_START_FIELD)? as usize;

		let mut pos = index_start + constants::INDEX_SKIP;
		let tag_count = read_u16_le(&data, pos)?;
		pos += 2;

		let mut tables: BTreeMap<Tag, Table> = BTreeMap::new();
		let mut deferred: Vec<DeferredSecondary> = Vec::new();

		for _ in 0..tag_count {
			let tag_bytes = data.get(pos..pos + 4).ok_or(GffError::InsufficientData {
				expected: pos + 4,
				actual: data.len(),
			})?;
			let tag = Tag::new([tag_bytes[0], tag_bytes[1], tag_bytes[2], tag_bytes[3]]);
			pos += 4;

			if tables.contains_key(&tag) || deferred.iter().any(|d| d.tag == tag) {
				return Err(GffError::DuplicateTag(tag));
			}

			let count = read_u32_le(&data, pos)?;
			if count > 0 {
				// Primary table in place, count field first
				let table = Table::parse_primary(&data, tag, pos)?;
				pos += 4 + count as usize * TableKind::Primary.entry_size();
				tables.insert(tag, table);
			} else {
				pos += 4;
				let _ = read_u32_le(&data, pos)?;
				pos += 4;
				let table_index = read_u32_le(&data, pos)?;
				pos += 4;
				let numbering_pos = pos;
				let segment_count = read_u32_le(&data, pos)?;
				pos += 4 + segment_count as usize * 8;

				deferred.push(DeferredSecondary {
					tag,
					table_index,
					numbering_pos,
				});
			}
		}

		// Secondary tables live behind GFFI locator entries
		for record in deferred {
			let gffi = tables.get(&Tag::GFFI).ok_or(GffError::MissingIndexTable(record.tag))?;
			let locator = gffi.entries().get(record.table_index as usize).ok_or(
				GffError::SecondaryIndexOutOfRange {
					tag: record.tag,
					index: record.table_index,
					count: gffi.len(),
				},
			)?;

			let table = Table::parse_secondary(
				&data,
				record.tag,
				locator.offset() as usize,
				record.numbering_pos,
			)?;
			tables.insert(record.tag, table);
		}

		Ok(Self {
			data,
			tables,
		})
	}

	/// Loads a GFF archive from any reader.
	pub fn from_reader<R: Read>(reader: &mut R) -> Result<Self, GffError> {
		let mut data = Vec::new();
		reader.read_to_end(&mut data)?;
		Self::from_vec(data)
	}

	/// Opens and parses a GFF archive from the specified path.
	pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, GffError> {
		let data = std::fs::read(path)?;
		Self::from_vec(data)
	}

	/// Returns the archive's tags in sorted order.
	pub fn tags(&self) -> impl Iterator<Item = &Tag> {
		self.tables.keys()
	}

	/// Returns the table for a tag, if present.
	pub fn table(&self, tag: Tag) -> Option<&Table> {
		self.tables.get(&tag)
	}

	/// Returns the total number of resources across all tables.
	pub fn resource_count(&self) -> usize {
		self.tables.values().map(Table::len).sum()
	}

	/// Describes every resource in the archive, sorted by offset.
	pub fn describe_resources(&self) -> Vec<ResourceDesc> {
		let mut descs: Vec<ResourceDesc> = self
			.tables
			.iter()
			.flat_map(|(&tag, table)| {
				table.entries().iter().map(move |entry| ResourceDesc {
					tag,
					number: entry.number(),
					offset: entry.offset(),
					size: entry.size(),
				})
			})
			.collect();
		descs.sort_by_key(|desc| desc.offset);
		descs
	}

	/// Returns true when the archive holds the resource `(tag, number)`.
	pub fn has_resource(&self, tag: Tag, number: u32) -> bool {
		self.tables.get(&tag).is_some_and(|table| table.entry_for(number).is_some())
	}

	/// Copies a resource's bytes out of the archive.
	///
	/// # Errors
	///
	/// Returns [`GffError::NoSuchResource`] when `(tag, number)` is absent.
	pub fn get_resource(&self, tag: Tag, number: u32) -> Result<Vec<u8>, GffError> {
		let entry = self.entry(tag, number)?;
		let start = entry.offset() as usize;
		Ok(self.data[start..start + entry.size() as usize].to_vec())
	}

	/// Replaces a resource's bytes, rewriting the index entry in place.
	///
	/// A replacement no longer than the current resource overwrites it at
	/// its existing offset and shrinks the recorded size. A longer
	/// replacement is appended at the end of the buffer and the entry is
	/// repointed, so the archive never shrinks and every other entry keeps
	/// its exact offset and size.
	///
	/// # Errors
	///
	/// Returns [`GffError::NoSuchResource`] when `(tag, number)` is absent.
	pub fn replace_resource(&mut self, tag: Tag, number: u32, bytes: &[u8]) -> Result<(), GffError> {
		let table = self.tables.get_mut(&tag).ok_or(GffError::NoSuchResource {
			tag,
			number,
		})?;
		let kind = table.kind();
		let entry = table.entry_for_mut(number).ok_or(GffError::NoSuchResource {
			tag,
			number,
		})?;

		if bytes.len() <= entry.size() as usize {
			let start = entry.offset() as usize;
			self.data[start..start + bytes.len()].copy_from_slice(bytes);
			entry.set_size(&mut self.data, kind, bytes.len() as u32);
		} else {
			let new_offset = self.data.len();
			self.data.extend_from_slice(bytes);
			entry.set_offset(&mut self.data, kind, new_offset as u32);
			entry.set_size(&mut self.data, kind, bytes.len() as u32);
		}

		Ok(())
	}

	/// Returns the archive bytes, including any replacements.
	pub fn as_bytes(&self) -> &[u8] {
		&self.data
	}

	/// Serializes the archive to bytes.
	pub fn to_bytes(&self) -> Vec<u8> {
		self.data.clone()
	}

	/// Saves the archive to disk.
	pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), GffError> {
		std::fs::write(path, &self.data)?;
		Ok(())
	}

	fn entry(&self, tag: Tag, number: u32) -> Result<&Entry, GffError> {
		self.tables
			.get(&tag)
			.and_then(|table| table.entry_for(number))
			.ok_or(GffError::NoSuchResource {
				tag,
				number,
			})
	}
}

impl fmt::Display for File {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"GFF Archive: {} tags, {} resources, {} bytes",
			self.tables.len(),
			self.resource_count(),
			self.data.len()
		)
	}
}

impl TryFrom<&[u8]> for File {
	type Error = GffError;

	fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
		Self::from_bytes(value)
	}
}

impl TryFrom<Vec<u8>> for File {
	type Error = GffError;

	fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
		Self::from_vec(value)
	}
}

impl From<File> for Vec<u8> {
	fn from(file: File) -> Self {
		file.data
	}
}
