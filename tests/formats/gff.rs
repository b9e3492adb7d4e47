//! GFF archive integration tests.

use std::collections::BTreeMap;

use log::info;

use dsun_rs::prelude::*;

/// Builds archive fixtures in memory.
///
/// Resources are laid out after the 16-byte header, then the secondary
/// table blobs, then the index. Secondary resource numbers are packed
/// into numbering segments of consecutive runs, the way the game's own
/// archives store them.
#[derive(Default)]
struct ArchiveBuilder {
	primary: Vec<(Tag, Vec<(u32, Vec<u8>)>)>,
	secondary: Vec<(Tag, Vec<(u32, Vec<u8>)>)>,
}

impl ArchiveBuilder {
	fn primary_tag(mut self, tag: Tag, resources: &[(u32, &[u8])]) -> Self {
		self.primary
			.push((tag, resources.iter().map(|&(n, bytes)| (n, bytes.to_vec())).collect()));
		self
	}

	fn secondary_tag(mut self, tag: Tag, resources: &[(u32, &[u8])]) -> Self {
		self.secondary
			.push((tag, resources.iter().map(|&(n, bytes)| (n, bytes.to_vec())).collect()));
		self
	}

	fn build(self) -> Vec<u8> {
		let mut data = vec![0u8; 16];

		// Resource payloads
		let mut primary_offsets: Vec<Vec<u32>> = Vec::new();
		for (_, resources) in &self.primary {
			let mut offsets = Vec::new();
			for (_, bytes) in resources {
				offsets.push(data.len() as u32);
				data.extend_from_slice(bytes);
			}
			primary_offsets.push(offsets);
		}
		let mut secondary_offsets: Vec<Vec<u32>> = Vec::new();
		for (_, resources) in &self.secondary {
			let mut offsets = Vec::new();
			for (_, bytes) in resources {
				offsets.push(data.len() as u32);
				data.extend_from_slice(bytes);
			}
			secondary_offsets.push(offsets);
		}

		// Secondary table blobs, located by GFFI entries
		let mut blob_locations: Vec<(u32, u32)> = Vec::new();
		for ((_, resources), offsets) in self.secondary.iter().zip(&secondary_offsets) {
			let blob_start = data.len() as u32;
			data.extend_from_slice(&(resources.len() as u32).to_le_bytes());
			for ((_, bytes), &offset) in resources.iter().zip(offsets) {
				data.extend_from_slice(&offset.to_le_bytes());
				data.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
			}
			blob_locations.push((blob_start, data.len() as u32 - blob_start));
		}

		// Index area
		let index_start = data.len() as u32;
		data[12..16].copy_from_slice(&index_start.to_le_bytes());
		data.extend_from_slice(&[0u8; 8]);

		let tag_count =
			self.primary.len() + self.secondary.len() + usize::from(!self.secondary.is_empty());
		data.extend_from_slice(&(tag_count as u16).to_le_bytes());

		if !self.secondary.is_empty() {
			data.extend_from_slice(Tag::GFFI.as_bytes());
			data.extend_from_slice(&(blob_locations.len() as u32).to_le_bytes());
			for (i, &(offset, size)) in blob_locations.iter().enumerate() {
				data.extend_from_slice(&(i as u32).to_le_bytes());
				data.extend_from_slice(&offset.to_le_bytes());
				data.extend_from_slice(&size.to_le_bytes());
			}
		}

		for ((tag, resources), offsets) in self.primary.iter().zip(&primary_offsets) {
			data.extend_from_slice(tag.as_bytes());
			data.extend_from_slice(&(resources.len() as u32).to_le_bytes());
			for ((number, bytes), &offset) in resources.iter().zip(offsets) {
				data.extend_from_slice(&number.to_le_bytes());
				data.extend_from_slice(&offset.to_le_bytes());
				data.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
			}
		}

		for (i, (tag, resources)) in self.secondary.iter().enumerate() {
			data.extend_from_slice(tag.as_bytes());
			data.extend_from_slice(&0u32.to_le_bytes());
			data.extend_from_slice(&0u32.to_le_bytes());
			data.extend_from_slice(&(i as u32).to_le_bytes());

			let segments = consecutive_segments(resources.iter().map(|&(n, _)| n));
			data.extend_from_slice(&(segments.len() as u32).to_le_bytes());
			for (first, len) in segments {
				data.extend_from_slice(&first.to_le_bytes());
				data.extend_from_slice(&len.to_le_bytes());
			}
		}

		data
	}
}

/// Packs resource numbers into `(first, length)` runs of consecutive
/// values.
fn consecutive_segments(numbers: impl Iterator<Item = u32>) -> Vec<(u32, u32)> {
	let mut segments: Vec<(u32, u32)> = Vec::new();
	for number in numbers {
		match segments.last_mut() {
			Some((first, len)) if *first + *len == number => *len += 1,
			_ => segments.push((number, 1)),
		}
	}
	segments
}

const DATA: Tag = Tag::new(*b"DATA");
const WALL: Tag = Tag::new(*b"WALL");

fn three_resource_archive() -> Vec<u8> {
	ArchiveBuilder::default()
		.primary_tag(DATA, &[(1, b"hello"), (2, b"world"), (3, b"!")])
		.build()
}

#[test]
fn replace_longer_appends_and_preserves_others() {
	crate::init_logs();

	let original = three_resource_archive();
	let mut gff = GffFile::from_bytes(&original).unwrap();
	let original_len = original.len();

	gff.replace_resource(DATA, 2, b"WORLD!!").unwrap();
	info!("after replacement: {gff}");

	// The replacement landed at the end of the original buffer
	let descs = gff.describe_resources();
	let replaced = descs.iter().find(|d| d.number == 2).unwrap();
	assert_eq!(replaced.offset as usize, original_len);
	assert_eq!(replaced.size, 7);
	assert_eq!(descs.last().unwrap().number, 2);

	// Neighbors read back unchanged
	assert_eq!(gff.get_resource(DATA, 1).unwrap(), b"hello");
	assert_eq!(gff.get_resource(DATA, 3).unwrap(), b"!");
	assert_eq!(gff.get_resource(DATA, 2).unwrap(), b"WORLD!!");

	// The file never shrinks, and the mutated buffer reparses cleanly
	assert_eq!(gff.as_bytes().len(), original_len + 7);
	let reparsed = GffFile::from_bytes(gff.as_bytes()).unwrap();
	assert_eq!(reparsed.get_resource(DATA, 2).unwrap(), b"WORLD!!");
}

#[test]
fn replace_in_place_is_byte_precise() {
	let original = three_resource_archive();
	let mut gff = GffFile::from_bytes(&original).unwrap();

	gff.replace_resource(DATA, 2, b"WURLD").unwrap();

	let mutated = gff.as_bytes();
	assert_eq!(mutated.len(), original.len());

	// Only the five payload bytes of resource 2 changed
	let offset = GffFile::from_bytes(&original)
		.unwrap()
		.describe_resources()
		.iter()
		.find(|d| d.number == 2)
		.unwrap()
		.offset as usize;
	for (i, (&was, &now)) in original.iter().zip(mutated).enumerate() {
		if (offset..offset + 5).contains(&i) {
			continue;
		}
		assert_eq!(was, now, "byte {i} changed unexpectedly");
	}
}

#[test]
fn secondary_tables_resolve_through_gffi() {
	crate::init_logs();

	let data = ArchiveBuilder::default()
		.primary_tag(DATA, &[(7, b"payload")])
		.secondary_tag(WALL, &[(10, b"AA"), (11, b"BBB"), (40, b"CCCC")])
		.build();

	let gff = GffFile::from_bytes(&data).unwrap();
	info!("secondary archive: {gff}");

	// Numbers 10 and 11 share a segment, 40 starts a new one
	assert_eq!(gff.get_resource(WALL, 10).unwrap(), b"AA");
	assert_eq!(gff.get_resource(WALL, 11).unwrap(), b"BBB");
	assert_eq!(gff.get_resource(WALL, 40).unwrap(), b"CCCC");
	assert!(!gff.has_resource(WALL, 12));
	assert!(!gff.has_resource(WALL, 39));

	// GFFI's own locator entries are resources too
	assert!(gff.has_resource(Tag::GFFI, 0));
}

#[test]
fn secondary_replacement_survives_reparse() -> anyhow::Result<()> {
	let data = ArchiveBuilder::default()
		.secondary_tag(WALL, &[(10, b"AA"), (11, b"BBB")])
		.build();
	let mut gff = GffFile::from_bytes(&data)?;

	gff.replace_resource(WALL, 11, b"a longer wall record")?;

	let reparsed = GffFile::from_bytes(gff.as_bytes())?;
	assert_eq!(reparsed.get_resource(WALL, 10)?, b"AA");
	assert_eq!(reparsed.get_resource(WALL, 11)?, b"a longer wall record");
	Ok(())
}

#[test]
fn describe_resources_sorted_and_serializable() {
	let data = ArchiveBuilder::default()
		.primary_tag(DATA, &[(1, b"hello"), (2, b"world")])
		.build();
	let gff = GffFile::from_bytes(&data).unwrap();

	let descs = gff.describe_resources();
	assert!(descs.windows(2).all(|w| w[0].offset <= w[1].offset));

	let json = serde_json::to_value(&descs).unwrap();
	assert_eq!(json[0]["tag"], "DATA");
	assert_eq!(json[0]["number"], 1);
	assert_eq!(json[0]["size"], 5);
}

#[test]
fn missing_resources_are_catchable() {
	let gff = GffFile::from_bytes(&three_resource_archive()).unwrap();

	// Callers skip missing resources and continue; only this error kind
	// is recoverable.
	let mut found = BTreeMap::new();
	for number in 1..=5u32 {
		match gff.get_resource(DATA, number) {
			Ok(bytes) => {
				found.insert(number, bytes);
			}
			Err(GffError::NoSuchResource {
				number: missing,
				..
			}) => assert!(missing > 3),
			Err(other) => panic!("unexpected error: {other}"),
		}
	}
	assert_eq!(found.len(), 3);
}
