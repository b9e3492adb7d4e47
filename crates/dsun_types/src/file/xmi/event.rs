//! Event-stream scanning for XMI music files.
//!
//! The EVNT chunk holds a MIDI dialect: bytes with the high bit clear are
//! delays (the value is added to the running tick count), bytes with the
//! high bit set are event status bytes. The scanner sizes every event so
//! it can walk the stream without decoding it, and records the offsets of
//! the controller messages the rewriter cares about.
//!
//! Note-on events (`0x9n`) differ from plain MIDI: after note and
//! velocity comes a variable-length duration, terminated by the first
//! byte that is `<= 0x80`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::file::XmiError;

/// Controller numbers the rewriter recognizes in the event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ControllerKind {
	/// 0x73 — hands playback control to the hosting program
	IndirectControl,

	/// 0x74 — loop start; the value byte is the iteration count
	For,

	/// 0x75 — loop end
	Next,

	/// 0x77 — host callback trigger
	Callback,

	/// 0x78 — sequence-branch index
	SequenceBranchIndex,
}

impl ControllerKind {
	/// Every recognized kind, in controller-number order.
	pub const ALL: [ControllerKind; 5] = [
		ControllerKind::IndirectControl,
		ControllerKind::For,
		ControllerKind::Next,
		ControllerKind::Callback,
		ControllerKind::SequenceBranchIndex,
	];

	/// Returns the controller number of this kind.
	pub const fn number(self) -> u8 {
		match self {
			ControllerKind::IndirectControl => 0x73,
			ControllerKind::For => 0x74,
			ControllerKind::Next => 0x75,
			ControllerKind::Callback => 0x77,
			ControllerKind::SequenceBranchIndex => 0x78,
		}
	}

	/// Recognizes a controller number.
	pub const fn from_number(number: u8) -> Option<Self> {
		match number {
			0x73 => Some(ControllerKind::IndirectControl),
			0x74 => Some(ControllerKind::For),
			0x75 => Some(ControllerKind::Next),
			0x77 => Some(ControllerKind::Callback),
			0x78 => Some(ControllerKind::SequenceBranchIndex),
			_ => None,
		}
	}
}

impl fmt::Display for ControllerKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			ControllerKind::IndirectControl => "INDIRECT_CONTROL",
			ControllerKind::For => "FOR",
			ControllerKind::Next => "NEXT",
			ControllerKind::Callback => "CALLBACK",
			ControllerKind::SequenceBranchIndex => "SEQUENCE_BRANCH_INDEX",
		};
		write!(f, "{name}")
	}
}

/// Offsets of recognized controller messages, grouped by kind, plus the
/// accumulated delay of the whole stream.
///
/// All offsets are relative to the start of the EVNT body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventIndex {
	controllers: BTreeMap<ControllerKind, BTreeSet<usize>>,
	total_ticks: u64,
}

impl EventIndex {
	/// Returns the recorded offsets for a controller kind, in ascending
	/// order.
	pub fn offsets(&self, kind: ControllerKind) -> &BTreeSet<usize> {
		&self.controllers[&kind]
	}

	/// Returns the total number of recognized controller messages.
	pub fn controller_count(&self) -> usize {
		self.controllers.values().map(BTreeSet::len).sum()
	}

	/// Returns the sum of all delay bytes in the stream.
	pub fn total_ticks(&self) -> u64 {
		self.total_ticks
	}

	/// Drops a recorded offset, after the message at it has been
	/// rewritten into something unrecognizable.
	pub(crate) fn remove(&mut self, kind: ControllerKind, offset: usize) {
		if let Some(set) = self.controllers.get_mut(&kind) {
			set.remove(&offset);
		}
	}
}

/// Walks the EVNT body and indexes the recognized controllers.
pub(crate) fn scan(body: &[u8]) -> Result<EventIndex, XmiError> {
	let mut controllers: BTreeMap<ControllerKind, BTreeSet<usize>> =
		ControllerKind::ALL.iter().map(|&kind| (kind, BTreeSet::new())).collect();
	let mut total_ticks = 0u64;

	let mut i = 0;
	while i < body.len() {
		let status = body[i];

		if status & 0x80 == 0 {
			total_ticks += u64::from(status);
			i += 1;
			continue;
		}

		let event_start = i;
		match status {
			0x90..=0x9F => {
				// Note, velocity, then duration bytes until one <= 0x80
				let mut end = i + 3;
				loop {
					let byte = *body.get(end).ok_or(XmiError::TruncatedEvent {
						offset: i,
					})?;
					end += 1;
					if byte <= 0x80 {
						break;
					}
				}
				i = end;
			}
			0xB0..=0xBF => {
				if i + 3 > body.len() {
					return Err(XmiError::TruncatedEvent {
						offset: i,
					});
				}
				if let Some(kind) = ControllerKind::from_number(body[i + 1]) {
					controllers.entry(kind).or_default().insert(i);
				}
				i += 3;
			}
			0xC0..=0xDF => {
				// Program change and channel pressure: one data byte
				i += 2;
			}
			0xFF => {
				let length = *body.get(i + 2).ok_or(XmiError::TruncatedEvent {
					offset: i,
				})?;
				i += 3 + usize::from(length);
			}
			0xF0..=0xFE => return Err(XmiError::UnhandledStatus(status)),
			_ => {
				// Note-off, aftertouch, pitch bend: two data bytes
				i += 3;
			}
		}

		if i > body.len() {
			return Err(XmiError::TruncatedEvent {
				offset: event_start,
			});
		}
	}

	Ok(EventIndex {
		controllers,
		total_ticks,
	})
}
