// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Streaming decoder for the `mappings` field of a source map.
//!
//! The mappings string format:
//! - Lines are separated by semicolons (;)
//! - Segments within a line are separated by commas (,)
//! - Each segment contains 1, 4, or 5 VLQ-encoded values
//!
//! Every value is a delta against a running total. The generated column
//! restarts at zero on each line; source index, original line, original
//! column and name index carry over for the whole document.

use std::fmt;
use std::iter::{Enumerate, FusedIterator};
use std::str::Split;

use serde::Serialize;
use tracing::debug;

use crate::error::{IndexKind, Result, SmapError};
use crate::vlq;

/// Knobs for [`MappingParser`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
	/// Reject segments whose generated column moves backwards within a line.
	pub strict_columns: bool,
}

/// One decoded position correspondence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct MappingEntry<'a> {
	/// Line in the generated file (0-indexed).
	pub dst_line: u32,
	/// Column in the generated file (0-indexed).
	pub dst_col: u32,
	/// Where this position came from, if the segment carried source info.
	#[serde(flatten)]
	pub original: Option<OriginalLocation<'a>>,
}

/// Original source position attached to a [`MappingEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct OriginalLocation<'a> {
	pub src: &'a str,
	/// Line in the original file (0-indexed).
	pub src_line: u32,
	/// Column in the original file (0-indexed).
	pub src_col: u32,
	pub name: Option<&'a str>,
}

impl<'a> MappingEntry<'a> {
	pub fn src(&self) -> Option<&'a str> {
		self.original.map(|o| o.src)
	}

	pub fn src_line(&self) -> Option<u32> {
		self.original.map(|o| o.src_line)
	}

	pub fn src_col(&self) -> Option<u32> {
		self.original.map(|o| o.src_col)
	}

	pub fn name(&self) -> Option<&'a str> {
		self.original.and_then(|o| o.name)
	}
}

/// Renders as `out[line:col] = src[line:col] name` with 1-indexed lines.
impl fmt::Display for MappingEntry<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "out[{}:{}]", u64::from(self.dst_line) + 1, self.dst_col)?;
		if let Some(original) = &self.original {
			write!(
				f,
				" = {}[{}:{}]",
				original.src,
				u64::from(original.src_line) + 1,
				original.src_col
			)?;
			if let Some(name) = original.name {
				write!(f, " {name}")?;
			}
		}
		Ok(())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SourceDelta {
	src_id: i64,
	src_line: i64,
	src_col: i64,
}

/// A decoded segment, classified by how many fields it carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment {
	GeneratedOnly {
		dst_col: i64,
	},
	WithSource {
		dst_col: i64,
		source: SourceDelta,
	},
	WithSourceAndName {
		dst_col: i64,
		source: SourceDelta,
		name_id: i64,
	},
}

impl TryFrom<&[i64]> for Segment {
	/// The offending field count.
	type Error = usize;

	fn try_from(fields: &[i64]) -> std::result::Result<Self, usize> {
		match *fields {
			[dst_col] => Ok(Segment::GeneratedOnly { dst_col }),
			[dst_col, src_id, src_line, src_col] => Ok(Segment::WithSource {
				dst_col,
				source: SourceDelta {
					src_id,
					src_line,
					src_col,
				},
			}),
			[dst_col, src_id, src_line, src_col, name_id] => Ok(Segment::WithSourceAndName {
				dst_col,
				source: SourceDelta {
					src_id,
					src_line,
					src_col,
				},
				name_id,
			}),
			_ => Err(fields.len()),
		}
	}
}

/// Running totals the deltas are applied to.
#[derive(Debug, Default)]
struct RunningState {
	dst_col: i64,
	src_id: i64,
	src_line: i64,
	src_col: i64,
	name_id: i64,
}

/// Single-pass iterator over the entries of a mappings string.
///
/// Owns all decoder state, so independent parsers never interfere. After
/// the first error it yields nothing further; restart by building a new
/// parser over the same input.
#[derive(Debug)]
pub struct MappingParser<'a> {
	sources: &'a [String],
	names: &'a [String],
	options: ParseOptions,
	lines: Enumerate<Split<'a, char>>,
	current: Option<(usize, Split<'a, char>)>,
	state: RunningState,
	last_col: Option<u32>,
	lines_seen: usize,
	emitted: usize,
	done: bool,
}

/// Decode `mappings` lazily against the given `sources` and `names`.
pub fn parse_mappings<'a>(
	sources: &'a [String],
	names: &'a [String],
	mappings: &'a str,
) -> MappingParser<'a> {
	MappingParser::with_options(sources, names, mappings, ParseOptions::default())
}

/// Decode every entry up front, stopping at the first error.
pub fn decode_mappings<'a>(
	sources: &'a [String],
	names: &'a [String],
	mappings: &'a str,
) -> Result<Vec<MappingEntry<'a>>> {
	parse_mappings(sources, names, mappings).collect()
}

impl<'a> MappingParser<'a> {
	pub fn with_options(
		sources: &'a [String],
		names: &'a [String],
		mappings: &'a str,
		options: ParseOptions,
	) -> Self {
		Self {
			sources,
			names,
			options,
			lines: mappings.split(';').enumerate(),
			current: None,
			state: RunningState::default(),
			last_col: None,
			lines_seen: 0,
			emitted: 0,
			done: false,
		}
	}

	fn decode_segment(&mut self, line: usize, segment: &str) -> Result<MappingEntry<'a>> {
		let fields = vlq::decode_segment(segment).map_err(|source| SmapError::MalformedVlq {
			line,
			segment: segment.to_string(),
			source,
		})?;

		let parsed = Segment::try_from(fields.as_slice()).map_err(|fields| {
			SmapError::MalformedSegment {
				line,
				segment: segment.to_string(),
				fields,
			}
		})?;

		let dst_line = u32::try_from(line).map_err(|_| SmapError::InvalidPosition {
			line,
			field: "dst_line",
			value: i64::try_from(line).unwrap_or(i64::MAX),
		})?;

		let (dst_col, original) = match parsed {
			Segment::GeneratedOnly { dst_col } => (self.advance_column(line, dst_col)?, None),
			Segment::WithSource { dst_col, source } => {
				let dst_col = self.advance_column(line, dst_col)?;
				(dst_col, Some(self.advance_source(line, source, None)?))
			}
			Segment::WithSourceAndName {
				dst_col,
				source,
				name_id,
			} => {
				let dst_col = self.advance_column(line, dst_col)?;
				(dst_col, Some(self.advance_source(line, source, Some(name_id))?))
			}
		};

		Ok(MappingEntry {
			dst_line,
			dst_col,
			original,
		})
	}

	fn start_next_line(&mut self) {
		match self.lines.next() {
			Some((line, text)) => {
				self.state.dst_col = 0;
				self.last_col = None;
				self.lines_seen = line + 1;
				self.current = Some((line, text.split(',')));
			}
			None => {
				self.done = true;
				debug!(
					lines = self.lines_seen,
					entries = self.emitted,
					"decoded source map mappings"
				);
			}
		}
	}

	fn advance_column(&mut self, line: usize, delta: i64) -> Result<u32> {
		let column = accumulate(&mut self.state.dst_col, delta, line, "dst_col")?;
		let column = to_position(line, "dst_col", column)?;

		if self.options.strict_columns {
			if let Some(previous) = self.last_col {
				if column < previous {
					return Err(SmapError::NonMonotonicColumn {
						line,
						previous,
						column,
					});
				}
			}
		}
		self.last_col = Some(column);

		Ok(column)
	}

	fn advance_source(
		&mut self,
		line: usize,
		delta: SourceDelta,
		name_delta: Option<i64>,
	) -> Result<OriginalLocation<'a>> {
		let state = &mut self.state;

		let src_id = accumulate(&mut state.src_id, delta.src_id, line, "src_id")?;
		let src = resolve(self.sources, IndexKind::Source, src_id, line)?;
		let src_line = accumulate(&mut state.src_line, delta.src_line, line, "src_line")?;
		let src_col = accumulate(&mut state.src_col, delta.src_col, line, "src_col")?;

		let name = match name_delta {
			Some(delta) => {
				let name_id = accumulate(&mut state.name_id, delta, line, "name_id")?;
				Some(resolve(self.names, IndexKind::Name, name_id, line)?)
			}
			None => None,
		};

		Ok(OriginalLocation {
			src,
			src_line: to_position(line, "src_line", src_line)?,
			src_col: to_position(line, "src_col", src_col)?,
			name,
		})
	}
}

impl<'a> Iterator for MappingParser<'a> {
	type Item = Result<MappingEntry<'a>>;

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			if self.done {
				return None;
			}

			let (line, segment) = match self.current.as_mut() {
				Some((line, segments)) => (*line, segments.next()),
				None => {
					self.start_next_line();
					continue;
				}
			};

			let Some(segment) = segment else {
				self.current = None;
				continue;
			};

			if segment.is_empty() {
				continue;
			}

			return match self.decode_segment(line, segment) {
				Ok(entry) => {
					self.emitted += 1;
					Some(Ok(entry))
				}
				Err(e) => {
					self.done = true;
					debug!(error = %e, entries = self.emitted, "aborted decoding source map mappings");
					Some(Err(e))
				}
			};
		}
	}
}

impl FusedIterator for MappingParser<'_> {}

fn accumulate(total: &mut i64, delta: i64, line: usize, field: &'static str) -> Result<i64> {
	let next = total
		.checked_add(delta)
		.ok_or_else(|| SmapError::InvalidPosition {
			line,
			field,
			value: total.saturating_add(delta),
		})?;
	*total = next;
	Ok(next)
}

fn to_position(line: usize, field: &'static str, value: i64) -> Result<u32> {
	u32::try_from(value).map_err(|_| SmapError::InvalidPosition { line, field, value })
}

fn resolve<'t>(table: &'t [String], kind: IndexKind, index: i64, line: usize) -> Result<&'t str> {
	usize::try_from(index)
		.ok()
		.and_then(|i| table.get(i))
		.map(String::as_str)
		.ok_or(SmapError::IndexOutOfRange {
			line,
			kind,
			index,
			len: table.len(),
		})
}
