// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Generated-size attribution per original source.
//!
//! For each pair of consecutive entries on the same generated line, the
//! column distance between them is charged to the later entry's source, or
//! to the earlier entry's source when the later one has none. This rule is
//! a heuristic and has not been checked against how browsers attribute
//! spans. Spans on lines whose columns go backwards come out negative and
//! are summed as-is.

use std::collections::HashMap;

use serde::Serialize;
use smap_decode::{MappingEntry, Result};

/// Accumulated generated bytes for one source (`None` = unattributed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceSize<'a> {
	pub source: Option<&'a str>,
	pub bytes: i64,
}

#[derive(Debug, Default)]
pub struct SizeReport<'a> {
	index: HashMap<Option<&'a str>, usize>,
	totals: Vec<SourceSize<'a>>,
	last: Option<MappingEntry<'a>>,
}

impl<'a> SizeReport<'a> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Build a report from a mapping stream, stopping at the first error.
	pub fn from_entries<I>(entries: I) -> Result<Self>
	where
		I: IntoIterator<Item = Result<MappingEntry<'a>>>,
	{
		let mut report = Self::new();
		for entry in entries {
			report.record(entry?);
		}
		Ok(report)
	}

	pub fn record(&mut self, entry: MappingEntry<'a>) {
		if let Some(last) = self.last {
			if entry.dst_line == last.dst_line {
				let source = entry.src().or(last.src());
				let span = i64::from(entry.dst_col) - i64::from(last.dst_col);
				self.charge(source, span);
			}
		}
		self.last = Some(entry);
	}

	fn charge(&mut self, source: Option<&'a str>, span: i64) {
		let slot = *self.index.entry(source).or_insert_with(|| {
			self.totals.push(SourceSize { source, bytes: 0 });
			self.totals.len() - 1
		});
		self.totals[slot].bytes += span;
	}

	/// Totals, largest first; ties keep the order sources were first charged.
	pub fn into_sorted(self) -> Vec<SourceSize<'a>> {
		let mut totals = self.totals;
		totals.sort_by(|a, b| b.bytes.cmp(&a.bytes));
		totals
	}
}
