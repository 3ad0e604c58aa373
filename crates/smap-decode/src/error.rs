// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for source map decoding.

use std::fmt;

use thiserror::Error;

/// Why a single VLQ run could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VlqError {
	#[error("invalid base64 character {ch:?} at offset {offset}")]
	InvalidChar { ch: char, offset: usize },

	#[error("unterminated VLQ group")]
	Unterminated,

	#[error("VLQ value does not fit in 64 bits")]
	Overflow,
}

/// Which lookup table an index was resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
	Source,
	Name,
}

impl fmt::Display for IndexKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			IndexKind::Source => write!(f, "source"),
			IndexKind::Name => write!(f, "name"),
		}
	}
}

/// Errors that can occur while decoding a source map.
///
/// Every variant is fatal: the running totals after a failed segment are
/// meaningless, so nothing past the first error is decoded.
#[derive(Debug, Error)]
pub enum SmapError {
	#[error("malformed VLQ segment {segment:?} on line {line}: {source}")]
	MalformedVlq {
		line: usize,
		segment: String,
		#[source]
		source: VlqError,
	},

	#[error("malformed segment {segment:?} on line {line}: decoded {fields} fields, expected 1, 4 or 5")]
	MalformedSegment {
		line: usize,
		segment: String,
		fields: usize,
	},

	#[error("{kind} index {index} out of range on line {line} (have {len})")]
	IndexOutOfRange {
		line: usize,
		kind: IndexKind,
		index: i64,
		len: usize,
	},

	#[error("{field} out of range on line {line}: {value}")]
	InvalidPosition {
		line: usize,
		field: &'static str,
		value: i64,
	},

	#[error("column {column} precedes column {previous} on line {line}")]
	NonMonotonicColumn { line: usize, previous: u32, column: u32 },

	#[error("malformed source map document: {0}")]
	MalformedDocument(#[from] serde_json::Error),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SmapError>;
