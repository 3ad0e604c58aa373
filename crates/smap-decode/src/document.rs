// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source map JSON document loading.

use std::io::Read;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{Result, SmapError};
use crate::mappings::{MappingParser, ParseOptions};

/// The fields of a source map document the decoder works from.
///
/// `sources`, `names` and `mappings` are required. Everything else is
/// informational and the version is not checked.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMapDocument {
	#[serde(default)]
	pub version: Option<u32>,
	/// Generated file name.
	#[serde(default)]
	pub file: Option<String>,
	#[serde(default)]
	pub source_root: Option<String>,
	/// Original source file paths.
	pub sources: Vec<String>,
	/// Original identifiers (function/variable names).
	pub names: Vec<String>,
	pub mappings: String,
}

impl SourceMapDocument {
	/// Parse a source map from JSON bytes.
	pub fn from_slice(data: &[u8]) -> Result<Self> {
		Ok(serde_json::from_slice(data)?)
	}

	/// Parse a source map from a reader, e.g. an open file.
	pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
		serde_json::from_reader(reader).map_err(|e| {
			if e.is_io() {
				SmapError::Io(e.into())
			} else {
				SmapError::MalformedDocument(e)
			}
		})
	}

	/// Decode the mappings of this document lazily.
	pub fn mappings(&self) -> MappingParser<'_> {
		self.mappings_with(ParseOptions::default())
	}

	pub fn mappings_with(&self, options: ParseOptions) -> MappingParser<'_> {
		MappingParser::with_options(&self.sources, &self.names, &self.mappings, options)
	}
}

impl FromStr for SourceMapDocument {
	type Err = SmapError;

	fn from_str(s: &str) -> Result<Self> {
		Self::from_slice(s.as_bytes())
	}
}
