// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Subcommand implementations. Output goes to the writer passed in.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use smap_cli_config::runtime::ReportConfig;
use smap_decode::{decode_segment, ParseOptions, SourceMapDocument};
use tracing::{debug, info};

use crate::report::SizeReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	Text,
	Json,
}

#[derive(Debug, Serialize)]
struct ReportRow<'a> {
	source: &'a str,
	bytes: i64,
}

pub fn load_document(path: &Path) -> Result<SourceMapDocument> {
	let file =
		File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
	let doc = SourceMapDocument::from_reader(BufReader::new(file))
		.with_context(|| format!("failed to read source map {}", path.display()))?;

	info!(
		path = %path.display(),
		sources = doc.sources.len(),
		names = doc.names.len(),
		"loaded source map"
	);
	Ok(doc)
}

/// Print every decoded entry; returns how many were printed.
pub fn dump(
	doc: &SourceMapDocument,
	options: ParseOptions,
	format: OutputFormat,
	out: &mut impl Write,
) -> Result<usize> {
	let mut count = 0;
	for entry in doc.mappings_with(options) {
		let entry = entry.context("failed to decode mappings")?;
		match format {
			OutputFormat::Text => writeln!(out, "{entry}")?,
			OutputFormat::Json => {
				serde_json::to_writer(&mut *out, &entry)?;
				writeln!(out)?;
			}
		}
		count += 1;
	}
	debug!(entries = count, "dumped mappings");
	Ok(count)
}

pub fn report(
	doc: &SourceMapDocument,
	options: ParseOptions,
	config: &ReportConfig,
	format: OutputFormat,
	out: &mut impl Write,
) -> Result<()> {
	let totals = SizeReport::from_entries(doc.mappings_with(options))
		.context("failed to decode mappings")?
		.into_sorted();

	let limit = config.top.unwrap_or(usize::MAX);
	let rows: Vec<ReportRow> = totals
		.iter()
		.take(limit)
		.map(|size| ReportRow {
			source: size.source.unwrap_or(&config.unmapped_label),
			bytes: size.bytes,
		})
		.collect();

	match format {
		OutputFormat::Text => {
			for row in &rows {
				writeln!(out, "{} {}", row.bytes, row.source)?;
			}
		}
		OutputFormat::Json => {
			serde_json::to_writer_pretty(&mut *out, &rows)?;
			writeln!(out)?;
		}
	}

	debug!(sources = totals.len(), printed = rows.len(), "wrote size report");
	Ok(())
}

pub fn vlq(segment: &str, out: &mut impl Write) -> Result<()> {
	let values =
		decode_segment(segment).with_context(|| format!("failed to decode VLQ {segment:?}"))?;
	let line: Vec<String> = values.iter().map(i64::to_string).collect();
	writeln!(out, "{}", line.join(" "))?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample() -> SourceMapDocument {
		r#"{
			"version": 3,
			"sources": ["a.js", "b.js"],
			"names": ["run"],
			"mappings": "AAAAA,UCAA,IDAA;;AAAA,GAAA,K"
		}"#
		.parse()
		.unwrap()
	}

	fn render(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
		let mut out = Vec::new();
		f(&mut out).unwrap();
		String::from_utf8(out).unwrap()
	}

	#[test]
	fn test_dump_text() {
		let doc = sample();
		let text = render(|out| {
			dump(&doc, ParseOptions::default(), OutputFormat::Text, out).map(|_| ())
		});

		assert_eq!(
			text,
			"out[1:0] = a.js[1:0] run\n\
			 out[1:10] = b.js[1:0]\n\
			 out[1:14] = a.js[1:0]\n\
			 out[3:0] = a.js[1:0]\n\
			 out[3:3] = a.js[1:0]\n\
			 out[3:8]\n"
		);
	}

	#[test]
	fn test_dump_json_lines() {
		let doc = sample();
		let text = render(|out| {
			dump(&doc, ParseOptions::default(), OutputFormat::Json, out).map(|_| ())
		});

		let lines: Vec<serde_json::Value> = text
			.lines()
			.map(|l| serde_json::from_str(l).unwrap())
			.collect();
		assert_eq!(lines.len(), 6);
		assert_eq!(lines[0]["name"], "run");
		assert_eq!(lines[1]["src"], "b.js");
		assert!(lines[5].get("src").is_none());
	}

	#[test]
	fn test_report_text() {
		let doc = sample();
		let text = render(|out| {
			report(
				&doc,
				ParseOptions::default(),
				&ReportConfig::default(),
				OutputFormat::Text,
				out,
			)
		});

		assert_eq!(text, "12 a.js\n10 b.js\n");
	}

	#[test]
	fn test_report_top_and_unmapped_label() {
		let doc: SourceMapDocument =
			r#"{"sources": ["a.js"], "names": [], "mappings": "A,K,AAAA,C"}"#
				.parse()
				.unwrap();
		let config = ReportConfig {
			top: Some(1),
			unmapped_label: "(none)".to_string(),
		};
		let text = render(|out| {
			report(
				&doc,
				ParseOptions::default(),
				&config,
				OutputFormat::Text,
				out,
			)
		});

		assert_eq!(text, "5 (none)\n");
	}

	#[test]
	fn test_report_json() {
		let doc = sample();
		let text = render(|out| {
			report(
				&doc,
				ParseOptions::default(),
				&ReportConfig::default(),
				OutputFormat::Json,
				out,
			)
		});

		let rows: serde_json::Value = serde_json::from_str(&text).unwrap();
		assert_eq!(rows[0]["source"], "a.js");
		assert_eq!(rows[0]["bytes"], 12);
		assert_eq!(rows[1]["source"], "b.js");
	}

	#[test]
	fn test_strict_dump_fails() {
		let doc: SourceMapDocument = r#"{"sources": [], "names": [], "mappings": "K,D"}"#
			.parse()
			.unwrap();
		let options = ParseOptions {
			strict_columns: true,
		};

		let mut out = Vec::new();
		assert!(dump(&doc, options, OutputFormat::Text, &mut out).is_err());
		assert_eq!(String::from_utf8(out).unwrap(), "out[1:5]\n");
	}

	#[test]
	fn test_vlq_command() {
		let text = render(|out| vlq("DFLx+BhqjG", out));
		assert_eq!(text, "-1 -2 -5 -1000 -100000\n");
	}

	#[test]
	fn test_vlq_command_rejects_garbage() {
		let mut out = Vec::new();
		let err = vlq("A*", &mut out).unwrap_err();
		assert!(format!("{err:#}").contains("invalid base64 character"));
	}

	#[test]
	fn test_load_document_from_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(
			file,
			r#"{{"sources": ["a.js"], "names": [], "mappings": "AAAA"}}"#
		)
		.unwrap();

		let doc = load_document(file.path()).unwrap();
		assert_eq!(doc.sources, vec!["a.js"]);
	}

	#[test]
	fn test_load_document_missing_file() {
		let err = load_document(Path::new("/nonexistent/bundle.js.map")).unwrap_err();
		assert!(err.to_string().contains("failed to open"));
	}
}
