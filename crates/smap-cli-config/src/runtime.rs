// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Runtime configuration types with resolved defaults.

use crate::layer::*;

/// Label used for spans with no attributable source.
pub const DEFAULT_UNMAPPED_LABEL: &str = "<unmapped>";

/// The final, validated configuration for smap.
#[derive(Debug, Clone)]
pub struct SmapConfig {
	pub logging: LoggingConfig,
	pub parse: ParseConfig,
	pub report: ReportConfig,
}

#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
	pub level: LogLevel,
	pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
	Error,
	#[default]
	Warn,
	Info,
	Debug,
	Trace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
	#[default]
	Pretty,
	Json,
	Compact,
}

#[derive(Debug, Clone, Default)]
pub struct ParseConfig {
	/// Reject generated columns that move backwards within a line.
	pub strict_columns: bool,
}

#[derive(Debug, Clone)]
pub struct ReportConfig {
	/// Only print the largest N sources.
	pub top: Option<usize>,
	pub unmapped_label: String,
}

impl Default for ReportConfig {
	fn default() -> Self {
		Self {
			top: None,
			unmapped_label: DEFAULT_UNMAPPED_LABEL.to_string(),
		}
	}
}

impl SmapConfig {
	/// Build runtime config from a merged layer.
	pub fn from_layer(layer: ConfigLayer) -> Self {
		Self {
			logging: build_logging_config(layer.logging),
			parse: build_parse_config(layer.parse),
			report: build_report_config(layer.report),
		}
	}
}

fn build_logging_config(layer: Option<LoggingLayer>) -> LoggingConfig {
	let layer = layer.unwrap_or_default();
	LoggingConfig {
		level: parse_log_level(layer.level.as_deref()),
		format: parse_log_format(layer.format.as_deref()),
	}
}

fn build_parse_config(layer: Option<ParseLayer>) -> ParseConfig {
	let layer = layer.unwrap_or_default();
	ParseConfig {
		strict_columns: layer.strict_columns.unwrap_or(false),
	}
}

fn build_report_config(layer: Option<ReportLayer>) -> ReportConfig {
	let layer = layer.unwrap_or_default();
	ReportConfig {
		top: layer.top,
		unmapped_label: layer
			.unmapped_label
			.unwrap_or_else(|| DEFAULT_UNMAPPED_LABEL.to_string()),
	}
}

fn parse_log_level(s: Option<&str>) -> LogLevel {
	match s {
		Some("error") => LogLevel::Error,
		Some("warn") => LogLevel::Warn,
		Some("info") => LogLevel::Info,
		Some("debug") => LogLevel::Debug,
		Some("trace") => LogLevel::Trace,
		_ => LogLevel::default(),
	}
}

fn parse_log_format(s: Option<&str>) -> LogFormat {
	match s {
		Some("json") => LogFormat::Json,
		Some("compact") => LogFormat::Compact,
		Some("pretty") => LogFormat::Pretty,
		_ => LogFormat::default(),
	}
}
