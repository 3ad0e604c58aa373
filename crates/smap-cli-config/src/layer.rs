// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration layer for merging from multiple sources.

use serde::Deserialize;

/// Partial configuration layer - all fields are Option for merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
	#[serde(default)]
	pub logging: Option<LoggingLayer>,
	#[serde(default)]
	pub parse: Option<ParseLayer>,
	#[serde(default)]
	pub report: Option<ReportLayer>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoggingLayer {
	#[serde(default)]
	pub level: Option<String>,
	#[serde(default)]
	pub format: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ParseLayer {
	#[serde(default)]
	pub strict_columns: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReportLayer {
	#[serde(default)]
	pub top: Option<usize>,
	#[serde(default)]
	pub unmapped_label: Option<String>,
}

impl ConfigLayer {
	/// Merge `other` on top of `self`; set fields in `other` win.
	pub fn merge(&mut self, other: ConfigLayer) {
		merge_option(&mut self.logging, other.logging, LoggingLayer::merge);
		merge_option(&mut self.parse, other.parse, ParseLayer::merge);
		merge_option(&mut self.report, other.report, ReportLayer::merge);
	}
}

fn merge_option<T, F>(target: &mut Option<T>, source: Option<T>, merge_fn: F)
where
	F: FnOnce(&mut T, T),
{
	match (target.as_mut(), source) {
		(Some(t), Some(s)) => merge_fn(t, s),
		(None, Some(s)) => *target = Some(s),
		_ => {}
	}
}

impl LoggingLayer {
	fn merge(&mut self, other: LoggingLayer) {
		if other.level.is_some() {
			self.level = other.level;
		}
		if other.format.is_some() {
			self.format = other.format;
		}
	}
}

impl ParseLayer {
	fn merge(&mut self, other: ParseLayer) {
		if other.strict_columns.is_some() {
			self.strict_columns = other.strict_columns;
		}
	}
}

impl ReportLayer {
	fn merge(&mut self, other: ReportLayer) {
		if other.top.is_some() {
			self.top = other.top;
		}
		if other.unmapped_label.is_some() {
			self.unmapped_label = other.unmapped_label;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_merge_precedence_overwrites_existing_values() {
		let mut base = ConfigLayer {
			logging: Some(LoggingLayer {
				level: Some("debug".to_string()),
				format: Some("json".to_string()),
			}),
			..Default::default()
		};

		let overlay = ConfigLayer {
			logging: Some(LoggingLayer {
				level: Some("warn".to_string()),
				format: None,
			}),
			..Default::default()
		};

		base.merge(overlay);

		let logging = base.logging.unwrap();
		assert_eq!(logging.level, Some("warn".to_string()));
		assert_eq!(logging.format, Some("json".to_string()));
	}

	#[test]
	fn test_merge_fills_missing_sections() {
		let mut base = ConfigLayer::default();
		let overlay = ConfigLayer {
			report: Some(ReportLayer {
				top: Some(10),
				unmapped_label: None,
			}),
			..Default::default()
		};

		base.merge(overlay.clone());
		assert_eq!(base, overlay);
	}

	#[test]
	fn test_parse_toml_layer() {
		let layer: ConfigLayer = toml::from_str(
			r#"
			[logging]
			level = "debug"

			[parse]
			strict_columns = true

			[report]
			top = 5
			unmapped_label = "(none)"
			"#,
		)
		.unwrap();

		assert_eq!(layer.logging.unwrap().level, Some("debug".to_string()));
		assert_eq!(layer.parse.unwrap().strict_columns, Some(true));
		let report = layer.report.unwrap();
		assert_eq!(report.top, Some(5));
		assert_eq!(report.unmapped_label, Some("(none)".to_string()));
	}

	#[test]
	fn test_unknown_section_rejected() {
		let result: Result<ConfigLayer, _> = toml::from_str("[providers]\nname = \"x\"\n");
		assert!(result.is_err());
	}

	proptest! {
		/// Merging onto an empty layer yields the overlay unchanged.
		#[test]
		fn merge_onto_empty_is_identity(
			level in proptest::option::of("[a-z]{1,8}"),
			strict in proptest::option::of(any::<bool>()),
			top in proptest::option::of(1usize..100),
		) {
			let overlay = ConfigLayer {
				logging: Some(LoggingLayer { level, format: None }),
				parse: Some(ParseLayer { strict_columns: strict }),
				report: Some(ReportLayer { top, unmapped_label: None }),
			};
			let mut base = ConfigLayer::default();
			base.merge(overlay.clone());
			prop_assert_eq!(base, overlay);
		}
	}
}
