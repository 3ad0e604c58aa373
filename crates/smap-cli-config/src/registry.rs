// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration registry - manages sources and merges layers.

use tracing::debug;

use crate::layer::ConfigLayer;
use crate::runtime::SmapConfig;
use crate::sources::ConfigSource;
use crate::validation::validate_config;
use crate::ConfigError;

/// Registry that manages configuration sources and merges them.
pub struct ConfigRegistry {
	sources: Vec<Box<dyn ConfigSource>>,
}

impl ConfigRegistry {
	/// Create a new empty registry.
	pub fn new() -> Self {
		Self {
			sources: Vec::new(),
		}
	}

	/// Register a configuration source.
	pub fn register(&mut self, source: Box<dyn ConfigSource>) {
		debug!(source = source.name(), precedence = ?source.precedence(), "registering config source");
		self.sources.push(source);
	}

	/// Load configuration from all sources, merge, and validate.
	///
	/// Sources are sorted by precedence (lowest first) and merged
	/// so higher precedence sources override lower ones. A source that
	/// fails to load aborts the whole load.
	pub fn load(&self) -> Result<SmapConfig, ConfigError> {
		let mut sorted_sources: Vec<_> = self.sources.iter().collect();
		sorted_sources.sort_by_key(|s| s.precedence());

		debug!(
			source_count = sorted_sources.len(),
			"loading configuration from sources"
		);

		let mut merged = ConfigLayer::default();
		for source in &sorted_sources {
			let layer = source.load()?;
			debug!(source = source.name(), "merging config layer");
			merged.merge(layer);
		}

		let config = SmapConfig::from_layer(merged);

		validate_config(&config)?;

		debug!(
			log_level = ?config.logging.level,
			strict_columns = config.parse.strict_columns,
			"configuration loaded successfully"
		);

		Ok(config)
	}
}

impl Default for ConfigRegistry {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::layer::ReportLayer;
	use crate::sources::{DefaultsSource, Precedence};

	struct MockSource {
		name: &'static str,
		precedence: Precedence,
		top: usize,
	}

	impl ConfigSource for MockSource {
		fn name(&self) -> &'static str {
			self.name
		}
		fn precedence(&self) -> Precedence {
			self.precedence
		}

		fn load(&self) -> Result<ConfigLayer, ConfigError> {
			Ok(ConfigLayer {
				report: Some(ReportLayer {
					top: Some(self.top),
					unmapped_label: None,
				}),
				..Default::default()
			})
		}
	}

	#[test]
	fn test_empty_registry_yields_defaults() {
		let config = ConfigRegistry::new().load().unwrap();
		assert_eq!(config.report.unmapped_label, "<unmapped>");
		assert!(!config.parse.strict_columns);
	}

	#[test]
	fn test_registry_loads_with_defaults() {
		let mut registry = ConfigRegistry::new();
		registry.register(Box::new(DefaultsSource));

		let config = registry.load().unwrap();
		assert_eq!(config.report.top, None);
		assert!(!config.parse.strict_columns);
	}

	/// Sources are merged in precedence order regardless of registration order.
	#[test]
	fn test_precedence_merge_order() {
		let mut registry = ConfigRegistry::new();

		registry.register(Box::new(MockSource {
			name: "cli",
			precedence: Precedence::Cli,
			top: 2,
		}));
		registry.register(Box::new(MockSource {
			name: "user",
			precedence: Precedence::UserFile,
			top: 20,
		}));

		let config = registry.load().unwrap();
		assert_eq!(config.report.top, Some(2));
	}

	#[test]
	fn test_invalid_merged_config_is_rejected() {
		let mut registry = ConfigRegistry::new();
		registry.register(Box::new(MockSource {
			name: "cli",
			precedence: Precedence::Cli,
			top: 0,
		}));

		assert!(matches!(
			registry.load(),
			Err(ConfigError::InvalidValue { .. })
		));
	}
}
