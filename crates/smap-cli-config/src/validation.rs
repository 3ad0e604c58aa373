// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration validation rules.

use crate::runtime::SmapConfig;
use crate::ConfigError;

/// Validate the configuration.
///
/// Returns Ok(()) if valid, or ConfigError::InvalidValue with details.
pub fn validate_config(config: &SmapConfig) -> Result<(), ConfigError> {
	if config.report.top == Some(0) {
		return Err(ConfigError::invalid_value(
			"report.top",
			"top must be at least 1",
		));
	}

	if config.report.unmapped_label.trim().is_empty() {
		return Err(ConfigError::invalid_value(
			"report.unmapped_label",
			"unmapped_label cannot be empty",
		));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::layer::ConfigLayer;

	fn default_config() -> SmapConfig {
		SmapConfig::from_layer(ConfigLayer::default())
	}

	#[test]
	fn test_defaults_are_valid() {
		assert!(validate_config(&default_config()).is_ok());
	}

	#[test]
	fn test_zero_top_rejected() {
		let mut config = default_config();
		config.report.top = Some(0);
		assert!(matches!(
			validate_config(&config),
			Err(ConfigError::InvalidValue { ref field, .. }) if field == "report.top"
		));
	}

	#[test]
	fn test_blank_label_rejected() {
		let mut config = default_config();
		config.report.unmapped_label = " ".to_string();
		assert!(validate_config(&config).is_err());
	}
}
