// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: files, environment, CLI, defaults.

use std::ffi::OsString;
use std::path::PathBuf;

use tracing::{debug, trace, warn};

use crate::layer::*;
use crate::paths::PathsConfig;
use crate::ConfigError;

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	SystemFile = 20,
	UserFile = 30,
	CustomFile = 40,
	Environment = 50,
	Cli = 60,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	/// Name for logging
	fn name(&self) -> &'static str;

	/// Precedence level
	fn precedence(&self) -> Precedence;

	/// Load configuration layer from this source
	fn load(&self) -> Result<ConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}
	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		debug!("loading defaults");
		// Return empty layer - defaults applied during finalization
		Ok(ConfigLayer::default())
	}
}

/// File-based configuration source (TOML).
pub struct FileSource {
	path: PathBuf,
	precedence: Precedence,
	name: &'static str,
	required: bool,
}

impl FileSource {
	/// System config: /etc/smap/config.toml
	pub fn system(paths: &PathsConfig) -> Self {
		Self {
			path: paths.system_config_file.clone(),
			precedence: Precedence::SystemFile,
			name: "system-config",
			required: false,
		}
	}

	/// User config: ~/.config/smap/config.toml
	pub fn user(paths: &PathsConfig) -> Self {
		Self {
			path: paths.user_config_file.clone(),
			precedence: Precedence::UserFile,
			name: "user-config",
			required: false,
		}
	}

	/// File named with `--config`; it must exist.
	pub fn custom(path: PathBuf) -> Self {
		Self {
			path,
			precedence: Precedence::CustomFile,
			name: "custom-config",
			required: true,
		}
	}
}

impl ConfigSource for FileSource {
	fn name(&self) -> &'static str {
		self.name
	}
	fn precedence(&self) -> Precedence {
		self.precedence
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		if !self.path.exists() {
			if self.required {
				return Err(ConfigError::FileNotFound(self.path.clone()));
			}
			debug!(path = %self.path.display(), source = self.name, "config file not found, skipping");
			return Ok(ConfigLayer::default());
		}

		debug!(path = %self.path.display(), source = self.name, "loading config file");

		let content = std::fs::read_to_string(&self.path)?;
		let layer: ConfigLayer = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
			path: self.path.clone(),
			source: e,
		})?;

		trace!(source = self.name, "parsed config layer");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Recognized: SMAP_LOG_LEVEL, SMAP_LOG_FORMAT, SMAP_STRICT_COLUMNS,
/// SMAP_REPORT_TOP.
pub struct EnvSource;

impl EnvSource {
	/// Build a layer from `(key, value)` pairs; non-`SMAP_` keys are ignored,
	/// as are keys that are not valid UTF-8.
	pub fn layer_from_vars<I>(vars: I) -> ConfigLayer
	where
		I: IntoIterator<Item = (OsString, OsString)>,
	{
		let mut layer = ConfigLayer::default();

		for (key, value) in vars {
			let Some(key) = key.to_str() else {
				continue;
			};
			if !key.starts_with("SMAP_") {
				continue;
			}

			let Some(value) = value.to_str() else {
				warn!(key = %key, "ignoring non-UTF-8 env var");
				continue;
			};
			let value = value.trim().to_string();
			if value.is_empty() {
				continue;
			}

			trace!(key = %key, "processing env var");

			match key {
				"SMAP_LOG_LEVEL" => {
					layer
						.logging
						.get_or_insert_with(LoggingLayer::default)
						.level = Some(value);
				}
				"SMAP_LOG_FORMAT" => {
					layer
						.logging
						.get_or_insert_with(LoggingLayer::default)
						.format = Some(value);
				}
				"SMAP_STRICT_COLUMNS" => match parse_bool(&value) {
					Some(v) => {
						layer
							.parse
							.get_or_insert_with(ParseLayer::default)
							.strict_columns = Some(v);
					}
					None => warn!(key = %key, value = %value, "ignoring non-boolean env var"),
				},
				"SMAP_REPORT_TOP" => match value.parse() {
					Ok(v) => {
						layer.report.get_or_insert_with(ReportLayer::default).top = Some(v);
					}
					Err(_) => warn!(key = %key, value = %value, "ignoring non-numeric env var"),
				},
				_ => {
					// Unknown SMAP_ variable, ignore
				}
			}
		}

		layer
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}
	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(Self::layer_from_vars(std::env::vars_os()))
	}
}

fn parse_bool(value: &str) -> Option<bool> {
	match value.to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Some(true),
		"0" | "false" | "no" | "off" => Some(false),
		_ => None,
	}
}

/// CLI override source.
pub struct CliSource {
	overrides: CliOverrides,
}

/// CLI argument overrides.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
	pub log_level: Option<String>,
	pub log_format: Option<String>,
	pub strict_columns: Option<bool>,
	pub report_top: Option<usize>,
	pub config_file: Option<PathBuf>,
}

impl CliSource {
	pub fn new(overrides: CliOverrides) -> Self {
		Self { overrides }
	}
}

impl ConfigSource for CliSource {
	fn name(&self) -> &'static str {
		"cli"
	}
	fn precedence(&self) -> Precedence {
		Precedence::Cli
	}

	fn load(&self) -> Result<ConfigLayer, ConfigError> {
		debug!("loading CLI overrides");
		let mut layer = ConfigLayer::default();

		if let Some(ref level) = self.overrides.log_level {
			layer
				.logging
				.get_or_insert_with(LoggingLayer::default)
				.level = Some(level.clone());
		}

		if let Some(ref format) = self.overrides.log_format {
			layer
				.logging
				.get_or_insert_with(LoggingLayer::default)
				.format = Some(format.clone());
		}

		if let Some(strict) = self.overrides.strict_columns {
			layer
				.parse
				.get_or_insert_with(ParseLayer::default)
				.strict_columns = Some(strict);
		}

		if let Some(top) = self.overrides.report_top {
			layer.report.get_or_insert_with(ReportLayer::default).top = Some(top);
		}

		Ok(layer)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	fn vars(pairs: &[(&str, &str)]) -> Vec<(OsString, OsString)> {
		pairs
			.iter()
			.map(|(k, v)| (OsString::from(*k), OsString::from(*v)))
			.collect()
	}

	#[cfg(unix)]
	fn non_utf8(bytes: &[u8]) -> OsString {
		use std::os::unix::ffi::OsStringExt;
		OsString::from_vec(bytes.to_vec())
	}

	#[test]
	fn test_precedence_ordering() {
		assert!(Precedence::Cli > Precedence::Environment);
		assert!(Precedence::Environment > Precedence::CustomFile);
		assert!(Precedence::CustomFile > Precedence::UserFile);
		assert!(Precedence::UserFile > Precedence::SystemFile);
		assert!(Precedence::SystemFile > Precedence::Defaults);
	}

	#[test]
	fn test_defaults_source_returns_empty_layer() {
		let layer = DefaultsSource.load().unwrap();
		assert_eq!(layer, ConfigLayer::default());
	}

	#[test]
	fn test_file_source_missing_file_returns_empty() {
		let source = FileSource {
			path: PathBuf::from("/nonexistent/config.toml"),
			precedence: Precedence::UserFile,
			name: "test",
			required: false,
		};
		let layer = source.load().unwrap();
		assert!(layer.logging.is_none());
	}

	#[test]
	fn test_custom_file_must_exist() {
		let source = FileSource::custom(PathBuf::from("/nonexistent/smap.toml"));
		assert!(matches!(source.load(), Err(ConfigError::FileNotFound(_))));
	}

	#[test]
	fn test_file_source_reads_toml() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[report]\ntop = 3").unwrap();

		let layer = FileSource::custom(file.path().to_path_buf()).load().unwrap();
		assert_eq!(layer.report.unwrap().top, Some(3));
	}

	#[test]
	fn test_system_source_uses_resolved_path() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[parse]\nstrict_columns = true").unwrap();
		let paths = PathsConfig {
			user_config_file: PathBuf::from("/nonexistent/user.toml"),
			system_config_file: file.path().to_path_buf(),
		};

		let system = FileSource::system(&paths);
		assert_eq!(system.precedence(), Precedence::SystemFile);
		assert_eq!(system.load().unwrap().parse.unwrap().strict_columns, Some(true));
		assert_eq!(FileSource::user(&paths).load().unwrap(), ConfigLayer::default());
	}

	#[test]
	fn test_file_source_reports_bad_toml() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[report\ntop = ").unwrap();

		let result = FileSource::custom(file.path().to_path_buf()).load();
		assert!(matches!(result, Err(ConfigError::TomlParse { .. })));
	}

	#[test]
	fn test_env_vars_map_to_layer() {
		let layer = EnvSource::layer_from_vars(vars(&[
			("SMAP_LOG_LEVEL", "debug"),
			("SMAP_STRICT_COLUMNS", "yes"),
			("SMAP_REPORT_TOP", "7"),
			("HOME", "/root"),
		]));

		assert_eq!(layer.logging.unwrap().level, Some("debug".to_string()));
		assert_eq!(layer.parse.unwrap().strict_columns, Some(true));
		assert_eq!(layer.report.unwrap().top, Some(7));
	}

	#[test]
	fn test_env_ignores_unparseable_and_empty_values() {
		let layer = EnvSource::layer_from_vars(vars(&[
			("SMAP_STRICT_COLUMNS", "maybe"),
			("SMAP_REPORT_TOP", "lots"),
			("SMAP_LOG_FORMAT", "  "),
		]));
		assert_eq!(layer, ConfigLayer::default());
	}

	#[cfg(unix)]
	#[test]
	fn test_env_skips_non_utf8_pairs() {
		let layer = EnvSource::layer_from_vars(vec![
			(OsString::from("OTHER_BAD"), non_utf8(b"\xff\xfe")),
			(non_utf8(b"SMAP_\xff"), OsString::from("1")),
			(OsString::from("SMAP_LOG_LEVEL"), non_utf8(b"de\xffbug")),
			(OsString::from("SMAP_REPORT_TOP"), OsString::from("4")),
		]);

		assert!(layer.logging.is_none());
		assert_eq!(layer.report.unwrap().top, Some(4));
	}

	#[test]
	fn test_env_source_loads_process_environment() {
		assert!(EnvSource.load().is_ok());
	}

	#[test]
	fn test_cli_overrides_map_to_layer() {
		let layer = CliSource::new(CliOverrides {
			log_format: Some("json".to_string()),
			strict_columns: Some(true),
			..Default::default()
		})
		.load()
		.unwrap();

		assert_eq!(layer.logging.unwrap().format, Some("json".to_string()));
		assert_eq!(layer.parse.unwrap().strict_columns, Some(true));
		assert!(layer.report.is_none());
	}
}
