// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! XDG Base Directory compliant path resolution.

use std::path::PathBuf;

use crate::ConfigError;

/// Resolved config file locations for smap.
#[derive(Debug, Clone)]
pub struct PathsConfig {
	/// User config file: ~/.config/smap/config.toml
	pub user_config_file: PathBuf,
	/// System config file: /etc/smap/config.toml
	pub system_config_file: PathBuf,
}

/// Resolve config paths according to the Base Directory Specification.
///
/// Uses XDG_CONFIG_HOME if set, otherwise ~/.config.
pub fn resolve_xdg_paths() -> Result<PathsConfig, ConfigError> {
	let home = dirs::home_dir().ok_or(ConfigError::HomeDirNotFound)?;

	let config_home = std::env::var_os("XDG_CONFIG_HOME")
		.map(PathBuf::from)
		.unwrap_or_else(|| home.join(".config"));

	tracing::debug!(config_home = %config_home.display(), "resolved XDG paths");

	Ok(PathsConfig {
		user_config_file: config_home.join("smap/config.toml"),
		system_config_file: PathBuf::from("/etc/smap/config.toml"),
	})
}
