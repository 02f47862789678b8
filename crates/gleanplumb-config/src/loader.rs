// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./gleanplumb.toml` > `~/.config/gleanplumb/gleanplumb.toml`
//! > `/etc/gleanplumb/gleanplumb.toml` with environment variable overrides via the
//! `GLEANPLUMB_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::PlumbConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/gleanplumb/gleanplumb.toml";

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_PATH: &str = "gleanplumb.toml";

/// Per-user configuration file under the XDG config directory.
pub fn user_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("gleanplumb/gleanplumb.toml"))
        .unwrap_or_default()
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/gleanplumb/gleanplumb.toml`
/// 3. `~/.config/gleanplumb/gleanplumb.toml`
/// 4. `./gleanplumb.toml`
/// 5. `GLEANPLUMB_*` environment variables
pub fn load_config() -> Result<PlumbConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<PlumbConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PlumbConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one explicit file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PlumbConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PlumbConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for hierarchy loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(PlumbConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path()))
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// Environment provider mapping `GLEANPLUMB_<SECTION>_<KEY>` to `<section>.<key>`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `GLEANPLUMB_APP_DEEP_LINK_SCHEME` maps to `app.deep_link_scheme`.
fn env_provider() -> Env {
    Env::prefixed("GLEANPLUMB_").map(|key| {
        let key_str = key.as_str();
        let mapped = ["app_", "storage_", "messaging_"]
            .iter()
            .find(|section| key_str.starts_with(*section))
            .map(|section| {
                format!(
                    "{}.{}",
                    section.trim_end_matches('_'),
                    &key_str[section.len()..]
                )
            })
            .unwrap_or_else(|| key_str.to_string());
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_vars_map_to_sections() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("GLEANPLUMB_APP_DEEP_LINK_SCHEME", "fenix-nightly");
            jail.set_env("GLEANPLUMB_STORAGE_METADATA_PATH", "/tmp/meta.json");
            jail.set_env("GLEANPLUMB_MESSAGING_NOTIFICATIONS_ENABLED", "false");

            let config: PlumbConfig = Figment::new()
                .merge(Serialized::defaults(PlumbConfig::default()))
                .merge(env_provider())
                .extract()?;

            assert_eq!(config.app.deep_link_scheme, "fenix-nightly");
            assert_eq!(config.storage.metadata_path, "/tmp/meta.json");
            assert!(!config.messaging.notifications_enabled);
            Ok(())
        });
    }

    #[test]
    fn explicit_path_is_read() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                "[app]\nlog_level = \"debug\"\n",
            )?;
            let config = load_config_from_path(Path::new("custom.toml"))?;
            assert_eq!(config.app.log_level, "debug");
            Ok(())
        });
    }
}
