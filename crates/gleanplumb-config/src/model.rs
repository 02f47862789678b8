// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Gleanplumb.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use gleanplumb_core::MessagingFeatureConfig;

/// Top-level Gleanplumb configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PlumbConfig {
    /// Host application settings.
    #[serde(default)]
    pub app: AppConfig,

    /// Metadata persistence settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Message definitions and targeting settings.
    #[serde(default)]
    pub messaging: MessagingConfig,
}

/// Host application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// URI scheme that message actions are rewritten into.
    #[serde(default = "default_deep_link_scheme")]
    pub deep_link_scheme: String,

    /// Version string exposed to trigger expressions as `app_version`.
    #[serde(default = "default_app_version")]
    pub app_version: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            deep_link_scheme: default_deep_link_scheme(),
            app_version: default_app_version(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_deep_link_scheme() -> String {
    "fenix".to_string()
}

fn default_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Metadata persistence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the JSON file holding per-message metadata.
    #[serde(default = "default_metadata_path")]
    pub metadata_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            metadata_path: default_metadata_path(),
        }
    }
}

fn default_metadata_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("gleanplumb").join("nimbus_messages_metadata.json"))
        .unwrap_or_else(|| std::path::PathBuf::from("nimbus_messages_metadata.json"))
        .to_string_lossy()
        .into_owned()
}

/// Messaging configuration.
///
/// `feature` holds the message definitions inline. When `feature_file` is
/// set, the JSON document it names replaces the inline definitions.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MessagingConfig {
    /// Whether the notification poller runs.
    #[serde(default = "default_notifications_enabled")]
    pub notifications_enabled: bool,

    /// Path to a JSON file containing the messaging feature value.
    #[serde(default)]
    pub feature_file: Option<String>,

    /// Extra attributes made available to trigger expressions.
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,

    /// Inline messaging feature value.
    #[serde(default)]
    pub feature: MessagingFeatureConfig,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            notifications_enabled: default_notifications_enabled(),
            feature_file: None,
            attributes: BTreeMap::new(),
            feature: MessagingFeatureConfig::default(),
        }
    }
}

fn default_notifications_enabled() -> bool {
    true
}
