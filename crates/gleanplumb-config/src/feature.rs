// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolution of the messaging feature value.

use std::path::Path;

use tracing::debug;

use gleanplumb_core::MessagingFeatureConfig;

use crate::diagnostic::ConfigError;
use crate::model::MessagingConfig;
use crate::validation::validate_feature;

/// Reads a messaging feature value from a JSON document.
pub fn load_feature_file(path: &Path) -> Result<MessagingFeatureConfig, ConfigError> {
    let feature_error = |detail: String| ConfigError::FeatureFile {
        path: path.display().to_string(),
        detail,
    };
    let content = std::fs::read_to_string(path).map_err(|e| feature_error(e.to_string()))?;
    let feature: MessagingFeatureConfig =
        serde_json::from_str(&content).map_err(|e| feature_error(e.to_string()))?;
    debug!(
        path = %path.display(),
        messages = feature.messages.len(),
        "messaging feature loaded from file"
    );
    Ok(feature)
}

/// Returns the feature value in effect: the feature file when configured,
/// otherwise the inline `[messaging.feature]` table.
pub fn resolve_feature(config: &MessagingConfig) -> Result<MessagingFeatureConfig, Vec<ConfigError>> {
    let Some(path) = &config.feature_file else {
        return Ok(config.feature.clone());
    };
    let feature = load_feature_file(Path::new(path)).map_err(|e| vec![e])?;
    let errors = validate_feature(&feature, "feature_file");
    if errors.is_empty() {
        Ok(feature)
    } else {
        Err(errors)
    }
}
