// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as URI scheme syntax, known log levels, and non-zero intervals.

use gleanplumb_core::MessagingFeatureConfig;

use crate::diagnostic::ConfigError;
use crate::model::PlumbConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &PlumbConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.app.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "app.log_level `{}` must be one of {}",
                config.app.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if !is_valid_scheme(&config.app.deep_link_scheme) {
        errors.push(ConfigError::Validation {
            message: format!(
                "app.deep_link_scheme `{}` is not a valid URI scheme",
                config.app.deep_link_scheme
            ),
        });
    }

    if config.storage.metadata_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.metadata_path must not be empty".to_string(),
        });
    }

    if let Some(path) = &config.messaging.feature_file
        && path.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "messaging.feature_file must not be empty when set".to_string(),
        });
    }

    errors.extend(validate_feature(&config.messaging.feature, "messaging.feature"));

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks a messaging feature value, wherever it was loaded from.
///
/// Unknown action and trigger keys are reported per message at selection
/// time instead.
pub fn validate_feature(feature: &MessagingFeatureConfig, prefix: &str) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if feature.notification_config.polling_interval == 0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "{prefix}.notification-config.polling-interval must be at least 1 minute"
            ),
        });
    }

    if let Some(expr) = &feature.message_under_experiment
        && expr.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: format!("{prefix}.message-under-experiment must not be blank when set"),
        });
    }

    for (key, expression) in &feature.triggers {
        if expression.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("{prefix}.triggers.{key} must not be blank"),
            });
        }
    }

    errors
}

/// RFC 3986: `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`.
fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}
