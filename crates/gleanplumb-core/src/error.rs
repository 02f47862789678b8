// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Gleanplumb messaging.

use thiserror::Error;

/// The primary error type used across the messaging engine and its collaborators.
#[derive(Debug, Error)]
pub enum PlumbError {
    /// Metadata persistence errors (file I/O, directory creation).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// JSON encoding or decoding failed.
    #[error("serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    /// A trigger expression could not be parsed or did not yield a boolean.
    #[error("failed to evaluate `{expression}`: {message}")]
    Evaluation { expression: String, message: String },

    /// No eligible message carries the requested id.
    #[error("message not found: {id}")]
    MessageNotFound { id: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PlumbError {
    /// Wraps an I/O error as a storage failure.
    pub fn storage(err: std::io::Error) -> Self {
        PlumbError::Storage {
            source: Box::new(err),
        }
    }

    /// Builds an evaluation error for `expression`.
    pub fn evaluation(expression: &str, message: impl Into<String>) -> Self {
        PlumbError::Evaluation {
            expression: expression.to_string(),
            message: message.into(),
        }
    }
}
