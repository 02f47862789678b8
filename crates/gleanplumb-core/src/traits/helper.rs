// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trigger-expression evaluation and action templating.

use crate::error::PlumbError;

/// Evaluates trigger expressions and formats action templates against one
/// snapshot of the targeting attributes.
pub trait MessageHelper: Send + Sync {
    /// Evaluates a boolean trigger expression.
    fn eval_jexl(&self, expression: &str) -> Result<bool, PlumbError>;

    /// Returns a fresh UUID if `template` asks for one.
    fn get_uuid(&self, template: &str) -> Option<String>;

    /// Substitutes placeholders in `template`, using `uuid` for `{uuid}`.
    fn string_format(&self, template: &str, uuid: Option<&str>) -> String;
}

/// Creates a [`MessageHelper`] bound to the current targeting attributes.
pub trait HelperFactory: Send + Sync {
    fn create_message_helper(&self) -> Result<Box<dyn MessageHelper>, PlumbError>;
}
