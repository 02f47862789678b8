// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Expression helper with scripted evaluation results.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use gleanplumb_core::traits::helper::{HelperFactory, MessageHelper};
use gleanplumb_core::PlumbError;

#[derive(Clone)]
enum Outcome {
    Value(bool),
    Fail,
}

#[derive(Default)]
struct Script {
    outcomes: HashMap<String, Outcome>,
    evaluated: Vec<String>,
}

/// Factory for helpers whose `eval_jexl` answers come from a script.
///
/// Expressions not in the script evaluate to the default (true unless
/// changed with [`ScriptedHelperFactory::default_result`]). Every helper
/// created by one factory shares the script and the evaluation log.
#[derive(Clone)]
pub struct ScriptedHelperFactory {
    script: Arc<Mutex<Script>>,
    default: bool,
    uuid: Option<String>,
    created: Arc<AtomicUsize>,
    fail_creation: bool,
}

impl ScriptedHelperFactory {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(Script::default())),
            default: true,
            uuid: None,
            created: Arc::new(AtomicUsize::new(0)),
            fail_creation: false,
        }
    }

    pub fn with_result(self, expression: &str, value: bool) -> Self {
        self.lock()
            .outcomes
            .insert(expression.to_string(), Outcome::Value(value));
        self
    }

    /// Make `expression` fail to evaluate.
    pub fn with_failure(self, expression: &str) -> Self {
        self.lock()
            .outcomes
            .insert(expression.to_string(), Outcome::Fail);
        self
    }

    pub fn default_result(mut self, value: bool) -> Self {
        self.default = value;
        self
    }

    /// UUID handed out for templates containing `{uuid}`.
    pub fn with_uuid(mut self, uuid: &str) -> Self {
        self.uuid = Some(uuid.to_string());
        self
    }

    /// Make `create_message_helper` fail.
    pub fn failing(mut self) -> Self {
        self.fail_creation = true;
        self
    }

    /// Expressions evaluated so far, in order, across all helpers.
    pub fn evaluated(&self) -> Vec<String> {
        self.lock().evaluated.clone()
    }

    pub fn evaluation_count(&self, expression: &str) -> usize {
        self.lock()
            .evaluated
            .iter()
            .filter(|e| *e == expression)
            .count()
    }

    pub fn helpers_created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ScriptedHelperFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl HelperFactory for ScriptedHelperFactory {
    fn create_message_helper(&self) -> Result<Box<dyn MessageHelper>, PlumbError> {
        if self.fail_creation {
            return Err(PlumbError::Internal("helper unavailable".to_string()));
        }
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedHelper {
            factory: self.clone(),
        }))
    }
}

struct ScriptedHelper {
    factory: ScriptedHelperFactory,
}

impl MessageHelper for ScriptedHelper {
    fn eval_jexl(&self, expression: &str) -> Result<bool, PlumbError> {
        let mut script = self.factory.lock();
        script.evaluated.push(expression.to_string());
        match script.outcomes.get(expression).cloned() {
            Some(Outcome::Value(value)) => Ok(value),
            Some(Outcome::Fail) => Err(PlumbError::evaluation(expression, "scripted failure")),
            None => Ok(self.factory.default),
        }
    }

    fn get_uuid(&self, template: &str) -> Option<String> {
        if template.contains("{uuid}") {
            self.factory.uuid.clone()
        } else {
            None
        }
    }

    fn string_format(&self, template: &str, uuid: Option<&str>) -> String {
        match uuid {
            Some(uuid) => template.replace("{uuid}", uuid),
            None => template.to_string(),
        }
    }
}
