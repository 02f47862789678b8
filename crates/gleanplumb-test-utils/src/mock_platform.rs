// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Feature holder and platform hooks for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use gleanplumb_core::traits::feature::FeatureHolder;
use gleanplumb_core::traits::platform::{BootIdProvider, Notifier, UriLauncher};
use gleanplumb_core::types::{Message, MessagingFeatureConfig};
use gleanplumb_core::PlumbError;

/// A fixed feature value that counts exposures.
#[derive(Clone)]
pub struct StaticFeature {
    value: Arc<MessagingFeatureConfig>,
    exposures: Arc<AtomicUsize>,
}

impl StaticFeature {
    pub fn new(value: MessagingFeatureConfig) -> Self {
        Self {
            value: Arc::new(value),
            exposures: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn exposures(&self) -> usize {
        self.exposures.load(Ordering::SeqCst)
    }
}

impl FeatureHolder for StaticFeature {
    fn value(&self) -> Arc<MessagingFeatureConfig> {
        self.value.clone()
    }

    fn record_exposure(&self) {
        self.exposures.fetch_add(1, Ordering::SeqCst);
    }
}

/// Captures launched URIs.
#[derive(Clone, Default)]
pub struct RecordingLauncher {
    launched: Arc<Mutex<Vec<String>>>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn launched(&self) -> Vec<String> {
        self.launched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl UriLauncher for RecordingLauncher {
    async fn launch(&self, uri: &str) -> Result<(), PlumbError> {
        self.launched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(uri.to_string());
        Ok(())
    }
}

/// Captures posted notifications.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    posted: Arc<Mutex<Vec<Message>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn posted(&self) -> Vec<Message> {
        self.posted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &Message) -> Result<(), PlumbError> {
        self.posted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.clone());
        Ok(())
    }
}

/// Boot identifier that can be changed to simulate a reboot.
#[derive(Clone, Default)]
pub struct FixedBootId {
    id: Arc<Mutex<Option<String>>>,
}

impl FixedBootId {
    pub fn new(id: Option<&str>) -> Self {
        Self {
            id: Arc::new(Mutex::new(id.map(str::to_string))),
        }
    }

    pub fn reboot(&self, id: &str) {
        *self.id.lock().unwrap_or_else(PoisonError::into_inner) = Some(id.to_string());
    }
}

impl BootIdProvider for FixedBootId {
    fn boot_identifier(&self) -> Option<String> {
        self.id
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
