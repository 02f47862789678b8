// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telemetry sink that captures events for assertions.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use gleanplumb_core::traits::adapter::PluginAdapter;
use gleanplumb_core::traits::telemetry::TelemetrySink;
use gleanplumb_core::types::{AdapterType, HealthStatus, TelemetryEvent};
use gleanplumb_core::PlumbError;

/// Captures every recorded [`TelemetryEvent`] in order.
#[derive(Clone, Default)]
pub struct RecordingTelemetry {
    events: Arc<Mutex<Vec<TelemetryEvent>>>,
}

impl RecordingTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Events with the given [`TelemetryEvent::name`].
    pub fn named(&self, name: &str) -> Vec<TelemetryEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.name() == name)
            .collect()
    }

    pub fn count(&self, name: &str) -> usize {
        self.named(name).len()
    }
}

#[async_trait]
impl PluginAdapter for RecordingTelemetry {
    fn name(&self) -> &str {
        "recording-telemetry"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Telemetry
    }

    async fn health_check(&self) -> Result<HealthStatus, PlumbError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PlumbError> {
        Ok(())
    }
}

impl TelemetrySink for RecordingTelemetry {
    fn record(&self, event: TelemetryEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
