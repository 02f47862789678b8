// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messaging telemetry sinks for Gleanplumb.
//!
//! Events are counted through the metrics-rs facade. [`MetricsTelemetry`]
//! feeds whatever recorder the host installed; [`PrometheusTelemetry`]
//! installs the Prometheus recorder itself and can render the text format.

pub mod recording;

use async_trait::async_trait;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::info;

use gleanplumb_core::{
    AdapterType, HealthStatus, PlumbError, PluginAdapter, TelemetryEvent, TelemetrySink,
};

pub use recording::{metric_name, record_event, register_metrics};

fn log_event(event: &TelemetryEvent) {
    match event {
        TelemetryEvent::MessageClicked {
            message_key,
            action_uuid,
        } => info!(
            event = event.name(),
            message_key = %message_key,
            action_uuid = action_uuid.as_deref().unwrap_or("-"),
            "messaging telemetry"
        ),
        TelemetryEvent::ExperimentExposure { feature_id } => {
            info!(event = event.name(), feature_id = %feature_id, "messaging telemetry")
        }
        other => info!(
            event = other.name(),
            message_key = other.message_key().unwrap_or_default(),
            "messaging telemetry"
        ),
    }
}

/// Telemetry sink that logs each event and counts it on the global recorder.
#[derive(Debug, Default, Clone)]
pub struct MetricsTelemetry;

impl MetricsTelemetry {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PluginAdapter for MetricsTelemetry {
    fn name(&self) -> &str {
        "metrics"
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

impl TelemetrySink for MetricsTelemetry {
    fn record(&self, event: TelemetryEvent) {
        log_event(&event);
        record_event(&event);
    }
}

/// Prometheus telemetry sink.
///
/// Installs the Prometheus recorder globally and exposes a handle for
/// rendering metrics in Prometheus text format.
pub struct PrometheusTelemetry {
    handle: PrometheusHandle,
}

impl PrometheusTelemetry {
    /// Install the Prometheus recorder.
    ///
    /// Only one recorder can be installed per process. Returns an error if a
    /// recorder is already installed.
    pub fn new() -> Result<Self, PlumbError> {
        let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
            PlumbError::Internal(format!("failed to install Prometheus recorder: {e}"))
        })?;

        register_metrics();

        tracing::info!("prometheus metrics recorder installed");

        Ok(Self { handle })
    }

    pub fn handle(&self) -> &PrometheusHandle {
        &self.handle
    }

    /// Render all collected metrics in Prometheus text format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

#[async_trait]
impl PluginAdapter for PrometheusTelemetry {
    fn name(&self) -> &str {
        "prometheus"
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

impl TelemetrySink for PrometheusTelemetry {
    fn record(&self, event: TelemetryEvent) {
        log_event(&event);
        record_event(&event);
    }
}
