// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telemetry sink trait for messaging events.

use crate::traits::adapter::PluginAdapter;
use crate::types::TelemetryEvent;

/// Destination for messaging telemetry.
///
/// Recording is fire-and-forget: sinks swallow their own failures so that
/// telemetry never changes which message is shown.
pub trait TelemetrySink: PluginAdapter {
    fn record(&self, event: TelemetryEvent);
}
