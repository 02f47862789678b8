// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade so any recorder (Prometheus, statsd, etc.)
//! can collect these metrics.

use metrics::describe_counter;

use gleanplumb_core::TelemetryEvent;

pub const MESSAGE_SHOWN: &str = "gleanplumb_messaging_message_shown_total";
pub const MESSAGE_EXPIRED: &str = "gleanplumb_messaging_message_expired_total";
pub const MESSAGE_DISMISSED: &str = "gleanplumb_messaging_message_dismissed_total";
pub const MESSAGE_CLICKED: &str = "gleanplumb_messaging_message_clicked_total";
pub const MALFORMED: &str = "gleanplumb_messaging_malformed_total";
pub const EXPOSURE: &str = "gleanplumb_messaging_exposure_total";

/// Register all messaging metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(MESSAGE_SHOWN, "Messages displayed to the user");
    describe_counter!(MESSAGE_EXPIRED, "Messages that used up their display budget");
    describe_counter!(MESSAGE_DISMISSED, "Messages dismissed by the user");
    describe_counter!(MESSAGE_CLICKED, "Messages whose action the user followed");
    describe_counter!(MALFORMED, "Messages dropped for unresolvable configuration");
    describe_counter!(EXPOSURE, "Experiment exposures recorded while selecting messages");
}

/// Counter name for `event`.
pub fn metric_name(event: &TelemetryEvent) -> &'static str {
    match event {
        TelemetryEvent::MessageShown { .. } => MESSAGE_SHOWN,
        TelemetryEvent::MessageExpired { .. } => MESSAGE_EXPIRED,
        TelemetryEvent::MessageDismissed { .. } => MESSAGE_DISMISSED,
        TelemetryEvent::MessageClicked { .. } => MESSAGE_CLICKED,
        TelemetryEvent::MalformedMessage { .. } => MALFORMED,
        TelemetryEvent::ExperimentExposure { .. } => EXPOSURE,
    }
}

/// Increment the counter for `event`, labelled by message key or feature id.
///
/// The action UUID of a click is not a label; it only goes to the log.
pub fn record_event(event: &TelemetryEvent) {
    let name = metric_name(event);
    match event {
        TelemetryEvent::ExperimentExposure { feature_id } => {
            metrics::counter!(name, "feature_id" => feature_id.clone()).increment(1);
        }
        other => {
            let key = other.message_key().unwrap_or_default().to_string();
            metrics::counter!(name, "message_key" => key).increment(1);
        }
    }
}
