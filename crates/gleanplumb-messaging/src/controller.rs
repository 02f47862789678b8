// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interaction bookkeeping for displayed, dismissed, and clicked messages.

use std::sync::Arc;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::info;

use gleanplumb_core::{Message, Metadata, PlumbError, TelemetryEvent, TelemetrySink};

use crate::storage::NimbusMessagingStorage;

/// Characters left as is when a URL is embedded as a query value.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'-')
    .remove(b'!')
    .remove(b'.')
    .remove(b'~')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*');

/// Epoch milliseconds.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Records telemetry and updates metadata as the user interacts with messages.
pub struct NimbusMessagingController {
    storage: Arc<NimbusMessagingStorage>,
    telemetry: Arc<dyn TelemetrySink>,
    deep_link_scheme: String,
    now: Clock,
}

impl NimbusMessagingController {
    pub fn new(
        storage: Arc<NimbusMessagingStorage>,
        telemetry: Arc<dyn TelemetrySink>,
        deep_link_scheme: impl Into<String>,
    ) -> Self {
        Self::with_clock(
            storage,
            telemetry,
            deep_link_scheme,
            Arc::new(|| chrono::Utc::now().timestamp_millis()),
        )
    }

    pub fn with_clock(
        storage: Arc<NimbusMessagingStorage>,
        telemetry: Arc<dyn TelemetrySink>,
        deep_link_scheme: impl Into<String>,
        now: Clock,
    ) -> Self {
        Self {
            storage,
            telemetry,
            deep_link_scheme: deep_link_scheme.into(),
            now,
        }
    }

    pub fn storage(&self) -> &Arc<NimbusMessagingStorage> {
        &self.storage
    }

    /// Returns a copy of `message` counted as displayed once more, stamped
    /// with the current time and `boot_identifier`. Nothing is persisted.
    pub fn update_message_as_displayed(
        &self,
        message: &Message,
        boot_identifier: Option<&str>,
    ) -> Message {
        message.with_metadata(Metadata {
            display_count: message.metadata.display_count + 1,
            last_time_shown: (self.now)(),
            latest_boot_identifier: boot_identifier.map(str::to_string),
            ..message.metadata.clone()
        })
    }

    /// Records that `message` was shown, and expired if it is, then persists
    /// its metadata as given.
    pub async fn on_message_displayed(&self, message: &Message) -> Result<(), PlumbError> {
        info!(message_id = %message.id, display_count = message.metadata.display_count, "message displayed");
        self.telemetry.record(TelemetryEvent::MessageShown {
            message_key: message.id.clone(),
        });
        if message.is_expired() {
            self.telemetry.record(TelemetryEvent::MessageExpired {
                message_key: message.id.clone(),
            });
        }
        self.storage.update_metadata(message.metadata.clone()).await
    }

    /// Counts one more display of `message`, persists it, records telemetry,
    /// and returns the updated message.
    pub async fn process_displayed_message(&self, message: &Message) -> Result<Message, PlumbError> {
        let updated = self.update_message_as_displayed(
            message,
            message.metadata.latest_boot_identifier.as_deref(),
        );
        self.on_message_displayed(&updated).await?;
        Ok(updated)
    }

    pub async fn on_message_dismissed(&self, metadata: &Metadata) -> Result<(), PlumbError> {
        info!(message_id = %metadata.id, "message dismissed");
        self.telemetry.record(TelemetryEvent::MessageDismissed {
            message_key: metadata.id.clone(),
        });
        self.storage
            .update_metadata(Metadata {
                dismissed: true,
                ..metadata.clone()
            })
            .await
    }

    pub async fn on_message_clicked(&self, metadata: &Metadata) -> Result<(), PlumbError> {
        info!(message_id = %metadata.id, "message clicked");
        self.storage
            .update_metadata(Metadata {
                pressed: true,
                ..metadata.clone()
            })
            .await
    }

    /// Formats the action of `message`, records the click, and returns the
    /// URI to open.
    pub fn process_message_action_to_uri(&self, message: &Message) -> Result<String, PlumbError> {
        let (uuid, action) = self.storage.generate_uuid_and_format_action(&message.action)?;
        self.telemetry.record(TelemetryEvent::MessageClicked {
            message_key: message.id.clone(),
            action_uuid: uuid,
        });
        Ok(self.action_to_uri(&action))
    }

    /// Rewrites an action into the application's URI scheme.
    ///
    /// `http…` actions become `{scheme}://open?url={encoded}`, `://path`
    /// deep links get the scheme prepended, anything else is returned as is.
    pub fn action_to_uri(&self, action: &str) -> String {
        if action.starts_with("http") {
            format!(
                "{}://open?url={}",
                self.deep_link_scheme,
                utf8_percent_encode(action, URI_COMPONENT)
            )
        } else if action.starts_with("://") {
            format!("{}{action}", self.deep_link_scheme)
        } else {
            action.to_string()
        }
    }

    /// The first eligible message with `id`.
    pub async fn get_message(&self, id: &str) -> Result<Option<Message>, PlumbError> {
        Ok(self
            .storage
            .get_messages()
            .await?
            .into_iter()
            .find(|m| m.id == id))
    }
}
