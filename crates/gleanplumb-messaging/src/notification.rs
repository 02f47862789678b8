// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic notification polling.
//!
//! The [`MessageNotificationWorker`] picks the next notification-surface
//! message on every tick and posts it, at most once per device boot.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use gleanplumb_core::{
    BootIdProvider, Message, MessageSurfaceId, Notifier, PlumbError, UriLauncher,
};

use crate::controller::NimbusMessagingController;

/// Boot identifier of the running Linux kernel.
#[derive(Debug, Default, Clone)]
pub struct LinuxBootId;

impl LinuxBootId {
    pub const PATH: &'static str = "/proc/sys/kernel/random/boot_id";
}

impl BootIdProvider for LinuxBootId {
    fn boot_identifier(&self) -> Option<String> {
        std::fs::read_to_string(Self::PATH)
            .ok()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
    }
}

/// Polls for notification messages and handles their click and dismissal.
pub struct MessageNotificationWorker {
    controller: Arc<NimbusMessagingController>,
    notifier: Arc<dyn Notifier>,
    launcher: Arc<dyn UriLauncher>,
    boot_id: Arc<dyn BootIdProvider>,
    interval: Duration,
}

impl MessageNotificationWorker {
    /// The polling interval comes from the feature's `notification-config`.
    pub fn new(
        controller: Arc<NimbusMessagingController>,
        notifier: Arc<dyn Notifier>,
        launcher: Arc<dyn UriLauncher>,
        boot_id: Arc<dyn BootIdProvider>,
    ) -> Self {
        let minutes = controller
            .storage()
            .feature()
            .value()
            .notification_config
            .polling_interval
            .max(1);
        Self {
            controller,
            notifier,
            launcher,
            boot_id,
            interval: Duration::from_secs(minutes * 60),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Posts the next notification message, unless it was already posted
    /// since the last boot. Returns the posted message.
    pub async fn poll_once(&self) -> Result<Option<Message>, PlumbError> {
        let storage = self.controller.storage();
        let messages = storage.get_messages().await?;
        let Some(next) = storage.get_next_message(MessageSurfaceId::Notification, &messages)?
        else {
            debug!("no notification message to post");
            return Ok(None);
        };

        let boot_id = self.boot_id.boot_identifier();
        if next.metadata.latest_boot_identifier == boot_id {
            debug!(message_id = %next.id, "already posted since last boot");
            return Ok(None);
        }

        let updated = self
            .controller
            .update_message_as_displayed(&next, boot_id.as_deref());
        self.controller.on_message_displayed(&updated).await?;
        self.notifier.notify(&updated).await?;
        info!(message_id = %updated.id, "notification posted");
        Ok(Some(updated))
    }

    /// Polls every interval until `cancel` fires. The first poll happens
    /// one interval after start. Failed polls are logged and skipped.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_secs = self.interval.as_secs(), "notification worker started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("notification worker stopped");
                    return;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.poll_once().await {
                        warn!(error = %e, "notification poll failed");
                    }
                }
            }
        }
    }

    /// Marks the message pressed and opens its action. Returns the launched
    /// URI, or `None` if the message is no longer eligible.
    pub async fn on_notification_clicked(&self, id: &str) -> Result<Option<String>, PlumbError> {
        let Some(message) = self.controller.get_message(id).await? else {
            return Ok(None);
        };
        self.controller.on_message_clicked(&message.metadata).await?;
        let uri = self.controller.action_to_uri(&message.action);
        self.launcher.launch(&uri).await?;
        Ok(Some(uri))
    }

    /// Marks the message dismissed. Returns whether it was still eligible.
    pub async fn on_notification_dismissed(&self, id: &str) -> Result<bool, PlumbError> {
        match self.controller.get_message(id).await? {
            Some(message) => {
                self.controller
                    .on_message_dismissed(&message.metadata)
                    .await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
