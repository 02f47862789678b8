// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entry points used by a surface: evaluation on start, and the reactions to
//! a pressed or dismissed message.

use std::sync::Arc;

use tracing::warn;

use gleanplumb_core::{
    FeatureHolder, Message, MessageSurfaceId, MessagingFeatureConfig, PlumbError, TelemetryEvent,
    TelemetrySink, UriLauncher,
};

use crate::controller::NimbusMessagingController;
use crate::storage::MalformedReporter;
use crate::store::{MessagingAction, MessagingStore};

/// Feature id used for exposure events.
pub const MESSAGING_FEATURE_ID: &str = "messaging";

/// Evaluates the next message for one surface.
pub struct MessagingFeature {
    store: Arc<MessagingStore>,
    surface: MessageSurfaceId,
}

impl MessagingFeature {
    pub fn new(store: Arc<MessagingStore>, surface: MessageSurfaceId) -> Self {
        Self { store, surface }
    }

    pub async fn start(&self) -> Result<(), PlumbError> {
        self.store
            .dispatch(MessagingAction::Evaluate(self.surface))
            .await
    }
}

/// Reacts to the user pressing or dismissing a displayed message.
pub struct DefaultMessageController {
    store: Arc<MessagingStore>,
    controller: Arc<NimbusMessagingController>,
    launcher: Arc<dyn UriLauncher>,
}

impl DefaultMessageController {
    pub fn new(
        store: Arc<MessagingStore>,
        controller: Arc<NimbusMessagingController>,
        launcher: Arc<dyn UriLauncher>,
    ) -> Self {
        Self {
            store,
            controller,
            launcher,
        }
    }

    /// Records the click, retires the message, and opens its action.
    /// Returns the URI that was launched.
    pub async fn on_message_pressed(&self, message: &Message) -> Result<String, PlumbError> {
        let uri = self.controller.process_message_action_to_uri(message)?;
        self.store
            .dispatch(MessagingAction::MessageClicked(message.clone()))
            .await?;
        self.launcher.launch(&uri).await?;
        Ok(uri)
    }

    pub async fn on_message_dismissed(&self, message: &Message) -> Result<(), PlumbError> {
        self.store
            .dispatch(MessagingAction::MessageDismissed(message.clone()))
            .await
    }
}

/// A feature value loaded once from configuration. Exposures go to telemetry.
pub struct ConfiguredFeature {
    value: Arc<MessagingFeatureConfig>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl ConfiguredFeature {
    pub fn new(value: MessagingFeatureConfig, telemetry: Arc<dyn TelemetrySink>) -> Self {
        Self {
            value: Arc::new(value),
            telemetry,
        }
    }
}

impl FeatureHolder for ConfiguredFeature {
    fn value(&self) -> Arc<MessagingFeatureConfig> {
        self.value.clone()
    }

    fn record_exposure(&self) {
        self.telemetry.record(TelemetryEvent::ExperimentExposure {
            feature_id: MESSAGING_FEATURE_ID.to_string(),
        });
    }
}

/// Reports malformed messages as telemetry events.
pub fn telemetry_reporter(telemetry: Arc<dyn TelemetrySink>) -> MalformedReporter {
    Arc::new(move |message_id: &str| {
        warn!(message_id = %message_id, "reporting malformed message");
        telemetry.record(TelemetryEvent::MalformedMessage {
            message_key: message_id.to_string(),
        });
    })
}
