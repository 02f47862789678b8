// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand implementations. Each returns data; `main` decides how to print it.

use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use gleanplumb_core::{
    BootIdProvider, Message, MessageSurfaceId, Metadata, MetadataStorage, Notifier, PlumbError,
    UriLauncher,
};
use gleanplumb_messaging::{DefaultMessageController, MessageNotificationWorker, MessagingAction};

use crate::app::App;

/// One eligible message, flattened for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageSummary {
    pub id: String,
    pub surface: MessageSurfaceId,
    pub priority: i32,
    pub display_count: u32,
    pub max_display_count: u32,
    pub action: String,
    pub text: String,
}

impl From<&Message> for MessageSummary {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.clone(),
            surface: message.surface(),
            priority: message.style.priority,
            display_count: message.metadata.display_count,
            max_display_count: message.max_display_count(),
            action: message.action.clone(),
            text: message.data.text.clone(),
        }
    }
}

/// Eligible messages in selection order.
pub async fn list_messages(app: &App) -> Result<Vec<MessageSummary>, PlumbError> {
    let messages = app.storage.get_messages().await?;
    Ok(messages.iter().map(MessageSummary::from).collect())
}

/// Restores the message list and evaluates `surface`, counting a display of
/// whatever gets picked.
pub async fn evaluate(app: &App, surface: MessageSurfaceId) -> Result<Option<Message>, PlumbError> {
    app.store.dispatch(MessagingAction::Restore).await?;
    app.store.dispatch(MessagingAction::Evaluate(surface)).await?;
    Ok(app.store.state().message_to_show.get(&surface).cloned())
}

/// Presses message `id`. Returns the launched URI.
pub async fn click(
    app: &App,
    id: &str,
    launcher: Arc<dyn UriLauncher>,
) -> Result<String, PlumbError> {
    let message = restored_message(app, id).await?;
    DefaultMessageController::new(app.store.clone(), app.controller.clone(), launcher)
        .on_message_pressed(&message)
        .await
}

/// Dismisses message `id`.
pub async fn dismiss(app: &App, id: &str, launcher: Arc<dyn UriLauncher>) -> Result<(), PlumbError> {
    let message = restored_message(app, id).await?;
    DefaultMessageController::new(app.store.clone(), app.controller.clone(), launcher)
        .on_message_dismissed(&message)
        .await
}

async fn restored_message(app: &App, id: &str) -> Result<Message, PlumbError> {
    app.store.dispatch(MessagingAction::Restore).await?;
    app.store
        .state()
        .messages
        .into_iter()
        .find(|m| m.id == id)
        .ok_or_else(|| PlumbError::MessageNotFound { id: id.to_string() })
}

/// Runs the notification worker. With `once`, polls a single time and
/// returns the posted message. Does nothing when notifications are disabled.
pub async fn poll(
    app: &App,
    once: bool,
    notifier: Arc<dyn Notifier>,
    launcher: Arc<dyn UriLauncher>,
    boot_id: Arc<dyn BootIdProvider>,
    cancel: CancellationToken,
) -> Result<Option<Message>, PlumbError> {
    if !app.config.messaging.notifications_enabled {
        warn!("notifications are disabled in configuration, not polling");
        return Ok(None);
    }
    let worker = MessageNotificationWorker::new(app.controller.clone(), notifier, launcher, boot_id);
    if once {
        return worker.poll_once().await;
    }
    info!(interval_secs = worker.interval().as_secs(), "polling for notifications");
    worker.run(cancel).await;
    Ok(None)
}

/// Stored metadata records, sorted by message id.
pub async fn metadata(app: &App) -> Result<Vec<Metadata>, PlumbError> {
    let mut records: Vec<Metadata> = app.metadata.get_metadata().await?.into_values().collect();
    records.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(records)
}

#[cfg(test)]
mod tests {
    use gleanplumb_config::PlumbConfig;
    use gleanplumb_test_utils::{FixedBootId, RecordingLauncher, RecordingNotifier, RecordingTelemetry};

    use super::*;

    const CONFIG: &str = r#"
[app]
deep_link_scheme = "plumb"

[messaging.feature.triggers]
always = "true"

[messaging.feature.actions]
open-settings = "://settings"

[messaging.feature.styles.urgent]
priority = 100
max-display-count = 3

[messaging.feature.messages.welcome]
action = "https://example.org/welcome"
style = "urgent"
trigger = ["always"]
text = "Welcome"

[messaging.feature.messages.tips]
action = "open-settings"
trigger = ["always"]
text = "Tips"

[messaging.feature.messages.ping]
action = "open-settings"
trigger = ["always"]
surface = "notification"
text = "Ping"
"#;

    struct Fixture {
        app: App,
        telemetry: RecordingTelemetry,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        fixture_with(|_| {})
    }

    fn fixture_with(configure: impl FnOnce(&mut PlumbConfig)) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let mut config: PlumbConfig =
            gleanplumb_config::load_and_validate_str(CONFIG).expect("config should load");
        configure(&mut config);
        config.storage.metadata_path = dir.path().join("metadata.json").display().to_string();
        let feature = config.messaging.feature.clone();
        let telemetry = RecordingTelemetry::new();
        let app = App::new(config, feature, Arc::new(telemetry.clone()));
        Fixture {
            app,
            telemetry,
            _dir: dir,
        }
    }

    #[tokio::test]
    async fn lists_messages_by_priority() {
        let f = fixture();
        let ids: Vec<String> = list_messages(&f.app)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec!["welcome", "ping", "tips"]);
    }

    #[tokio::test]
    async fn evaluate_counts_a_display() {
        let f = fixture();
        let shown = evaluate(&f.app, MessageSurfaceId::Homescreen)
            .await
            .unwrap()
            .expect("a message should be shown");
        assert_eq!(shown.id, "welcome");
        assert_eq!(shown.metadata.display_count, 1);

        let stored = metadata(&f.app).await.unwrap();
        let welcome = stored.iter().find(|m| m.id == "welcome").unwrap();
        assert_eq!(welcome.display_count, 1);
    }

    #[tokio::test]
    async fn click_launches_rewritten_action() {
        let f = fixture();
        let launcher = RecordingLauncher::new();

        let uri = click(&f.app, "tips", Arc::new(launcher.clone())).await.unwrap();

        assert_eq!(uri, "plumb://settings");
        assert_eq!(launcher.launched(), vec!["plumb://settings".to_string()]);
        assert_eq!(f.telemetry.count("message_clicked"), 1);
        let ids: Vec<String> = list_messages(&f.app)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert!(!ids.contains(&"tips".to_string()));
    }

    #[tokio::test]
    async fn unknown_message_is_not_found() {
        let f = fixture();
        let err = dismiss(&f.app, "nope", Arc::new(RecordingLauncher::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, PlumbError::MessageNotFound { id } if id == "nope"));
    }

    #[tokio::test]
    async fn poll_once_posts_notification() {
        let f = fixture();
        let notifier = RecordingNotifier::new();

        let posted = poll(
            &f.app,
            true,
            Arc::new(notifier.clone()),
            Arc::new(RecordingLauncher::new()),
            Arc::new(FixedBootId::new(Some("boot"))),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(posted.map(|m| m.id), Some("ping".to_string()));
        assert_eq!(notifier.posted().len(), 1);
    }

    #[tokio::test]
    async fn poll_once_respects_disabled_notifications() {
        let f = fixture_with(|config| config.messaging.notifications_enabled = false);
        let notifier = RecordingNotifier::new();

        let posted = poll(
            &f.app,
            true,
            Arc::new(notifier.clone()),
            Arc::new(RecordingLauncher::new()),
            Arc::new(FixedBootId::new(Some("boot"))),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert!(posted.is_none());
        assert!(notifier.posted().is_empty());
        assert!(f.app.metadata.get_metadata().await.unwrap().is_empty());
    }
}
