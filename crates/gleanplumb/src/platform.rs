// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal stand-ins for the host's navigation and notification hooks.

use async_trait::async_trait;
use tracing::info;

use gleanplumb_core::{Message, Notifier, PlumbError, UriLauncher};

/// Prints the URI a message action would open.
#[derive(Debug, Default)]
pub struct StdoutLauncher;

#[async_trait]
impl UriLauncher for StdoutLauncher {
    async fn launch(&self, uri: &str) -> Result<(), PlumbError> {
        info!(uri, "launching message action");
        println!("open {uri}");
        Ok(())
    }
}

/// Prints posted notifications.
#[derive(Debug, Default)]
pub struct StdoutNotifier;

#[async_trait]
impl Notifier for StdoutNotifier {
    async fn notify(&self, message: &Message) -> Result<(), PlumbError> {
        println!("{}", render_notification(message));
        Ok(())
    }
}

fn render_notification(message: &Message) -> String {
    match &message.data.title {
        Some(title) => format!("[{}] {title}: {}", message.id, message.data.text),
        None => format!("[{}] {}", message.id, message.data.text),
    }
}

#[cfg(test)]
mod tests {
    use gleanplumb_core::MessageData;
    use gleanplumb_test_utils::fixtures::{message, style};

    use super::*;

    #[test]
    fn notification_line_includes_title_when_present() {
        let data = MessageData {
            text: "Try it".into(),
            ..MessageData::default()
        };
        let plain = message("m", data.clone(), "a", style(1, 5));
        assert_eq!(render_notification(&plain), "[m] Try it");

        let titled = message(
            "m",
            MessageData {
                title: Some("New".into()),
                ..data
            },
            "a",
            style(1, 5),
        );
        assert_eq!(render_notification(&titled), "[m] New: Try it");
    }
}
