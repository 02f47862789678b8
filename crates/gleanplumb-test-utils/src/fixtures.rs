// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builders for feature values and messages.

use std::collections::BTreeMap;

use gleanplumb_core::types::{
    Message, MessageData, MessageKind, MessageSurfaceId, MessagingFeatureConfig, Metadata,
    StyleData,
};

/// Raw message data pointing at `action`, `style`, and `triggers`.
pub fn message_data(action: &str, style: &str, triggers: &[&str]) -> MessageData {
    MessageData {
        action: action.to_string(),
        style: style.to_string(),
        trigger: triggers.iter().map(|t| t.to_string()).collect(),
        ..MessageData::default()
    }
}

pub fn on_surface(data: MessageData, surface: MessageSurfaceId) -> MessageData {
    MessageData { surface, ..data }
}

pub fn control(data: MessageData) -> MessageData {
    MessageData {
        kind: MessageKind::Control,
        ..data
    }
}

pub fn style(priority: i32, max_display_count: u32) -> StyleData {
    StyleData {
        priority,
        max_display_count,
    }
}

/// A small feature value: one trigger, one style, one action, and three
/// messages where `malformed` points at an unknown action.
pub fn sample_feature() -> MessagingFeatureConfig {
    feature(
        &[
            ("message-1", message_data("action-1", "style-1", &["trigger-1"])),
            (
                "message-2",
                on_surface(
                    message_data("action-1", "style-1", &["trigger-1"]),
                    MessageSurfaceId::Notification,
                ),
            ),
            (
                "malformed",
                message_data("malformed-action", "style-1", &["trigger-1"]),
            ),
        ],
        &[("style-1", style(1, 5))],
    )
}

/// Feature value with the default trigger and action tables.
///
/// Triggers: `trigger-1` → `trigger-1-expression`. Actions: `action-1` → `action-1-url`.
pub fn feature(
    messages: &[(&str, MessageData)],
    styles: &[(&str, StyleData)],
) -> MessagingFeatureConfig {
    MessagingFeatureConfig {
        triggers: BTreeMap::from([("trigger-1".to_string(), "trigger-1-expression".to_string())]),
        actions: BTreeMap::from([("action-1".to_string(), "action-1-url".to_string())]),
        styles: styles
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
        messages: messages
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
        ..MessagingFeatureConfig::default()
    }
}

/// A resolved message with fresh metadata.
pub fn message(id: &str, data: MessageData, action: &str, style: StyleData) -> Message {
    Message {
        id: id.to_string(),
        data,
        action: action.to_string(),
        style,
        triggers: vec!["trigger".to_string()],
        metadata: Metadata::new(id),
    }
}
