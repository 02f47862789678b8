// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message, metadata, and feature-definition types shared across the workspace.
//!
//! The feature definitions (`MessageData`, `StyleData`, `MessagingFeatureConfig`)
//! mirror the kebab-case JSON shape delivered by the experimentation service.
//! `Metadata` mirrors the camelCase shape of the on-disk metadata file.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Sentinel action assigned to control messages, which never navigate anywhere.
pub const CONTROL_ACTION: &str = "CONTROL_ACTION";

/// Style key used when a message does not name one.
pub const DEFAULT_STYLE: &str = "DEFAULT";

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a collaborator seam.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Telemetry,
}

/// The UI location a message may be displayed on.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum MessageSurfaceId {
    #[default]
    Homescreen,
    Notification,
}

/// Whether a message is a real treatment or the placebo arm of an experiment.
///
/// On the wire this is the `is-control` boolean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MessageKind {
    #[default]
    Normal,
    Control,
}

impl MessageKind {
    pub fn is_control(self) -> bool {
        matches!(self, MessageKind::Control)
    }
}

mod control_flag {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::MessageKind;

    pub fn serialize<S: Serializer>(kind: &MessageKind, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(kind.is_control())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<MessageKind, D::Error> {
        Ok(if bool::deserialize(deserializer)? {
            MessageKind::Control
        } else {
            MessageKind::Normal
        })
    }
}

/// What to do when the selected message turns out to be a control message.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ControlMessageBehavior {
    /// Skip the control message and surface the next eligible normal message.
    #[default]
    ShowNextMessage,
    /// Surface nothing.
    ShowNone,
}

/// Priority and display budget shared by one or more messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct StyleData {
    #[serde(default = "default_priority")]
    pub priority: i32,

    #[serde(default = "default_max_display_count")]
    pub max_display_count: u32,
}

impl Default for StyleData {
    fn default() -> Self {
        Self {
            priority: default_priority(),
            max_display_count: default_max_display_count(),
        }
    }
}

fn default_priority() -> i32 {
    50
}

fn default_max_display_count() -> u32 {
    5
}

/// Raw message definition as delivered by the feature configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct MessageData {
    /// Either a URL (starts with `http`) or a key into the actions table.
    #[serde(default)]
    pub action: String,

    /// Key into the styles table.
    #[serde(default = "default_style_key")]
    pub style: String,

    /// Keys into the triggers table; all must hold for the message to be eligible.
    #[serde(default)]
    pub trigger: Vec<String>,

    #[serde(default)]
    pub surface: MessageSurfaceId,

    #[serde(default, rename = "is-control", with = "control_flag")]
    pub kind: MessageKind,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub button_label: Option<String>,
}

impl Default for MessageData {
    fn default() -> Self {
        Self {
            action: String::new(),
            style: default_style_key(),
            trigger: Vec::new(),
            surface: MessageSurfaceId::default(),
            kind: MessageKind::default(),
            title: None,
            text: String::new(),
            button_label: None,
        }
    }
}

fn default_style_key() -> String {
    DEFAULT_STYLE.to_string()
}

/// Notification polling settings carried by the feature configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct NotificationConfig {
    /// Minutes between two notification polls.
    #[serde(default = "default_polling_interval")]
    pub polling_interval: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            polling_interval: default_polling_interval(),
        }
    }
}

fn default_polling_interval() -> u64 {
    1440
}

/// The full messaging feature value: lookup tables plus the raw messages.
///
/// Maps are ordered so that messages of equal priority come out in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct MessagingFeatureConfig {
    #[serde(default)]
    pub triggers: BTreeMap<String, String>,

    #[serde(default)]
    pub actions: BTreeMap<String, String>,

    #[serde(default)]
    pub styles: BTreeMap<String, StyleData>,

    #[serde(default)]
    pub messages: BTreeMap<String, MessageData>,

    #[serde(default)]
    pub on_control: ControlMessageBehavior,

    /// Message id, or id prefix ending in `-`, currently under experiment.
    #[serde(default)]
    pub message_under_experiment: Option<String>,

    #[serde(default)]
    pub notification_config: NotificationConfig,
}

/// Per-message interaction counters persisted across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub id: String,

    #[serde(default)]
    pub display_count: u32,

    #[serde(default)]
    pub pressed: bool,

    #[serde(default)]
    pub dismissed: bool,

    /// Epoch milliseconds of the last display.
    #[serde(default)]
    pub last_time_shown: i64,

    #[serde(default, deserialize_with = "boot_identifier::deserialize")]
    pub latest_boot_identifier: Option<String>,
}

impl Metadata {
    /// Fresh metadata for a message that has never been shown.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_count: 0,
            pressed: false,
            dismissed: false,
            last_time_shown: 0,
            latest_boot_identifier: None,
        }
    }
}

mod boot_identifier {
    use serde::{Deserialize, Deserializer};

    /// Older metadata files stored an unset identifier as the string `"null"`.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.filter(|v| v != "null"))
    }
}

/// A resolved, displayable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub data: MessageData,
    /// Resolved action URL or deep-link template.
    pub action: String,
    pub style: StyleData,
    /// Resolved trigger expressions.
    pub triggers: Vec<String>,
    pub metadata: Metadata,
}

impl Message {
    pub fn surface(&self) -> MessageSurfaceId {
        self.data.surface
    }

    pub fn kind(&self) -> MessageKind {
        self.data.kind
    }

    pub fn max_display_count(&self) -> u32 {
        self.style.max_display_count
    }

    /// True once the message has used up its display budget.
    pub fn is_expired(&self) -> bool {
        self.metadata.display_count >= self.style.max_display_count
    }

    /// Returns a copy carrying `metadata`.
    pub fn with_metadata(&self, metadata: Metadata) -> Self {
        Self {
            metadata,
            ..self.clone()
        }
    }
}

/// A telemetry event emitted by the messaging engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelemetryEvent {
    MessageShown { message_key: String },
    MessageExpired { message_key: String },
    MessageDismissed { message_key: String },
    MessageClicked {
        message_key: String,
        action_uuid: Option<String>,
    },
    MalformedMessage { message_key: String },
    ExperimentExposure { feature_id: String },
}

impl TelemetryEvent {
    /// Stable snake_case event name.
    pub fn name(&self) -> &'static str {
        match self {
            TelemetryEvent::MessageShown { .. } => "message_shown",
            TelemetryEvent::MessageExpired { .. } => "message_expired",
            TelemetryEvent::MessageDismissed { .. } => "message_dismissed",
            TelemetryEvent::MessageClicked { .. } => "message_clicked",
            TelemetryEvent::MalformedMessage { .. } => "malformed",
            TelemetryEvent::ExperimentExposure { .. } => "exposure",
        }
    }

    /// The message this event is about, if any.
    pub fn message_key(&self) -> Option<&str> {
        match self {
            TelemetryEvent::MessageShown { message_key }
            | TelemetryEvent::MessageExpired { message_key }
            | TelemetryEvent::MessageDismissed { message_key }
            | TelemetryEvent::MessageClicked { message_key, .. }
            | TelemetryEvent::MalformedMessage { message_key } => Some(message_key),
            TelemetryEvent::ExperimentExposure { .. } => None,
        }
    }
}
