// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Gleanplumb in-app messaging.
//!
//! This crate provides the message and metadata types, the error type, and
//! the collaborator traits used throughout the workspace. Storage, telemetry,
//! expression evaluation, and platform hooks are all implemented elsewhere
//! against the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::PlumbError;
pub use types::{
    AdapterType, ControlMessageBehavior, HealthStatus, Message, MessageData, MessageKind,
    MessageSurfaceId, MessagingFeatureConfig, Metadata, NotificationConfig, StyleData,
    TelemetryEvent, CONTROL_ACTION, DEFAULT_STYLE,
};

pub use traits::{
    BootIdProvider, FeatureHolder, HelperFactory, MessageHelper, MetadataStorage, Notifier,
    PluginAdapter, TelemetrySink, UriLauncher,
};
