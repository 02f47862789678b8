// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits at each seam of the messaging engine.
//!
//! Persistence and telemetry adapters extend the [`PluginAdapter`] base trait
//! and use `#[async_trait]` for dynamic dispatch compatibility. The remaining
//! seams (expression evaluation, feature values, platform hooks) are plain
//! object-safe traits.

pub mod adapter;
pub mod feature;
pub mod helper;
pub mod platform;
pub mod storage;
pub mod telemetry;

pub use adapter::PluginAdapter;
pub use feature::FeatureHolder;
pub use helper::{HelperFactory, MessageHelper};
pub use platform::{BootIdProvider, Notifier, UriLauncher};
pub use storage::MetadataStorage;
pub use telemetry::TelemetrySink;
