// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Gleanplumb integration tests.
//!
//! Provides in-memory collaborators for every seam of the messaging engine,
//! so selection and bookkeeping can be tested without disk, clocks, or a
//! real expression engine.
//!
//! # Components
//!
//! - [`InMemoryMetadataStorage`] - Metadata storage that records every write
//! - [`RecordingTelemetry`] - Telemetry sink that captures events
//! - [`ScriptedHelperFactory`] - Expression helper with scripted results
//! - [`StaticFeature`], [`RecordingLauncher`], [`RecordingNotifier`], [`FixedBootId`]
//! - [`fixtures`] - Builders for feature values and messages

pub mod fixtures;
pub mod mock_helper;
pub mod mock_platform;
pub mod mock_storage;
pub mod mock_telemetry;

pub use mock_helper::ScriptedHelperFactory;
pub use mock_platform::{FixedBootId, RecordingLauncher, RecordingNotifier, StaticFeature};
pub use mock_storage::{InMemoryMetadataStorage, WriteHold};
pub use mock_telemetry::RecordingTelemetry;
