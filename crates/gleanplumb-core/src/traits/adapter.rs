// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait shared by the stateful collaborators.

use async_trait::async_trait;

use crate::error::PlumbError;
use crate::types::{AdapterType, HealthStatus};

/// Identity and lifecycle hooks for a pluggable backend.
///
/// Metadata storage and telemetry sinks implement this so the binary can
/// report on them and release their resources on exit.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Human-readable name of this backend.
    fn name(&self) -> &str;

    fn version(&self) -> semver::Version;

    fn adapter_type(&self) -> AdapterType;

    /// Reports whether the backend can currently serve requests.
    async fn health_check(&self) -> Result<HealthStatus, PlumbError>;

    /// Flushes pending work and releases held resources.
    async fn shutdown(&self) -> Result<(), PlumbError>;
}
