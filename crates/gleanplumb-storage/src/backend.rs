// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence backends for the metadata table.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use gleanplumb_config::model::StorageConfig;
use gleanplumb_core::{HealthStatus, Metadata, PlumbError};

/// Durable home of the metadata table.
///
/// Backends load and save the table wholesale; caching and locking live in
/// [`crate::CachedMetadataStorage`].
#[async_trait]
pub trait MetadataBackend: Send + Sync + 'static {
    /// Reads every stored record. An absent store is an empty table.
    async fn load(&self) -> Result<Vec<Metadata>, PlumbError>;

    /// Replaces the stored table with `records`.
    async fn save(&self, records: &[Metadata]) -> Result<(), PlumbError>;

    async fn health_check(&self) -> Result<HealthStatus, PlumbError> {
        Ok(HealthStatus::Healthy)
    }
}

/// Stores the table as a JSON array in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.metadata_path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl MetadataBackend for JsonFileBackend {
    async fn load(&self) -> Result<Vec<Metadata>, PlumbError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(Vec::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no metadata file yet");
                Ok(Vec::new())
            }
            Err(e) => Err(PlumbError::storage(e)),
        }
    }

    async fn save(&self, records: &[Metadata]) -> Result<(), PlumbError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(PlumbError::storage)?;
        }
        let json = serde_json::to_string(records)?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(PlumbError::storage)?;
        debug!(path = %self.path.display(), count = records.len(), "metadata written");
        Ok(())
    }

    async fn health_check(&self) -> Result<HealthStatus, PlumbError> {
        let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(HealthStatus::Healthy);
        };
        match tokio::fs::metadata(parent).await {
            Ok(meta) if meta.is_dir() => Ok(HealthStatus::Healthy),
            Ok(_) => Ok(HealthStatus::Unhealthy(format!(
                "{} is not a directory",
                parent.display()
            ))),
            Err(_) => Ok(HealthStatus::Degraded(format!(
                "{} does not exist yet",
                parent.display()
            ))),
        }
    }
}
