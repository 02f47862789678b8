// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lock-guarded metadata table implementing the MetadataStorage trait.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use gleanplumb_config::model::StorageConfig;
use gleanplumb_core::{
    AdapterType, HealthStatus, Metadata, MetadataStorage, PlumbError, PluginAdapter,
};

use crate::backend::{JsonFileBackend, MetadataBackend};

/// Metadata storage backed by the JSON metadata file.
pub type OnDiskMetadataStorage = CachedMetadataStorage<JsonFileBackend>;

type MetadataTable = HashMap<String, Metadata>;

/// In-memory metadata table loaded once from a [`MetadataBackend`].
///
/// A single mutex guards both the cached table and every backend read and
/// write, so a reader never sees a table that is halfway through an update.
/// The table is loaded on first access; an unreadable backend yields an
/// empty table and is not retried.
pub struct CachedMetadataStorage<B: MetadataBackend> {
    backend: B,
    table: Mutex<Option<MetadataTable>>,
}

impl OnDiskMetadataStorage {
    /// Create storage for the metadata file named in `config`.
    ///
    /// The file is not read until the first call to [`MetadataStorage::get_metadata`].
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(JsonFileBackend::from_config(config))
    }
}

impl<B: MetadataBackend> CachedMetadataStorage<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            table: Mutex::new(None),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

/// Returns the cached table, loading it from `backend` on first use.
async fn ensure_loaded<'a, B: MetadataBackend>(
    backend: &B,
    slot: &'a mut Option<MetadataTable>,
) -> &'a mut MetadataTable {
    if slot.is_none() {
        let records = match backend.load().await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "failed to read message metadata, starting empty");
                Vec::new()
            }
        };
        debug!(count = records.len(), "message metadata loaded");
        *slot = Some(
            records
                .into_iter()
                .map(|m| (m.id.clone(), m))
                .collect(),
        );
    }
    slot.get_or_insert_with(HashMap::new)
}

fn sorted_records(table: &MetadataTable) -> Vec<Metadata> {
    let mut records: Vec<Metadata> = table.values().cloned().collect();
    records.sort_by(|a, b| a.id.cmp(&b.id));
    records
}

#[async_trait]
impl<B: MetadataBackend> PluginAdapter for CachedMetadataStorage<B> {
    fn name(&self) -> &str {
        "metadata-cache"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, PlumbError> {
        self.backend.health_check().await
    }

    async fn shutdown(&self) -> Result<(), PlumbError> {
        let guard = self.table.lock().await;
        if let Some(table) = guard.as_ref() {
            self.backend.save(&sorted_records(table)).await?;
            debug!("shutdown: metadata flushed");
        }
        Ok(())
    }
}

#[async_trait]
impl<B: MetadataBackend> MetadataStorage for CachedMetadataStorage<B> {
    async fn get_metadata(&self) -> Result<HashMap<String, Metadata>, PlumbError> {
        let mut guard = self.table.lock().await;
        Ok(ensure_loaded(&self.backend, &mut guard).await.clone())
    }

    async fn add_metadata(&self, metadata: Metadata) -> Result<Metadata, PlumbError> {
        let mut guard = self.table.lock().await;
        let table = ensure_loaded(&self.backend, &mut guard).await;
        // The cache only takes the record once the backend has it.
        let mut staged = table.clone();
        staged.insert(metadata.id.clone(), metadata.clone());
        self.backend.save(&sorted_records(&staged)).await?;
        *table = staged;
        Ok(metadata)
    }
}
