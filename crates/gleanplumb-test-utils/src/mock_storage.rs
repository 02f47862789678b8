// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory metadata storage for deterministic testing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, oneshot};

use gleanplumb_core::traits::adapter::PluginAdapter;
use gleanplumb_core::traits::storage::MetadataStorage;
use gleanplumb_core::types::{AdapterType, HealthStatus, Metadata};
use gleanplumb_core::PlumbError;

/// Metadata storage held entirely in memory.
///
/// Every record passed to `add_metadata` is also appended to a write log so
/// tests can assert on what was persisted and in which order.
pub struct InMemoryMetadataStorage {
    table: Arc<Mutex<HashMap<String, Metadata>>>,
    writes: Arc<Mutex<Vec<Metadata>>>,
    hold: Arc<Mutex<Option<(oneshot::Sender<()>, oneshot::Receiver<()>)>>>,
}

/// A write parked by [`InMemoryMetadataStorage::hold_next_write`].
pub struct WriteHold {
    reached: oneshot::Receiver<()>,
    release: oneshot::Sender<()>,
}

impl WriteHold {
    /// Resolves once the held write has started and is waiting.
    pub async fn reached(&mut self) {
        let _ = (&mut self.reached).await;
    }

    /// Lets the held write finish.
    pub fn release(self) {
        let _ = self.release.send(());
    }
}

impl InMemoryMetadataStorage {
    pub fn new() -> Self {
        Self {
            table: Arc::new(Mutex::new(HashMap::new())),
            writes: Arc::new(Mutex::new(Vec::new())),
            hold: Arc::new(Mutex::new(None)),
        }
    }

    /// Create storage pre-loaded with `records`. Seeding is not logged as a write.
    pub fn with_records(records: Vec<Metadata>) -> Self {
        let table = records.into_iter().map(|m| (m.id.clone(), m)).collect();
        Self {
            table: Arc::new(Mutex::new(table)),
            writes: Arc::new(Mutex::new(Vec::new())),
            hold: Arc::new(Mutex::new(None)),
        }
    }

    /// Every record written so far, oldest first.
    pub async fn writes(&self) -> Vec<Metadata> {
        self.writes.lock().await.clone()
    }

    /// The most recent write, if any.
    pub async fn last_write(&self) -> Option<Metadata> {
        self.writes.lock().await.last().cloned()
    }

    /// Parks the next `add_metadata` before it stores anything, until the
    /// returned hold is released.
    pub async fn hold_next_write(&self) -> WriteHold {
        let (reached_tx, reached) = oneshot::channel();
        let (release, release_rx) = oneshot::channel();
        *self.hold.lock().await = Some((reached_tx, release_rx));
        WriteHold { reached, release }
    }

    /// Current record for `id`.
    pub async fn get(&self, id: &str) -> Option<Metadata> {
        self.table.lock().await.get(id).cloned()
    }
}

impl Default for InMemoryMetadataStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for InMemoryMetadataStorage {
    fn name(&self) -> &str {
        "in-memory-metadata"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, PlumbError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PlumbError> {
        Ok(())
    }
}

#[async_trait]
impl MetadataStorage for InMemoryMetadataStorage {
    async fn get_metadata(&self) -> Result<HashMap<String, Metadata>, PlumbError> {
        Ok(self.table.lock().await.clone())
    }

    async fn add_metadata(&self, metadata: Metadata) -> Result<Metadata, PlumbError> {
        let hold = self.hold.lock().await.take();
        if let Some((reached, release)) = hold {
            let _ = reached.send(());
            let _ = release.await;
        }
        self.table
            .lock()
            .await
            .insert(metadata.id.clone(), metadata.clone());
        self.writes.lock().await.push(metadata.clone());
        Ok(metadata)
    }
}
