// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage trait for per-message interaction metadata.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::PlumbError;
use crate::traits::adapter::PluginAdapter;
use crate::types::Metadata;

/// Owner of the persisted [`Metadata`] table, keyed by message id.
///
/// Implementations must serialize concurrent readers and writers so a
/// caller never observes a half-applied update.
#[async_trait]
pub trait MetadataStorage: PluginAdapter {
    /// Returns every known metadata record. A missing or unreadable
    /// backing store yields an empty map rather than an error.
    async fn get_metadata(&self) -> Result<HashMap<String, Metadata>, PlumbError>;

    /// Inserts or replaces the record for `metadata.id`, persists the whole
    /// table, and hands the record back.
    async fn add_metadata(&self, metadata: Metadata) -> Result<Metadata, PlumbError>;

    /// Same as [`MetadataStorage::add_metadata`]; there is no separate update path.
    async fn update_metadata(&self, metadata: Metadata) -> Result<(), PlumbError> {
        self.add_metadata(metadata).await.map(|_| ())
    }
}
