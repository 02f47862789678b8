// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message metadata persistence for Gleanplumb.
//!
//! Provides a lock-guarded, lazily loaded metadata table
//! ([`CachedMetadataStorage`]) over a pluggable persistence backend, and the
//! JSON file backend used on disk.

pub mod backend;
pub mod cached;

pub use backend::{JsonFileBackend, MetadataBackend};
pub use cached::{CachedMetadataStorage, OnDiskMetadataStorage};
