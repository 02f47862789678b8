// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared wiring for messaging integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use gleanplumb_core::{MessagingFeatureConfig, Metadata};
use gleanplumb_messaging::{
    MessagingMiddleware, MessagingStore, NimbusMessagingController, NimbusMessagingStorage,
};
use gleanplumb_test_utils::{
    InMemoryMetadataStorage, RecordingTelemetry, ScriptedHelperFactory, StaticFeature,
};

pub const NOW: i64 = 1_700_000_000_000;

pub struct Harness {
    pub storage: Arc<NimbusMessagingStorage>,
    pub controller: Arc<NimbusMessagingController>,
    pub store: Arc<MessagingStore>,
    pub metadata: Arc<InMemoryMetadataStorage>,
    pub telemetry: RecordingTelemetry,
    pub helper: ScriptedHelperFactory,
    pub feature: StaticFeature,
}

pub fn harness(value: MessagingFeatureConfig, metadata: Vec<Metadata>) -> Harness {
    harness_with(value, metadata, ScriptedHelperFactory::new())
}

pub fn harness_with(
    value: MessagingFeatureConfig,
    metadata: Vec<Metadata>,
    helper: ScriptedHelperFactory,
) -> Harness {
    let metadata = Arc::new(InMemoryMetadataStorage::with_records(metadata));
    let telemetry = RecordingTelemetry::new();
    let feature = StaticFeature::new(value);
    let storage = Arc::new(NimbusMessagingStorage::new(
        metadata.clone(),
        Arc::new(|_| {}),
        Arc::new(helper.clone()),
        Arc::new(feature.clone()),
    ));
    let controller = Arc::new(NimbusMessagingController::with_clock(
        storage.clone(),
        Arc::new(telemetry.clone()),
        "fenix",
        Arc::new(|| NOW),
    ));
    let store = Arc::new(MessagingStore::new(MessagingMiddleware::new(
        storage.clone(),
        controller.clone(),
    )));
    Harness {
        storage,
        controller,
        store,
        metadata,
        telemetry,
        helper,
        feature,
    }
}
