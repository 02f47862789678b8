// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wires the messaging engine together from a loaded configuration.

use std::sync::Arc;

use tracing::{debug, info};

use gleanplumb_config::PlumbConfig;
use gleanplumb_core::{
    MessagingFeatureConfig, MetadataStorage, PlumbError, PluginAdapter, TelemetrySink,
};
use gleanplumb_messaging::{
    ConfiguredFeature, JexlHelperFactory, MessagingMiddleware, MessagingStore,
    NimbusMessagingController, NimbusMessagingStorage, telemetry_reporter,
};
use gleanplumb_storage::OnDiskMetadataStorage;

/// Everything a command needs: metadata storage, the messaging storage and
/// controller, and the store driving the surfaces.
pub struct App {
    pub config: PlumbConfig,
    pub metadata: Arc<OnDiskMetadataStorage>,
    pub storage: Arc<NimbusMessagingStorage>,
    pub controller: Arc<NimbusMessagingController>,
    pub store: Arc<MessagingStore>,
}

impl App {
    pub fn new(
        config: PlumbConfig,
        feature: MessagingFeatureConfig,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Self {
        let metadata = Arc::new(OnDiskMetadataStorage::from_config(&config.storage));
        debug!(path = %config.storage.metadata_path, "metadata storage configured");

        let helper_factory = Arc::new(JexlHelperFactory::new(
            &config.app.app_version,
            &config.messaging.attributes,
        ));
        let storage = Arc::new(NimbusMessagingStorage::new(
            metadata.clone() as Arc<dyn MetadataStorage>,
            telemetry_reporter(telemetry.clone()),
            helper_factory,
            Arc::new(ConfiguredFeature::new(feature, telemetry.clone())),
        ));
        let controller = Arc::new(NimbusMessagingController::new(
            storage.clone(),
            telemetry,
            &config.app.deep_link_scheme,
        ));
        let store = Arc::new(MessagingStore::new(MessagingMiddleware::new(
            storage.clone(),
            controller.clone(),
        )));
        info!(
            messages = storage.feature().value().messages.len(),
            "messaging engine ready"
        );

        Self {
            config,
            metadata,
            storage,
            controller,
            store,
        }
    }

    /// Flushes metadata to disk.
    pub async fn shutdown(&self) -> Result<(), PlumbError> {
        self.metadata.shutdown().await
    }
}
