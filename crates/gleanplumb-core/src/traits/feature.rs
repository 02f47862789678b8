// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Access to the remotely configured messaging feature.

use std::sync::Arc;

use crate::types::MessagingFeatureConfig;

/// Holder of the current messaging feature value.
pub trait FeatureHolder: Send + Sync {
    /// The feature value as of now.
    fn value(&self) -> Arc<MessagingFeatureConfig>;

    /// Records that the user was exposed to the experiment behind this feature.
    fn record_exposure(&self);
}
