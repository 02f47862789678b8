// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host-platform hooks: opening URIs, posting notifications, boot identity.

use async_trait::async_trait;

use crate::error::PlumbError;
use crate::types::Message;

/// Opens a resolved message action.
#[async_trait]
pub trait UriLauncher: Send + Sync {
    async fn launch(&self, uri: &str) -> Result<(), PlumbError>;
}

/// Posts a system notification for a message.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &Message) -> Result<(), PlumbError>;
}

/// Identifies the current boot of the device.
pub trait BootIdProvider: Send + Sync {
    /// `None` when the platform cannot tell boots apart.
    fn boot_identifier(&self) -> Option<String>;
}
