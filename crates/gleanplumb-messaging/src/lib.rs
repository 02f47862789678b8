// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-app message eligibility, selection, and interaction bookkeeping.
//!
//! - [`NimbusMessagingStorage`] builds the list of displayable messages and
//!   picks the next one for a surface.
//! - [`NimbusMessagingController`] records displays, clicks, and dismissals.
//! - [`MessagingStore`] applies [`MessagingAction`]s through the middleware.
//! - [`MessageNotificationWorker`] posts notification-surface messages.

pub mod controller;
pub mod expression;
pub mod feature;
pub mod notification;
pub mod storage;
pub mod store;

pub use controller::{Clock, NimbusMessagingController};
pub use expression::{JexlHelper, JexlHelperFactory};
pub use feature::{
    ConfiguredFeature, DefaultMessageController, MessagingFeature, telemetry_reporter,
};
pub use notification::{LinuxBootId, MessageNotificationWorker};
pub use storage::{MalformedReporter, NimbusMessagingStorage};
pub use store::{MessagingAction, MessagingMiddleware, MessagingState, MessagingStore, reduce};
