// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Messaging state, actions, and the store that applies them.
//!
//! Every dispatched action first passes through [`MessagingMiddleware`],
//! which talks to the messaging storage and controller, and then through the
//! pure [`reduce`] function. Actions the middleware dispatches on its own are
//! reduced directly. Dispatches run one at a time, so a middleware step never
//! observes another action's half-applied changes.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tracing::debug;

use gleanplumb_core::{Message, MessageSurfaceId, PlumbError};

use crate::controller::NimbusMessagingController;
use crate::storage::NimbusMessagingStorage;

/// Messages known to the UI and the message currently shown per surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessagingState {
    pub messages: Vec<Message>,
    pub message_to_show: HashMap<MessageSurfaceId, Message>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagingAction {
    /// Reload the eligible messages from storage.
    Restore,
    /// Pick and display the next message for a surface.
    Evaluate(MessageSurfaceId),
    UpdateMessageToShow(Message),
    ConsumeMessageToShow(MessageSurfaceId),
    UpdateMessages(Vec<Message>),
    MessageClicked(Message),
    MessageDismissed(Message),
}

/// Applies `action` to `state`. Side-effecting actions leave it unchanged.
pub fn reduce(state: &mut MessagingState, action: MessagingAction) {
    match action {
        MessagingAction::UpdateMessageToShow(message) => {
            state.message_to_show.insert(message.surface(), message);
        }
        MessagingAction::ConsumeMessageToShow(surface) => {
            state.message_to_show.remove(&surface);
        }
        MessagingAction::UpdateMessages(messages) => state.messages = messages,
        MessagingAction::Restore
        | MessagingAction::Evaluate(_)
        | MessagingAction::MessageClicked(_)
        | MessagingAction::MessageDismissed(_) => {}
    }
}

/// Holds [`MessagingState`] and runs actions through the middleware.
///
/// State changes are published on a watch channel; see [`MessagingStore::subscribe`].
pub struct MessagingStore {
    state: watch::Sender<MessagingState>,
    middleware: MessagingMiddleware,
    dispatch_lock: Mutex<()>,
}

impl MessagingStore {
    pub fn new(middleware: MessagingMiddleware) -> Self {
        let (state, _) = watch::channel(MessagingState::default());
        Self {
            state,
            middleware,
            dispatch_lock: Mutex::new(()),
        }
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> MessagingState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MessagingState> {
        self.state.subscribe()
    }

    /// Runs `action` through the middleware and the reducer. Waits for any
    /// dispatch already in progress.
    pub async fn dispatch(&self, action: MessagingAction) -> Result<(), PlumbError> {
        let _guard = self.dispatch_lock.lock().await;
        self.middleware.handle(self, &action).await?;
        self.apply(action);
        Ok(())
    }

    /// Reduces `action` without running the middleware.
    pub(crate) fn apply(&self, action: MessagingAction) {
        debug!(?action, "reducing messaging action");
        self.state.send_modify(|state| reduce(state, action));
    }
}

/// Side effects of messaging actions.
pub struct MessagingMiddleware {
    storage: Arc<NimbusMessagingStorage>,
    controller: Arc<NimbusMessagingController>,
}

impl MessagingMiddleware {
    pub fn new(
        storage: Arc<NimbusMessagingStorage>,
        controller: Arc<NimbusMessagingController>,
    ) -> Self {
        Self {
            storage,
            controller,
        }
    }

    async fn handle(&self, store: &MessagingStore, action: &MessagingAction) -> Result<(), PlumbError> {
        match action {
            MessagingAction::Restore => {
                let messages = self.storage.get_messages().await?;
                store.apply(MessagingAction::UpdateMessages(messages));
            }
            MessagingAction::Evaluate(surface) => {
                let messages = store.state().messages;
                match self.storage.get_next_message(*surface, &messages)? {
                    Some(next) => {
                        store.apply(MessagingAction::UpdateMessageToShow(next.clone()));
                        self.on_message_displayed(store, &next).await?;
                    }
                    None => store.apply(MessagingAction::ConsumeMessageToShow(*surface)),
                }
            }
            MessagingAction::MessageClicked(message) => {
                self.controller.on_message_clicked(&message.metadata).await?;
                self.retire(store, message);
            }
            MessagingAction::MessageDismissed(message) => {
                self.controller
                    .on_message_dismissed(&message.metadata)
                    .await?;
                self.retire(store, message);
            }
            MessagingAction::UpdateMessageToShow(_)
            | MessagingAction::ConsumeMessageToShow(_)
            | MessagingAction::UpdateMessages(_) => {}
        }
        Ok(())
    }

    /// Counts a display of `message`. A message that is now expired leaves
    /// the list; otherwise it is replaced by its updated copy.
    pub async fn on_message_displayed(
        &self,
        store: &MessagingStore,
        message: &Message,
    ) -> Result<(), PlumbError> {
        let updated = self.controller.process_displayed_message(message).await?;
        let messages = if updated.is_expired() {
            self.consume_message_to_show_if_needed(store, message);
            self.remove_message(store, message)
        } else {
            self.update_message(store, message, updated)
        };
        store.apply(MessagingAction::UpdateMessages(messages));
        Ok(())
    }

    fn retire(&self, store: &MessagingStore, message: &Message) {
        let messages = self.remove_message(store, message);
        store.apply(MessagingAction::UpdateMessages(messages));
        self.consume_message_to_show_if_needed(store, message);
    }

    /// The current list without `message`.
    pub fn remove_message(&self, store: &MessagingStore, message: &Message) -> Vec<Message> {
        store
            .state()
            .messages
            .into_iter()
            .filter(|m| m.id != message.id)
            .collect()
    }

    /// Clears the shown message of `message`'s surface if it is `message`.
    pub fn consume_message_to_show_if_needed(&self, store: &MessagingStore, message: &Message) {
        let shown = store
            .state()
            .message_to_show
            .get(&message.surface())
            .is_some_and(|m| m.id == message.id);
        if shown {
            store.apply(MessagingAction::ConsumeMessageToShow(message.surface()));
        }
    }

    /// The current list with `old` replaced by `updated`, keeping its position.
    /// A list without `old` is returned unchanged.
    ///
    /// The shown message is refreshed too when it is `old`.
    pub fn update_message(
        &self,
        store: &MessagingStore,
        old: &Message,
        updated: Message,
    ) -> Vec<Message> {
        let state = store.state();
        if state
            .message_to_show
            .get(&updated.surface())
            .is_some_and(|m| m.id == old.id)
        {
            store.apply(MessagingAction::UpdateMessageToShow(updated.clone()));
        }

        let mut messages = state.messages;
        if let Some(slot) = messages.iter_mut().find(|m| m.id == old.id) {
            *slot = updated;
        }
        messages
    }
}

#[cfg(test)]
mod tests {
    use gleanplumb_core::MessageData;
    use gleanplumb_test_utils::fixtures::{message, on_surface, style};

    use super::*;

    fn state_with(messages: Vec<Message>) -> MessagingState {
        MessagingState {
            messages,
            message_to_show: HashMap::new(),
        }
    }

    #[test]
    fn reducer_updates_and_consumes_message_to_show() {
        let home = message("home", MessageData::default(), "a", style(1, 5));
        let note = message(
            "note",
            on_surface(MessageData::default(), MessageSurfaceId::Notification),
            "a",
            style(1, 5),
        );
        let mut state = MessagingState::default();

        reduce(&mut state, MessagingAction::UpdateMessageToShow(home.clone()));
        reduce(&mut state, MessagingAction::UpdateMessageToShow(note.clone()));
        assert_eq!(state.message_to_show[&MessageSurfaceId::Homescreen], home);
        assert_eq!(state.message_to_show[&MessageSurfaceId::Notification], note);

        reduce(
            &mut state,
            MessagingAction::ConsumeMessageToShow(MessageSurfaceId::Homescreen),
        );
        assert!(!state.message_to_show.contains_key(&MessageSurfaceId::Homescreen));
        assert!(state.message_to_show.contains_key(&MessageSurfaceId::Notification));
    }

    #[test]
    fn reducer_replaces_message_list() {
        let m = message("m", MessageData::default(), "a", style(1, 5));
        let mut state = MessagingState::default();
        reduce(&mut state, MessagingAction::UpdateMessages(vec![m.clone()]));
        assert_eq!(state, state_with(vec![m]));
    }

    #[test]
    fn side_effect_actions_leave_state_unchanged() {
        let m = message("m", MessageData::default(), "a", style(1, 5));
        let before = state_with(vec![m.clone()]);
        for action in [
            MessagingAction::Restore,
            MessagingAction::Evaluate(MessageSurfaceId::Homescreen),
            MessagingAction::MessageClicked(m.clone()),
            MessagingAction::MessageDismissed(m.clone()),
        ] {
            let mut state = before.clone();
            reduce(&mut state, action);
            assert_eq!(state, before);
        }
    }
}
