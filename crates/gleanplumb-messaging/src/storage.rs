// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message eligibility and selection.
//!
//! [`NimbusMessagingStorage`] joins the feature value (triggers, styles,
//! actions, raw messages) with persisted metadata, drops messages that are
//! malformed or used up, and picks the next message for a surface.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use gleanplumb_core::{
    ControlMessageBehavior, FeatureHolder, HelperFactory, Message, MessageHelper, MessageKind,
    MessageSurfaceId, Metadata, MetadataStorage, PlumbError, StyleData, CONTROL_ACTION,
};

/// Callback invoked with a message id the first time one of its keys is found malformed.
pub type MalformedReporter = Arc<dyn Fn(&str) + Send + Sync>;

/// Builds the eligible message list and selects the next message to show.
pub struct NimbusMessagingStorage {
    metadata_storage: Arc<dyn MetadataStorage>,
    report_malformed: MalformedReporter,
    helper_factory: Arc<dyn HelperFactory>,
    feature: Arc<dyn FeatureHolder>,
    /// Malformed key (action, trigger key, or trigger expression) to the id
    /// of the message it was first seen in.
    malformed: Mutex<HashMap<String, String>>,
}

impl NimbusMessagingStorage {
    pub fn new(
        metadata_storage: Arc<dyn MetadataStorage>,
        report_malformed: MalformedReporter,
        helper_factory: Arc<dyn HelperFactory>,
        feature: Arc<dyn FeatureHolder>,
    ) -> Self {
        Self {
            metadata_storage,
            report_malformed,
            helper_factory,
            feature,
            malformed: Mutex::new(HashMap::new()),
        }
    }

    /// The feature value this storage reads from.
    pub fn feature(&self) -> &Arc<dyn FeatureHolder> {
        &self.feature
    }

    /// Returns every message that is well formed and still displayable,
    /// highest priority first.
    ///
    /// Messages seen for the first time get fresh metadata persisted.
    /// Messages of equal priority keep their id order.
    pub async fn get_messages(&self) -> Result<Vec<Message>, PlumbError> {
        let feature = self.feature.value();
        let stored = self.metadata_storage.get_metadata().await?;
        let default_style = StyleData::default();

        let mut messages = Vec::with_capacity(feature.messages.len());
        for (id, data) in &feature.messages {
            let Some(action) = self.sanitize_action(id, &data.action, &feature.actions, data.kind)
            else {
                continue;
            };
            let Some(triggers) = self.sanitize_triggers(id, &data.trigger, &feature.triggers)
            else {
                continue;
            };
            let style = feature
                .styles
                .get(&data.style)
                .cloned()
                .unwrap_or_else(|| default_style.clone());
            let metadata = match stored.get(id) {
                Some(metadata) => metadata.clone(),
                None => {
                    self.metadata_storage
                        .add_metadata(Metadata::new(id.clone()))
                        .await?
                }
            };

            messages.push(Message {
                id: id.clone(),
                data: data.clone(),
                action,
                style,
                triggers,
                metadata,
            });
        }

        messages.retain(|m| {
            m.metadata.display_count <= m.max_display_count()
                && !m.metadata.dismissed
                && !m.metadata.pressed
        });
        messages.sort_by(|a, b| b.style.priority.cmp(&a.style.priority));

        debug!(count = messages.len(), "eligible messages built");
        Ok(messages)
    }

    /// Picks the first message for `surface` whose triggers all hold.
    ///
    /// When the pick is under experiment, an exposure is recorded. A control
    /// message is never returned: depending on the `on-control` setting the
    /// next eligible normal message is returned instead, or nothing.
    pub fn get_next_message(
        &self,
        surface: MessageSurfaceId,
        available: &[Message],
    ) -> Result<Option<Message>, PlumbError> {
        let feature = self.feature.value();
        let helper = self.helper_factory.create_message_helper()?;
        let mut cache = HashMap::new();

        let mut on_surface = available.iter().filter(|m| m.surface() == surface);
        let Some(candidate) =
            on_surface.find(|m| self.is_message_eligible(m, helper.as_ref(), &mut cache))
        else {
            return Ok(None);
        };

        if !self.is_message_under_experiment(candidate, feature.message_under_experiment.as_deref())
        {
            return Ok(Some(candidate.clone()));
        }

        self.feature.record_exposure();
        debug!(message_id = %candidate.id, "experiment exposure recorded");

        match candidate.kind() {
            MessageKind::Normal => Ok(Some(candidate.clone())),
            MessageKind::Control => match feature.on_control {
                ControlMessageBehavior::ShowNextMessage => Ok(available
                    .iter()
                    .filter(|m| m.surface() == surface && !m.kind().is_control())
                    .find(|m| self.is_message_eligible(m, helper.as_ref(), &mut cache))
                    .cloned()),
                ControlMessageBehavior::ShowNone => Ok(None),
            },
        }
    }

    /// Formats `action` through the expression helper, generating a UUID
    /// when the action asks for one. Returns the UUID alongside the result.
    pub fn generate_uuid_and_format_action(
        &self,
        action: &str,
    ) -> Result<(Option<String>, String), PlumbError> {
        let helper = self.helper_factory.create_message_helper()?;
        let uuid = helper.get_uuid(action);
        let formatted = helper.string_format(action, uuid.as_deref());
        Ok((uuid, formatted))
    }

    pub async fn update_metadata(&self, metadata: Metadata) -> Result<(), PlumbError> {
        self.metadata_storage.update_metadata(metadata).await
    }

    /// Resolves a raw action into a URL or deep-link template.
    ///
    /// URLs pass through. Control messages get [`CONTROL_ACTION`]. Anything
    /// else must name a non-blank entry in `actions`.
    pub fn sanitize_action(
        &self,
        message_id: &str,
        unsafe_action: &str,
        actions: &BTreeMap<String, String>,
        kind: MessageKind,
    ) -> Option<String> {
        if unsafe_action.starts_with("http") {
            return Some(unsafe_action.to_string());
        }
        if kind.is_control() {
            return Some(CONTROL_ACTION.to_string());
        }
        match actions.get(unsafe_action) {
            Some(action) if !action.trim().is_empty() => Some(action.clone()),
            _ => {
                self.report_once(unsafe_action, message_id);
                None
            }
        }
    }

    /// Resolves trigger keys into expressions. One unknown or blank key
    /// makes the whole list unusable.
    pub fn sanitize_triggers(
        &self,
        message_id: &str,
        unsafe_triggers: &[String],
        triggers: &BTreeMap<String, String>,
    ) -> Option<Vec<String>> {
        let mut resolved = Vec::with_capacity(unsafe_triggers.len());
        for key in unsafe_triggers {
            match triggers.get(key) {
                Some(expression) if !expression.trim().is_empty() => {
                    resolved.push(expression.clone())
                }
                _ => {
                    self.report_once(key, message_id);
                    return None;
                }
            }
        }
        Some(resolved)
    }

    /// True when every trigger of `message` evaluates to true.
    ///
    /// Results are memoised in `cache` for the duration of one selection. An
    /// expression that fails to evaluate is reported, remembered as
    /// malformed, and never evaluated again.
    pub fn is_message_eligible(
        &self,
        message: &Message,
        helper: &dyn MessageHelper,
        cache: &mut HashMap<String, bool>,
    ) -> bool {
        message.triggers.iter().all(|expression| {
            if self.malformed().contains_key(expression) {
                return false;
            }
            if let Some(result) = cache.get(expression) {
                return *result;
            }
            match helper.eval_jexl(expression) {
                Ok(result) => {
                    cache.insert(expression.clone(), result);
                    result
                }
                Err(e) => {
                    warn!(message_id = %message.id, error = %e, "trigger evaluation failed");
                    (self.report_malformed)(&message.id);
                    self.malformed()
                        .insert(expression.clone(), message.id.clone());
                    false
                }
            }
        })
    }

    /// Whether `message` takes part in the running experiment.
    ///
    /// Control messages always do. Otherwise `expression` must equal the id,
    /// or end in `-` and be a prefix of it.
    pub fn is_message_under_experiment(&self, message: &Message, expression: Option<&str>) -> bool {
        match message.kind() {
            MessageKind::Control => true,
            MessageKind::Normal => match expression {
                Some(expr) if expr.trim().is_empty() => false,
                Some(expr) if expr.ends_with('-') => message.id.starts_with(expr),
                Some(expr) => message.id == expr,
                None => false,
            },
        }
    }

    /// Keys currently remembered as malformed.
    pub fn malformed_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.malformed().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Remembers `key` as malformed without reporting it.
    pub fn mark_malformed(&self, key: &str, message_id: &str) {
        self.malformed()
            .insert(key.to_string(), message_id.to_string());
    }

    fn report_once(&self, key: &str, message_id: &str) {
        let first_time = !self.malformed().contains_key(key);
        if first_time {
            warn!(message_id = %message_id, key = %key, "malformed message");
            (self.report_malformed)(message_id);
        }
        self.mark_malformed(key, message_id);
    }

    fn malformed(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.malformed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use gleanplumb_core::MessagingFeatureConfig;
    use gleanplumb_test_utils::fixtures::{
        control, feature, message, message_data, on_surface, sample_feature, style,
    };
    use gleanplumb_test_utils::{InMemoryMetadataStorage, ScriptedHelperFactory, StaticFeature};

    use super::*;

    struct Fixture {
        storage: NimbusMessagingStorage,
        metadata: Arc<InMemoryMetadataStorage>,
        feature: StaticFeature,
        reports: Arc<AtomicUsize>,
    }

    fn fixture_with(
        value: MessagingFeatureConfig,
        metadata: Vec<Metadata>,
        helper: ScriptedHelperFactory,
    ) -> Fixture {
        let metadata = Arc::new(InMemoryMetadataStorage::with_records(metadata));
        let feature = StaticFeature::new(value);
        let reports = Arc::new(AtomicUsize::new(0));
        let counter = reports.clone();
        let storage = NimbusMessagingStorage::new(
            metadata.clone(),
            Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
            Arc::new(helper),
            Arc::new(feature.clone()),
        );
        Fixture {
            storage,
            metadata,
            feature,
            reports,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(
            sample_feature(),
            vec![Metadata::new("message-1")],
            ScriptedHelperFactory::new(),
        )
    }

    fn actions() -> BTreeMap<String, String> {
        BTreeMap::from([("action-1".to_string(), "action-1-url".to_string())])
    }

    fn triggers() -> BTreeMap<String, String> {
        BTreeMap::from([("trigger-1".to_string(), "trigger-1-expression".to_string())])
    }

    #[tokio::test]
    async fn malformed_message_is_skipped_and_reported() {
        let f = fixture();
        let messages = f.storage.get_messages().await.unwrap();

        let ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["message-1", "message-2"]);
        assert_eq!(messages[0].metadata.id, "message-1");
        assert_eq!(messages[0].action, "action-1-url");
        assert_eq!(messages[0].triggers, vec!["trigger-1-expression"]);
        assert_eq!(f.reports.load(Ordering::SeqCst), 1);

        f.storage.get_messages().await.unwrap();
        assert_eq!(f.reports.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unseen_messages_get_fresh_metadata() {
        let f = fixture();
        f.storage.get_messages().await.unwrap();

        let writes = f.metadata.writes().await;
        assert_eq!(writes, vec![Metadata::new("message-2")]);
    }

    #[tokio::test]
    async fn messages_are_sorted_by_priority() {
        let value = feature(
            &[
                ("low-message", message_data("action-1", "low", &["trigger-1"])),
                ("high-message", message_data("action-1", "high", &["trigger-1"])),
                ("medium-message", message_data("action-1", "medium", &["trigger-1"])),
            ],
            &[("high", style(100, 5)), ("medium", style(50, 5)), ("low", style(1, 5))],
        );
        let f = fixture_with(value, vec![], ScriptedHelperFactory::new());

        let ids: Vec<String> = f
            .storage
            .get_messages()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec!["high-message", "medium-message", "low-message"]);
    }

    #[tokio::test]
    async fn pressed_dismissed_and_used_up_messages_are_filtered() {
        let value = feature(
            &[
                ("pressed", message_data("action-1", "s", &["trigger-1"])),
                ("dismissed", message_data("action-1", "s", &["trigger-1"])),
                ("shown-many-times", message_data("action-1", "s", &["trigger-1"])),
                ("at-limit", message_data("action-1", "s", &["trigger-1"])),
                ("normal", message_data("action-1", "s", &["trigger-1"])),
            ],
            &[("s", style(100, 2))],
        );
        let metadata = vec![
            Metadata {
                pressed: true,
                ..Metadata::new("pressed")
            },
            Metadata {
                dismissed: true,
                ..Metadata::new("dismissed")
            },
            Metadata {
                display_count: 10,
                ..Metadata::new("shown-many-times")
            },
            Metadata {
                display_count: 2,
                ..Metadata::new("at-limit")
            },
            Metadata::new("normal"),
        ];
        let f = fixture_with(value, metadata, ScriptedHelperFactory::new());

        let ids: Vec<String> = f
            .storage
            .get_messages()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec!["at-limit", "normal"]);
    }

    #[tokio::test]
    async fn unknown_style_falls_back_to_default() {
        let value = feature(
            &[("m", message_data("https://example.org", "missing", &[]))],
            &[],
        );
        let f = fixture_with(value, vec![], ScriptedHelperFactory::new());
        let messages = f.storage.get_messages().await.unwrap();
        assert_eq!(messages[0].style, StyleData::default());
        assert_eq!(messages[0].action, "https://example.org");
    }

    #[test]
    fn malformed_actions_are_rejected() {
        let f = fixture();
        let actions = actions();
        let kind = MessageKind::Normal;

        assert_eq!(f.storage.sanitize_action("id", "no-found-action", &actions, kind), None);
        assert_eq!(f.storage.sanitize_action("id", "", &actions, kind), None);
        assert_eq!(f.storage.sanitize_action("id", " ", &actions, kind), None);
        assert_eq!(f.reports.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn blank_action_value_is_malformed() {
        let f = fixture();
        let actions = BTreeMap::from([("blank".to_string(), "  ".to_string())]);
        assert_eq!(
            f.storage
                .sanitize_action("id", "blank", &actions, MessageKind::Normal),
            None
        );
        assert_eq!(f.storage.malformed_keys(), vec!["blank"]);
    }

    #[test]
    fn previously_malformed_action_is_not_reported_again() {
        let f = fixture();
        f.storage.mark_malformed("malformed-action", "id");

        let action =
            f.storage
                .sanitize_action("id", "malformed-action", &actions(), MessageKind::Normal);
        assert_eq!(action, None);
        assert_eq!(f.reports.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn valid_and_url_actions_resolve() {
        let f = fixture();
        let kind = MessageKind::Normal;
        assert_eq!(
            f.storage
                .sanitize_action("id", "action-1", &actions(), kind)
                .as_deref(),
            Some("action-1-url")
        );
        assert_eq!(
            f.storage
                .sanitize_action("id", "http://example.org", &actions(), kind)
                .as_deref(),
            Some("http://example.org")
        );
    }

    #[test]
    fn control_message_gets_control_action() {
        let f = fixture();
        let action = f
            .storage
            .sanitize_action("id", "", &actions(), MessageKind::Control);
        assert_eq!(action.as_deref(), Some(CONTROL_ACTION));
        assert_eq!(f.reports.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn malformed_triggers_are_rejected() {
        let f = fixture();
        let triggers = triggers();

        assert_eq!(
            f.storage
                .sanitize_triggers("id", &["no-found-trigger".into()], &triggers),
            None
        );
        assert_eq!(f.storage.sanitize_triggers("id", &["".into()], &triggers), None);
        assert_eq!(f.storage.sanitize_triggers("id", &[" ".into()], &triggers), None);
        assert_eq!(f.reports.load(Ordering::SeqCst), 3);
        assert!(f.storage.malformed_keys().contains(&" ".to_string()));
    }

    #[test]
    fn previously_malformed_trigger_is_not_reported_again() {
        let f = fixture();
        f.storage.mark_malformed(" ", "id");
        assert_eq!(
            f.storage.sanitize_triggers("id", &[" ".into()], &triggers()),
            None
        );
        assert_eq!(f.reports.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn valid_triggers_resolve_to_expressions() {
        let f = fixture();
        assert_eq!(
            f.storage
                .sanitize_triggers("id", &["trigger-1".into()], &triggers()),
            Some(vec!["trigger-1-expression".to_string()])
        );
    }

    #[test]
    fn experiment_matching() {
        let f = fixture();
        let normal = |id: &str| message(id, message_data("a", "s", &[]), "a", style(1, 5));

        assert!(!f.storage.is_message_under_experiment(&normal("id"), None));
        assert!(!f.storage.is_message_under_experiment(&normal("id"), Some(" ")));
        assert!(f.storage.is_message_under_experiment(&normal("end-"), Some("end-")));
        assert!(f.storage.is_message_under_experiment(&normal("end-1"), Some("end-")));
        assert!(f.storage.is_message_under_experiment(&normal("same-id"), Some("same-id")));
        assert!(!f.storage.is_message_under_experiment(&normal("same-id-2"), Some("same-id")));

        let ctrl = message("c", control(message_data("a", "s", &[])), "a", style(1, 5));
        assert!(f.storage.is_message_under_experiment(&ctrl, None));
    }

    #[test]
    fn eligibility_follows_evaluation() {
        let helper = ScriptedHelperFactory::new().with_result("trigger", true);
        let f = fixture_with(sample_feature(), vec![], helper.clone());
        let m = message("same-id", message_data("a", "s", &[]), "a", style(1, 5));
        let h = helper.create_message_helper().unwrap();

        assert!(f.storage.is_message_eligible(&m, h.as_ref(), &mut HashMap::new()));
    }

    #[test]
    fn failed_evaluation_is_reported_and_remembered() {
        let helper = ScriptedHelperFactory::new().with_failure("trigger");
        let f = fixture_with(sample_feature(), vec![], helper.clone());
        let m = message("same-id", message_data("a", "s", &[]), "a", style(1, 5));
        let h = helper.create_message_helper().unwrap();

        assert!(!f.storage.is_message_eligible(&m, h.as_ref(), &mut HashMap::new()));
        assert_eq!(f.storage.malformed_keys(), vec!["trigger"]);
        assert_eq!(f.reports.load(Ordering::SeqCst), 1);

        assert!(!f.storage.is_message_eligible(&m, h.as_ref(), &mut HashMap::new()));
        assert_eq!(helper.evaluation_count("trigger"), 1);
        assert_eq!(f.reports.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn previously_malformed_trigger_is_not_evaluated() {
        let helper = ScriptedHelperFactory::new().with_failure("trigger");
        let f = fixture_with(sample_feature(), vec![], helper.clone());
        f.storage.mark_malformed("trigger", "same-id");
        let m = message("same-id", message_data("a", "s", &[]), "a", style(1, 5));
        let h = helper.create_message_helper().unwrap();

        assert!(!f.storage.is_message_eligible(&m, h.as_ref(), &mut HashMap::new()));
        assert_eq!(helper.evaluation_count("trigger"), 0);
        assert_eq!(f.reports.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn evaluations_are_cached_within_one_selection() {
        let helper = ScriptedHelperFactory::new().with_result("trigger", false);
        let f = fixture_with(sample_feature(), vec![], helper.clone());
        let first = message("a", message_data("x", "s", &[]), "x", style(1, 5));
        let second = message("b", message_data("x", "s", &[]), "x", style(1, 5));

        let next = f
            .storage
            .get_next_message(MessageSurfaceId::Homescreen, &[first, second])
            .unwrap();
        assert_eq!(next, None);
        assert_eq!(helper.evaluation_count("trigger"), 1);
    }

    #[test]
    fn no_eligible_message_yields_none() {
        let helper = ScriptedHelperFactory::new().default_result(false);
        let f = fixture_with(sample_feature(), vec![], helper);
        let m = message("same-id", message_data("a", "s", &[]), "a", style(1, 5));

        let next = f
            .storage
            .get_next_message(MessageSurfaceId::Homescreen, &[m])
            .unwrap();
        assert_eq!(next, None);
    }

    #[test]
    fn eligible_message_is_returned_without_exposure() {
        let f = fixture();
        let m = message("same-id", message_data("a", "s", &[]), "a", style(1, 5));

        let next = f
            .storage
            .get_next_message(MessageSurfaceId::Homescreen, &[m.clone()])
            .unwrap();
        assert_eq!(next, Some(m));
        assert_eq!(f.feature.exposures(), 0);
    }

    #[test]
    fn other_surfaces_are_ignored() {
        let f = fixture();
        let m = message(
            "n",
            on_surface(message_data("a", "s", &[]), MessageSurfaceId::Notification),
            "a",
            style(1, 5),
        );
        assert_eq!(
            f.storage
                .get_next_message(MessageSurfaceId::Homescreen, &[m.clone()])
                .unwrap(),
            None
        );
        assert_eq!(
            f.storage
                .get_next_message(MessageSurfaceId::Notification, &[m.clone()])
                .unwrap(),
            Some(m)
        );
    }

    #[test]
    fn message_under_experiment_records_exposure() {
        let value = MessagingFeatureConfig {
            message_under_experiment: Some("same-id".into()),
            ..sample_feature()
        };
        let f = fixture_with(value, vec![], ScriptedHelperFactory::new());
        let m = message("same-id", message_data("a", "s", &[]), "a", style(1, 5));

        let next = f
            .storage
            .get_next_message(MessageSurfaceId::Homescreen, &[m.clone()])
            .unwrap();
        assert_eq!(next, Some(m));
        assert_eq!(f.feature.exposures(), 1);
    }

    #[test]
    fn control_message_yields_next_normal_message() {
        let f = fixture();
        let ctrl = message("control-id", control(message_data("a", "s", &[])), "a", style(1, 5));
        let normal = message("id", message_data("a", "s", &[]), "a", style(1, 5));

        let next = f
            .storage
            .get_next_message(MessageSurfaceId::Homescreen, &[ctrl, normal.clone()])
            .unwrap();
        assert_eq!(next, Some(normal));
        assert_eq!(f.feature.exposures(), 1);
    }

    #[test]
    fn control_message_with_show_none_yields_nothing() {
        let value = MessagingFeatureConfig {
            on_control: ControlMessageBehavior::ShowNone,
            ..sample_feature()
        };
        let f = fixture_with(value, vec![], ScriptedHelperFactory::new());
        let ctrl = message("control-id", control(message_data("a", "s", &[])), "a", style(1, 5));
        let normal = message("id", message_data("a", "s", &[]), "a", style(1, 5));

        let next = f
            .storage
            .get_next_message(MessageSurfaceId::Homescreen, &[ctrl, normal])
            .unwrap();
        assert_eq!(next, None);
        assert_eq!(f.feature.exposures(), 1);
    }

    #[test]
    fn helper_creation_failure_propagates() {
        let f = fixture_with(sample_feature(), vec![], ScriptedHelperFactory::new().failing());
        assert!(f
            .storage
            .get_next_message(MessageSurfaceId::Homescreen, &[])
            .is_err());
        assert!(f.storage.generate_uuid_and_format_action("x").is_err());
    }

    #[test]
    fn action_formatting_returns_generated_uuid() {
        let helper = ScriptedHelperFactory::new().with_uuid("u-1");
        let f = fixture_with(sample_feature(), vec![], helper);

        let (uuid, action) = f
            .storage
            .generate_uuid_and_format_action("https://x.org?id={uuid}")
            .unwrap();
        assert_eq!(uuid.as_deref(), Some("u-1"));
        assert_eq!(action, "https://x.org?id=u-1");

        let (uuid, action) = f
            .storage
            .generate_uuid_and_format_action("https://x.org")
            .unwrap();
        assert_eq!(uuid, None);
        assert_eq!(action, "https://x.org");
    }

    #[tokio::test]
    async fn update_metadata_delegates() {
        let f = fixture();
        let metadata = Metadata {
            pressed: true,
            ..Metadata::new("message-1")
        };
        f.storage.update_metadata(metadata.clone()).await.unwrap();
        assert_eq!(f.metadata.last_write().await, Some(metadata));
    }
}
