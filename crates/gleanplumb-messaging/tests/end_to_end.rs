// SPDX-FileCopyrightText: 2026 Gleanplumb Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Full pipeline over the on-disk metadata file and the real expression helper.

use std::collections::BTreeMap;
use std::sync::Arc;

use gleanplumb_core::{
    MessageSurfaceId, MessagingFeatureConfig, MetadataStorage, PluginAdapter, TelemetryEvent,
};
use gleanplumb_messaging::{
    ConfiguredFeature, JexlHelperFactory, MessagingAction, MessagingMiddleware, MessagingStore,
    NimbusMessagingController, NimbusMessagingStorage, telemetry_reporter,
};
use gleanplumb_storage::backend::JsonFileBackend;
use gleanplumb_storage::cached::CachedMetadataStorage;
use gleanplumb_test_utils::RecordingTelemetry;
use serde_json::json;

fn feature_value() -> MessagingFeatureConfig {
    serde_json::from_value(json!({
        "triggers": {
            "always": "true",
            "not-default": "!is_default_browser",
            "english": "'en' in locale",
        },
        "actions": {
            "make-default": "://settings_default_browser",
        },
        "styles": {
            "urgent": {"priority": 100, "max-display-count": 2},
        },
        "messages": {
            "default-browser": {
                "action": "make-default",
                "style": "urgent",
                "trigger": ["not-default", "english"],
                "text": "Make it your default browser",
            },
            "learn-more": {
                "action": "https://example.org/learn?id={uuid}",
                "trigger": ["always"],
                "text": "Learn more",
            },
            "broken": {
                "action": "missing-action",
                "trigger": ["always"],
            },
            "bad-trigger": {
                "action": "make-default",
                "trigger": ["nope"],
            },
        },
    }))
    .expect("feature value should parse")
}

struct Stack {
    store: MessagingStore,
    controller: Arc<NimbusMessagingController>,
    metadata: Arc<CachedMetadataStorage<JsonFileBackend>>,
    telemetry: RecordingTelemetry,
}

fn stack(path: &std::path::Path, is_default_browser: bool) -> Stack {
    let telemetry = RecordingTelemetry::new();
    let metadata = Arc::new(CachedMetadataStorage::new(JsonFileBackend::new(path)));
    let attributes = BTreeMap::from([
        ("is_default_browser".to_string(), json!(is_default_browser)),
        ("locale".to_string(), json!("en-US")),
    ]);
    let storage = Arc::new(NimbusMessagingStorage::new(
        metadata.clone(),
        telemetry_reporter(Arc::new(telemetry.clone())),
        Arc::new(JexlHelperFactory::new("1.0.0", &attributes)),
        Arc::new(ConfiguredFeature::new(
            feature_value(),
            Arc::new(telemetry.clone()),
        )),
    ));
    let controller = Arc::new(NimbusMessagingController::new(
        storage.clone(),
        Arc::new(telemetry.clone()),
        "fenix",
    ));
    let store = MessagingStore::new(MessagingMiddleware::new(storage, controller.clone()));
    Stack {
        store,
        controller,
        metadata,
        telemetry,
    }
}

#[tokio::test]
async fn displays_expire_and_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nimbus_messages_metadata.json");

    let s = stack(&path, false);
    s.store.dispatch(MessagingAction::Restore).await.unwrap();
    let ids: Vec<String> = s.store.state().messages.iter().map(|m| m.id.clone()).collect();
    assert_eq!(ids, vec!["default-browser", "learn-more"]);
    assert_eq!(s.telemetry.count("malformed"), 2);

    for _ in 0..2 {
        s.store
            .dispatch(MessagingAction::Evaluate(MessageSurfaceId::Homescreen))
            .await
            .unwrap();
    }
    assert_eq!(s.telemetry.count("message_shown"), 2);
    assert_eq!(s.telemetry.count("message_expired"), 1);
    let state = s.store.state();
    assert_eq!(state.messages.len(), 1);
    assert!(state.message_to_show.is_empty());
    s.metadata.shutdown().await.unwrap();

    let restarted = stack(&path, false);
    let stored = restarted.metadata.get_metadata().await.unwrap();
    assert_eq!(stored["default-browser"].display_count, 2);
    // A message at its budget is listed again until its next display.
    restarted.store.dispatch(MessagingAction::Restore).await.unwrap();
    let ids: Vec<String> = restarted
        .store
        .state()
        .messages
        .into_iter()
        .map(|m| m.id)
        .collect();
    assert_eq!(ids, vec!["default-browser", "learn-more"]);
}

#[tokio::test]
async fn triggers_are_evaluated_against_attributes() {
    let dir = tempfile::tempdir().unwrap();
    let s = stack(&dir.path().join("metadata.json"), true);
    s.store.dispatch(MessagingAction::Restore).await.unwrap();

    s.store
        .dispatch(MessagingAction::Evaluate(MessageSurfaceId::Homescreen))
        .await
        .unwrap();

    assert_eq!(
        s.store.state().message_to_show[&MessageSurfaceId::Homescreen].id,
        "learn-more"
    );
}

#[tokio::test]
async fn click_formats_uuid_into_the_action() {
    let dir = tempfile::tempdir().unwrap();
    let s = stack(&dir.path().join("metadata.json"), true);
    let message = s
        .controller
        .get_message("learn-more")
        .await
        .unwrap()
        .expect("message should be eligible");

    let uri = s.controller.process_message_action_to_uri(&message).unwrap();

    assert!(uri.starts_with("fenix://open?url=https%3A%2F%2Fexample.org%2Flearn%3Fid%3D"));
    assert!(!uri.contains("uuid"));
    let clicked = s.telemetry.named("message_clicked");
    assert!(matches!(
        &clicked[0],
        TelemetryEvent::MessageClicked { action_uuid: Some(_), .. }
    ));
}

#[tokio::test]
async fn deeply_nested_trigger_makes_its_message_ineligible() {
    let deep = format!("{}true{}", "(".repeat(5000), ")".repeat(5000));
    let value: MessagingFeatureConfig = serde_json::from_value(json!({
        "triggers": {"deep": deep, "always": "true"},
        "actions": {"open": "://open"},
        "styles": {"urgent": {"priority": 100}},
        "messages": {
            "nested": {"action": "open", "style": "urgent", "trigger": ["deep"]},
            "plain": {"action": "open", "trigger": ["always"]},
        },
    }))
    .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let telemetry = RecordingTelemetry::new();
    let storage = NimbusMessagingStorage::new(
        Arc::new(CachedMetadataStorage::new(JsonFileBackend::new(
            dir.path().join("metadata.json"),
        ))),
        telemetry_reporter(Arc::new(telemetry.clone())),
        Arc::new(JexlHelperFactory::new("1.0.0", &BTreeMap::new())),
        Arc::new(ConfiguredFeature::new(value, Arc::new(telemetry.clone()))),
    );

    let messages = storage.get_messages().await.unwrap();
    assert_eq!(messages[0].id, "nested");
    let next = storage
        .get_next_message(MessageSurfaceId::Homescreen, &messages)
        .unwrap()
        .expect("the plain message should be picked");

    assert_eq!(next.id, "plain");
    assert_eq!(telemetry.count("malformed"), 1);
    assert_eq!(storage.malformed_keys(), vec![deep]);
}
