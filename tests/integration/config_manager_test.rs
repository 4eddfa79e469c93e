//! Configuration Manager Integration Tests
//!
//! Two managers over clones of one `MemoryStore` stand in for two execution
//! contexts sharing the extension store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::json;
use summarizer_prompts::services::CONFIG_KEY;
use summarizer_prompts::{
    AppError, ConfigManager, ConfigStore, MemoryStore, PromptConfig, Scope, StoreChange,
    TemplateService,
};

use super::common::{eventually, tone_document};

fn manager_pair() -> (ConfigManager, ConfigManager, MemoryStore) {
    let store = MemoryStore::new();
    let a = ConfigManager::new(Arc::new(store.clone()));
    let b = ConfigManager::new(Arc::new(store.clone()));
    (a, b, store)
}

#[tokio::test]
async fn test_first_initialize_seeds_defaults() {
    let store = MemoryStore::new();
    let manager = ConfigManager::new(Arc::new(store.clone()));
    let config = manager.initialize().await.unwrap();

    let stored = store.get(CONFIG_KEY).await.unwrap().unwrap();
    let stored: PromptConfig = serde_json::from_value(stored).unwrap();
    assert!(stored.is_identical(&config));
    assert!(config.default_prompts.contains_key("selected_text"));
}

#[tokio::test]
async fn test_stored_document_is_normalized_on_load() {
    let store = MemoryStore::new();
    let mut document = tone_document();
    document["sharedParameters"]["tone"]
        .as_object_mut()
        .unwrap()
        .remove("type");
    document["sharedParameters"]["tone"]
        .as_object_mut()
        .unwrap()
        .remove("order");
    store.set(CONFIG_KEY, document).await.unwrap();

    let manager = ConfigManager::new(Arc::new(store.clone()));
    let config = manager.initialize().await.unwrap();
    let tone = &config.shared_parameters["tone"];
    assert_eq!(tone.order, Some(0));
    assert!(tone.kind.is_some());

    let stored = store.get(CONFIG_KEY).await.unwrap().unwrap();
    assert_eq!(stored["sharedParameters"]["tone"]["type"], json!("list"));
}

#[tokio::test]
async fn test_update_propagates_to_other_context() {
    let (a, b, _store) = manager_pair();
    a.initialize().await.unwrap();
    b.initialize().await.unwrap();

    let notified = Arc::new(AtomicUsize::new(0));
    let counter = notified.clone();
    let _subscription = b.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    TemplateService::new(a.clone())
        .update_base_template("general", "Rewritten.")
        .await
        .unwrap();

    let synced = eventually(|| {
        let b = b.clone();
        async move {
            b.get_config().await.unwrap().default_prompts["general"].base_template == "Rewritten."
        }
    })
    .await;
    assert!(synced);
    assert_eq!(notified.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_own_write_echo_does_not_renotify() {
    let (a, _b, _store) = manager_pair();
    a.initialize().await.unwrap();

    let notified = Arc::new(AtomicUsize::new(0));
    let counter = notified.clone();
    let _subscription = a.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let templates = TemplateService::new(a.clone());
    templates
        .update_base_template("general", "First.")
        .await
        .unwrap();
    templates
        .update_base_template("general", "Second.")
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    assert_eq!(notified.load(Ordering::SeqCst), 2);
    let config = a.get_config().await.unwrap();
    assert_eq!(config.default_prompts["general"].base_template, "Second.");
}

#[tokio::test]
async fn test_identical_write_from_other_context_is_not_announced() {
    let (a, b, store) = manager_pair();
    a.initialize().await.unwrap();
    b.initialize().await.unwrap();

    let notified = Arc::new(AtomicUsize::new(0));
    let counter = notified.clone();
    let _subscription = a.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let document = store.get(CONFIG_KEY).await.unwrap().unwrap();
    b.import_config(document.clone()).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(notified.load(Ordering::SeqCst), 0);

    let applied = a
        .apply_external_change(StoreChange::new(CONFIG_KEY, None, Some(document)))
        .await;
    assert!(!applied);
    assert_eq!(notified.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_rejected_import_changes_nothing() {
    let (a, b, store) = manager_pair();
    a.initialize().await.unwrap();
    b.initialize().await.unwrap();
    let before = store.get(CONFIG_KEY).await.unwrap();

    let mut document = tone_document();
    document["defaultPrompts"]["reddit"]
        .as_object_mut()
        .unwrap()
        .remove("baseTemplate");
    let err = a.import_config(document).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(ref msg) if msg.contains("reddit")));

    assert_eq!(store.get(CONFIG_KEY).await.unwrap(), before);
}

#[tokio::test]
async fn test_reset_restores_defaults_everywhere() {
    let (a, b, _store) = manager_pair();
    a.import_config(tone_document()).await.unwrap();
    b.initialize().await.unwrap();
    assert!(!b.get_config().await.unwrap().default_prompts.contains_key("pdf"));

    a.reset_config().await.unwrap();
    let synced = eventually(|| {
        let b = b.clone();
        async move { b.get_config().await.unwrap().default_prompts.contains_key("pdf") }
    })
    .await;
    assert!(synced);
}

#[tokio::test]
async fn test_unsubscribe_and_dispose() {
    let (a, _b, _store) = manager_pair();
    a.initialize().await.unwrap();
    let subscription = a.subscribe(|_| {});
    assert_eq!(a.subscriber_count(), 1);
    subscription.unsubscribe();
    assert_eq!(a.subscriber_count(), 0);

    a.subscribe(|_| {});
    a.dispose().await;
    assert_eq!(a.subscriber_count(), 0);
    assert!(!a.is_initialized().await);

    let config = a.get_config().await.unwrap();
    assert!(config.default_prompts.contains_key("general"));
}

#[tokio::test]
async fn test_failed_transform_leaves_state() {
    let (a, _b, store) = manager_pair();
    a.initialize().await.unwrap();
    let before = store.get(CONFIG_KEY).await.unwrap();

    let result = TemplateService::new(a.clone())
        .delete_parameter_value(&Scope::Shared, "includeKeyPoints", "false")
        .await;
    assert!(matches!(result, Err(AppError::Invariant(_))));
    assert_eq!(store.get(CONFIG_KEY).await.unwrap(), before);
}
