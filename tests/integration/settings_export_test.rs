//! Export/Import Integration Tests

use std::sync::Arc;

use summarizer_prompts::services::settings_export::{
    export_config, export_config_to_file, import_config_from_file, import_config_from_str,
};
use summarizer_prompts::services::NewParameter;
use summarizer_prompts::{
    AppError, ConfigManager, JsonFileStore, MemoryStore, Scope, TemplateService,
};
use tempfile::tempdir;

use super::common::tone_document;

#[tokio::test]
async fn test_export_import_round_trip() {
    let manager = ConfigManager::new(Arc::new(MemoryStore::new()));
    let before = manager.get_config().await.unwrap();

    let text = export_config(&manager).await.unwrap();
    let imported = import_config_from_str(&manager, &text).await.unwrap();
    assert!(imported.is_identical(&before));
}

#[tokio::test]
async fn test_round_trip_after_adding_parameter_to_new_content_type() {
    let manager = ConfigManager::new(Arc::new(MemoryStore::new()));
    manager.import_config(tone_document()).await.unwrap();
    TemplateService::new(manager.clone())
        .add_parameter(
            &Scope::from("pdf"),
            NewParameter {
                param_name: "Pages".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let before = manager.get_config().await.unwrap();

    let text = export_config(&manager).await.unwrap();
    let imported = import_config_from_str(&manager, &text).await.unwrap();
    assert!(imported.is_identical(&before));
}

#[tokio::test]
async fn test_file_round_trip_between_stores() {
    let dir = tempdir().unwrap();
    let export_path = dir.path().join("prompts.json");

    let source = ConfigManager::new(Arc::new(MemoryStore::new()));
    source.import_config(tone_document()).await.unwrap();
    export_config_to_file(&source, &export_path).await.unwrap();

    let store = JsonFileStore::open(dir.path().join("storage.json")).await.unwrap();
    let target = ConfigManager::new(Arc::new(store));
    let imported = import_config_from_file(&target, &export_path).await.unwrap();
    assert!(imported.is_identical(&source.get_config().await.unwrap()));

    // A fresh store over the same file sees the import
    let reopened = JsonFileStore::open(dir.path().join("storage.json")).await.unwrap();
    let reloaded = ConfigManager::new(Arc::new(reopened));
    let listed = reloaded.get_config().await.unwrap();
    assert!(listed.is_identical(&imported));
    assert!(listed.parameters(&Scope::Shared).unwrap().contains_key("tone"));
}

#[tokio::test]
async fn test_invalid_text_is_validation_error() {
    let manager = ConfigManager::new(Arc::new(MemoryStore::new()));
    let err = import_config_from_str(&manager, "not json").await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}
