//! Prompt Builder Integration Tests

use std::sync::Arc;

use summarizer_prompts::{
    AppError, AppState, ConfigManager, MemoryStore, Preferences, PromptBuilder, Scope,
};

use super::common::tone_document;

#[tokio::test]
async fn test_end_to_end_build() {
    let manager = ConfigManager::new(Arc::new(MemoryStore::new()));
    manager.import_config(tone_document()).await.unwrap();
    let builder = PromptBuilder::new(manager);

    let mut preferences = Preferences::new();
    preferences.insert("tone".into(), "casual".into());
    let prompt = builder.build_prompt("general", &preferences).await.unwrap();
    assert_eq!(prompt, "Analyze this.\nBe casual.");
}

#[tokio::test]
async fn test_build_reflects_edits() {
    let state = AppState::new(Arc::new(MemoryStore::new()));
    state.config().import_config(tone_document()).await.unwrap();

    state
        .templates()
        .reorder_parameter_value(&Scope::Shared, "tone", "casual", 0)
        .await
        .unwrap();
    let prompt = state
        .builder()
        .build_prompt("general", &Preferences::new())
        .await
        .unwrap();
    assert_eq!(prompt, "Analyze this.\nBe casual.");
}

#[tokio::test]
async fn test_unknown_content_type() {
    let manager = ConfigManager::new(Arc::new(MemoryStore::new()));
    let builder = PromptBuilder::new(manager);
    let err = builder
        .build_prompt("podcast", &Preferences::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_default_config_builds_every_content_type() {
    let state = AppState::new(Arc::new(MemoryStore::new()));
    state.initialize().await.unwrap();
    for content_type in ["general", "reddit", "youtube", "pdf", "selected_text"] {
        let defaults = state
            .builder()
            .get_default_preferences(content_type)
            .await
            .unwrap();
        let prompt = state
            .builder()
            .build_prompt(content_type, &defaults)
            .await
            .unwrap();
        assert!(!prompt.is_empty(), "{} built an empty prompt", content_type);
    }
}
