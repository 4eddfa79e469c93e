//! Application State
//!
//! One explicit context per execution context, owning the configuration
//! manager and every service built on it.

use std::sync::Arc;

use summarizer_prompts_core::ConfigStore;

use crate::services::{
    ConfigManager, CustomPromptService, PreferenceService, PromptBuilder, TemplateService,
};
use crate::utils::error::AppResult;

/// Application state shared by the host's handlers
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn ConfigStore>,
    config: ConfigManager,
    templates: TemplateService,
    builder: PromptBuilder,
    custom_prompts: CustomPromptService,
    preferences: PreferenceService,
}

impl AppState {
    /// Wire all services over `store`. Nothing is loaded until `initialize`.
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        let config = ConfigManager::new(store.clone());
        let builder = PromptBuilder::new(config.clone());
        Self {
            templates: TemplateService::new(config.clone()),
            custom_prompts: CustomPromptService::new(store.clone()),
            preferences: PreferenceService::new(store.clone(), builder.clone()),
            builder,
            config,
            store,
        }
    }

    /// Load the configuration and make sure custom prompt defaults are sound.
    pub async fn initialize(&self) -> AppResult<()> {
        self.config.initialize().await?;
        if let Err(e) = self.custom_prompts.ensure_default_prompts().await {
            tracing::warn!("[AppState] Failed to reconcile default prompts: {}", e);
        }
        Ok(())
    }

    /// Whether the configuration has been loaded
    pub async fn is_initialized(&self) -> bool {
        self.config.is_initialized().await
    }

    /// Stop syncing and drop cached state.
    pub async fn dispose(&self) {
        self.config.dispose().await;
    }

    pub fn store(&self) -> Arc<dyn ConfigStore> {
        self.store.clone()
    }

    pub fn config(&self) -> &ConfigManager {
        &self.config
    }

    pub fn templates(&self) -> &TemplateService {
        &self.templates
    }

    pub fn builder(&self) -> &PromptBuilder {
        &self.builder
    }

    pub fn custom_prompts(&self) -> &CustomPromptService {
        &self.custom_prompts
    }

    pub fn preferences(&self) -> &PreferenceService {
        &self.preferences
    }
}
