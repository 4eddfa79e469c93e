//! Preference Service
//!
//! Per content type preferences the user chose to keep as their defaults,
//! layered over the builder's own fallbacks.

use std::sync::Arc;

use indexmap::IndexMap;
use summarizer_prompts_core::ConfigStore;

use super::prompt_builder::PromptBuilder;
use crate::models::preferences::Preferences;
use crate::utils::error::AppResult;

/// Store key of the saved default preferences.
pub const DEFAULT_PREFERENCES_KEY: &str = "default_preferences";

type StoredPreferences = IndexMap<String, Preferences>;

/// Saved default preferences per content type
#[derive(Clone)]
pub struct PreferenceService {
    store: Arc<dyn ConfigStore>,
    builder: PromptBuilder,
}

impl PreferenceService {
    pub fn new(store: Arc<dyn ConfigStore>, builder: PromptBuilder) -> Self {
        Self { store, builder }
    }

    /// Builder defaults for `content_type` overlaid with the saved ones.
    ///
    /// Saved entries for parameters that no longer exist are ignored.
    pub async fn get_default_preferences(&self, content_type: &str) -> AppResult<Preferences> {
        let mut preferences = self.builder.get_default_preferences(content_type).await?;
        let stored = self.load().await?;
        if let Some(saved) = stored.get(content_type) {
            for (id, value) in saved {
                if let Some(slot) = preferences.get_mut(id) {
                    *slot = value.clone();
                }
            }
        }
        Ok(preferences)
    }

    /// Save `preferences` as the defaults of `content_type`.
    ///
    /// Only entries for parameters offered for the content type are kept.
    pub async fn save_default_preferences(
        &self,
        content_type: &str,
        preferences: &Preferences,
    ) -> AppResult<()> {
        let options = self.builder.get_parameter_options(content_type).await?;
        let kept: Preferences = preferences
            .iter()
            .filter(|(id, _)| options.contains_key(id.as_str()))
            .map(|(id, value)| (id.clone(), value.clone()))
            .collect();

        let mut stored = self.load().await?;
        stored.insert(content_type.to_string(), kept);
        self.store
            .set(DEFAULT_PREFERENCES_KEY, serde_json::to_value(&stored)?)
            .await?;
        tracing::debug!("[Preferences] Saved default preferences for {}", content_type);
        Ok(())
    }

    /// Build the prompt for `content_type` with the saved defaults.
    pub async fn build_with_defaults(&self, content_type: &str) -> AppResult<String> {
        let preferences = self.get_default_preferences(content_type).await?;
        self.builder.build_prompt(content_type, &preferences).await
    }

    async fn load(&self) -> AppResult<StoredPreferences> {
        match self.store.get(DEFAULT_PREFERENCES_KEY).await? {
            Some(value) => match serde_json::from_value(value) {
                Ok(stored) => Ok(stored),
                Err(e) => {
                    tracing::warn!("[Preferences] Ignoring undecodable saved preferences: {}", e);
                    Ok(StoredPreferences::new())
                }
            },
            None => Ok(StoredPreferences::new()),
        }
    }
}
