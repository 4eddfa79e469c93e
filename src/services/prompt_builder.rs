//! Prompt Builder
//!
//! Assembles the final prompt for a content type from the base template,
//! the type-specific instructions, shared parameters and the content type's
//! own parameters. Read-only over the configuration.

use super::config_manager::ConfigManager;
use crate::models::config::{
    Parameter, ParameterKind, ParameterMap, PromptConfig, CHECKBOX_TRUE,
};
use crate::models::content_type::{is_user_parameter, TYPE_SPECIFIC_INSTRUCTIONS};
use crate::models::preferences::{PreferenceValue, Preferences};
use crate::utils::error::{AppError, AppResult};

/// Value key of the type-specific instructions parameter that is appended.
const INSTRUCTIONS_VALUE_KEY: &str = "default";

/// Builds prompts from the current configuration
#[derive(Clone)]
pub struct PromptBuilder {
    manager: ConfigManager,
}

impl PromptBuilder {
    pub fn new(manager: ConfigManager) -> Self {
        Self { manager }
    }

    /// Build the prompt for `content_type` with the given selections.
    pub async fn build_prompt(
        &self,
        content_type: &str,
        preferences: &Preferences,
    ) -> AppResult<String> {
        let config = self.manager.get_config().await?;
        build_prompt(&config, content_type, preferences)
    }

    /// Parameters offered to the user for `content_type`.
    pub async fn get_parameter_options(&self, content_type: &str) -> AppResult<ParameterMap> {
        let config = self.manager.get_config().await?;
        Ok(parameter_options(&config, content_type))
    }

    /// Preferences that reproduce the builder's own fallbacks.
    pub async fn get_default_preferences(&self, content_type: &str) -> AppResult<Preferences> {
        let config = self.manager.get_config().await?;
        Ok(default_preferences(&config, content_type))
    }
}

/// Build the prompt for `content_type`.
///
/// Shared parameters are applied in stored key order, then the content
/// type's own parameters; both scopes append independently.
pub fn build_prompt(
    config: &PromptConfig,
    content_type: &str,
    preferences: &Preferences,
) -> AppResult<String> {
    let template = config
        .template(content_type)
        .filter(|template| !template.base_template.is_empty())
        .ok_or_else(|| {
            AppError::not_found(format!("No prompt template for content type: {}", content_type))
        })?;

    let mut prompt = template.base_template.clone();

    if let Some(instructions) = template
        .parameters
        .get(TYPE_SPECIFIC_INSTRUCTIONS)
        .and_then(|parameter| parameter.values.get(INSTRUCTIONS_VALUE_KEY))
    {
        append(&mut prompt, instructions);
    }

    for (id, parameter) in &config.shared_parameters {
        if let Some(content) = resolve_parameter(parameter, preferences.get(id)) {
            append(&mut prompt, content);
        }
    }

    for (id, parameter) in &template.parameters {
        if !is_user_parameter(content_type, id) {
            continue;
        }
        if let Some(content) = resolve_parameter(parameter, preferences.get(id)) {
            append(&mut prompt, content);
        }
    }

    Ok(prompt)
}

/// Pick the content a parameter contributes for a preference.
///
/// - `single`: always its value.
/// - boolean preference (or a checkbox given `"true"`/`"false"`): the `true`
///   value when ticked, nothing otherwise.
/// - checkbox without a preference: nothing.
/// - a preference naming an existing value: that value.
/// - otherwise the first value in stored order.
pub fn resolve_parameter<'a>(
    parameter: &'a Parameter,
    preference: Option<&PreferenceValue>,
) -> Option<&'a str> {
    let kind = parameter.effective_kind();
    if kind == ParameterKind::Single {
        return parameter.first_value();
    }

    let flag = match preference {
        Some(PreferenceValue::Flag(flag)) => Some(*flag),
        Some(PreferenceValue::Key(key)) if kind == ParameterKind::Checkbox => {
            Some(key == CHECKBOX_TRUE)
        }
        _ => None,
    };
    if let Some(flag) = flag {
        return if flag {
            parameter.value_for(CHECKBOX_TRUE)
        } else {
            None
        };
    }
    if kind == ParameterKind::Checkbox {
        return None;
    }

    if let Some(key) = preference
        .and_then(PreferenceValue::as_key)
        .filter(|key| !key.is_empty())
    {
        if let Some(content) = parameter.value_for(key) {
            return Some(content);
        }
    }
    parameter.first_value()
}

/// Shared parameters overlaid with the content type's own parameters, minus
/// the ones never offered to the user for this content type.
pub fn parameter_options(config: &PromptConfig, content_type: &str) -> ParameterMap {
    let mut options = config.shared_parameters.clone();
    if let Some(template) = config.template(content_type) {
        for (id, parameter) in &template.parameters {
            options.insert(id.clone(), parameter.clone());
        }
    }
    options.retain(|id, _| is_user_parameter(content_type, id));
    options
}

/// Checkboxes default to unticked, everything else to its first value key.
pub fn default_preferences(config: &PromptConfig, content_type: &str) -> Preferences {
    parameter_options(config, content_type)
        .iter()
        .filter_map(|(id, parameter)| {
            let preference = match parameter.effective_kind() {
                ParameterKind::Checkbox => PreferenceValue::Flag(false),
                ParameterKind::List | ParameterKind::Single => {
                    PreferenceValue::Key(parameter.first_key()?.to_string())
                }
            };
            Some((id.clone(), preference))
        })
        .collect()
}

fn append(prompt: &mut String, content: &str) {
    if content.is_empty() {
        return;
    }
    prompt.push('\n');
    prompt.push_str(content);
}
