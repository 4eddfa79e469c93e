//! Template Service
//!
//! Parameter and template editing. Each operation is a pure transform handed
//! to [`ConfigManager::update_config`]; operations on a path that does not
//! exist leave the configuration unchanged instead of failing.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::config_manager::ConfigManager;
use crate::models::config::{
    backfill_order, renumber_orders, Parameter, ParameterKind, ParameterMap, PromptConfig,
    Template, ValueMap, CHECKBOX_FALSE, CHECKBOX_TRUE,
};
use crate::models::content_type::Scope;
use crate::utils::error::{AppError, AppResult};

/// Value key used when a new parameter is added without values.
pub const DEFAULT_VALUE_KEY: &str = "default";
/// Value content used when a new parameter is added without values.
pub const DEFAULT_VALUE: &str = "Default Value";

/// A parameter together with its id, as listed for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScopedParameter {
    pub id: String,
    #[serde(flatten)]
    pub parameter: Parameter,
}

/// Data for a new parameter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewParameter {
    pub param_name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<ParameterKind>,
    #[serde(default)]
    pub values: Option<ValueMap>,
    #[serde(default)]
    pub value: Option<String>,
}

/// Service for editing parameters and base templates
#[derive(Clone)]
pub struct TemplateService {
    manager: ConfigManager,
}

impl TemplateService {
    pub fn new(manager: ConfigManager) -> Self {
        Self { manager }
    }

    /// Parameters of a scope sorted by `order`. Empty for an unknown scope.
    pub async fn get_parameters(&self, scope: &Scope) -> AppResult<Vec<ScopedParameter>> {
        let config = self.manager.get_config().await?;
        Ok(config
            .parameters(scope)
            .map(sorted_parameters)
            .unwrap_or_default())
    }

    /// Rename a parameter.
    pub async fn update_parameter_name(
        &self,
        scope: &Scope,
        id: &str,
        name: &str,
    ) -> AppResult<PromptConfig> {
        self.manager
            .update_config(|mut config| {
                if let Some(parameter) = config.parameter_mut(scope, id) {
                    parameter.param_name = name.to_string();
                }
                Ok(config)
            })
            .await
    }

    /// Change the content of an existing value. A `single` parameter's
    /// scalar is updated whatever key is given.
    pub async fn update_parameter_value(
        &self,
        scope: &Scope,
        id: &str,
        value_key: &str,
        content: &str,
    ) -> AppResult<PromptConfig> {
        self.manager
            .update_config(|mut config| {
                if let Some(parameter) = config.parameter_mut(scope, id) {
                    if parameter.effective_kind() == ParameterKind::Single {
                        parameter.value = Some(content.to_string());
                    } else if let Some(existing) = parameter.values.get_mut(value_key) {
                        *existing = content.to_string();
                    }
                }
                Ok(config)
            })
            .await
    }

    /// Add a value to a `list` parameter (or overwrite one with the same key in place).
    pub async fn add_parameter_value(
        &self,
        scope: &Scope,
        id: &str,
        value_key: &str,
        content: &str,
    ) -> AppResult<PromptConfig> {
        self.manager
            .update_config(|mut config| {
                if let Some(parameter) = config.parameter_mut(scope, id) {
                    if parameter.effective_kind() == ParameterKind::List {
                        parameter
                            .values
                            .insert(value_key.to_string(), content.to_string());
                    }
                }
                Ok(config)
            })
            .await
    }

    /// Remove a value. Refuses to remove the last value of a parameter or
    /// either value of a checkbox.
    pub async fn delete_parameter_value(
        &self,
        scope: &Scope,
        id: &str,
        value_key: &str,
    ) -> AppResult<PromptConfig> {
        self.manager
            .update_config(|mut config| {
                let Some(parameter) = config.parameter_mut(scope, id) else {
                    return Ok(config);
                };
                match parameter.effective_kind() {
                    ParameterKind::Single => {
                        return Err(AppError::invariant(format!(
                            "Cannot delete the last value of parameter '{}'",
                            id
                        )))
                    }
                    ParameterKind::Checkbox if parameter.values.contains_key(value_key) => {
                        return Err(AppError::invariant(format!(
                            "Checkbox parameter '{}' must keep both '{}' and '{}' values",
                            id, CHECKBOX_TRUE, CHECKBOX_FALSE
                        )))
                    }
                    _ => {}
                }
                if !parameter.values.contains_key(value_key) {
                    return Ok(config);
                }
                if parameter.values.len() <= 1 {
                    return Err(AppError::invariant(format!(
                        "Cannot delete the last value of parameter '{}'",
                        id
                    )));
                }
                parameter.values.shift_remove(value_key);
                Ok(config)
            })
            .await
    }

    /// Add a parameter at the end of a scope and return its id.
    ///
    /// A content type without a template gets a starter template.
    pub async fn add_parameter(&self, scope: &Scope, data: NewParameter) -> AppResult<String> {
        let id = format!("param_{}", Uuid::new_v4().simple());
        let parameter_id = id.clone();
        self.manager
            .update_config(move |mut config| {
                if let Scope::ContentType(content_type) = scope {
                    config
                        .default_prompts
                        .entry(content_type.clone())
                        .or_insert_with(|| Template::shell(content_type));
                }
                let parameters = config
                    .parameters_mut(scope)
                    .ok_or_else(|| AppError::internal(format!("Scope not available: {}", scope)))?;
                let order = match next_order(parameters) {
                    Some(order) => order,
                    None => {
                        renumber_orders(parameters);
                        parameters.len() as u32
                    }
                };
                parameters.insert(parameter_id, build_parameter(data, order));
                Ok(config)
            })
            .await?;
        tracing::debug!("[TemplateService] Added parameter {} to {}", id, scope);
        Ok(id)
    }

    /// Remove a parameter.
    pub async fn delete_parameter(&self, scope: &Scope, id: &str) -> AppResult<PromptConfig> {
        self.manager
            .update_config(|mut config| {
                if let Some(parameters) = config.parameters_mut(scope) {
                    parameters.shift_remove(id);
                }
                Ok(config)
            })
            .await
    }

    /// Replace the base template text of a content type. The text must not
    /// be blank.
    pub async fn update_base_template(
        &self,
        content_type: &str,
        text: &str,
    ) -> AppResult<PromptConfig> {
        if text.trim().is_empty() {
            return Err(AppError::validation(format!(
                "Base template for '{}' must not be empty",
                content_type
            )));
        }
        self.manager
            .update_config(|mut config| {
                if let Some(template) = config.default_prompts.get_mut(content_type) {
                    template.base_template = text.to_string();
                }
                Ok(config)
            })
            .await
    }

    /// Move a parameter to `new_index` in display order and renumber the
    /// whole scope to contiguous zero-based orders.
    pub async fn reorder_parameter(
        &self,
        scope: &Scope,
        id: &str,
        new_index: usize,
    ) -> AppResult<()> {
        self.manager
            .update_config(|mut config| {
                if let Some(parameters) = config.parameters_mut(scope) {
                    reorder_parameters(parameters, id, new_index);
                }
                Ok(config)
            })
            .await?;
        Ok(())
    }

    /// Move a value of a parameter to `new_index`; value order decides the
    /// implicit default.
    pub async fn reorder_parameter_value(
        &self,
        scope: &Scope,
        id: &str,
        value_key: &str,
        new_index: usize,
    ) -> AppResult<()> {
        self.manager
            .update_config(|mut config| {
                if let Some(parameter) = config.parameter_mut(scope, id) {
                    reorder_values(&mut parameter.values, value_key, new_index);
                }
                Ok(config)
            })
            .await?;
        Ok(())
    }
}

/// Parameters sorted by `order`; missing orders are backfilled on a copy.
pub fn sorted_parameters(parameters: &ParameterMap) -> Vec<ScopedParameter> {
    let mut parameters = parameters.clone();
    backfill_order(&mut parameters);
    let mut sorted: Vec<ScopedParameter> = parameters
        .into_iter()
        .map(|(id, parameter)| ScopedParameter { id, parameter })
        .collect();
    sorted.sort_by_key(|entry| entry.parameter.order);
    sorted
}

/// Move `id` to `new_index` (clamped) and renumber every parameter.
/// Returns false if `id` is not in the map.
pub fn reorder_parameters(parameters: &mut ParameterMap, id: &str, new_index: usize) -> bool {
    let mut ids: Vec<String> = sorted_parameters(parameters)
        .into_iter()
        .map(|entry| entry.id)
        .collect();
    let Some(position) = ids.iter().position(|candidate| candidate == id) else {
        return false;
    };
    let moved = ids.remove(position);
    ids.insert(new_index.min(ids.len()), moved);

    for (order, id) in ids.iter().enumerate() {
        if let Some(parameter) = parameters.get_mut(id) {
            parameter.order = Some(order as u32);
        }
    }
    true
}

/// Move value `key` to `new_index` (clamped). Returns false if `key` is absent.
pub fn reorder_values(values: &mut ValueMap, key: &str, new_index: usize) -> bool {
    let Some(position) = values.get_index_of(key) else {
        return false;
    };
    let last = values.len() - 1;
    values.move_index(position, new_index.min(last));
    true
}

/// Order for a parameter appended to the scope, or `None` when the highest
/// order leaves no room above it.
fn next_order(parameters: &ParameterMap) -> Option<u32> {
    let after_max = match parameters.values().filter_map(|p| p.order).max() {
        Some(max) => max.checked_add(1)?,
        None => 0,
    };
    Some(after_max.max(parameters.len() as u32))
}

fn build_parameter(data: NewParameter, order: u32) -> Parameter {
    let mut parameter = Parameter {
        param_name: data.param_name,
        kind: data.kind,
        values: data.values.unwrap_or_default(),
        value: data.value,
        order: Some(order),
    };
    let kind = parameter.effective_kind();
    match kind {
        ParameterKind::Single => {
            parameter.values.clear();
            if parameter.value.is_none() {
                parameter.value = Some(DEFAULT_VALUE.to_string());
            }
        }
        ParameterKind::Checkbox => {
            parameter
                .values
                .entry(CHECKBOX_TRUE.to_string())
                .or_insert_with(|| DEFAULT_VALUE.to_string());
            parameter
                .values
                .entry(CHECKBOX_FALSE.to_string())
                .or_default();
        }
        ParameterKind::List => {
            if parameter.values.is_empty() {
                parameter
                    .values
                    .insert(DEFAULT_VALUE_KEY.to_string(), DEFAULT_VALUE.to_string());
            }
        }
    }
    parameter.kind = Some(kind);
    parameter
}
