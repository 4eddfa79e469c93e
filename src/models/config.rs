//! Configuration Models
//!
//! The configuration document: shared parameters plus one template per
//! content type. Map key order is significant (the first value of a
//! parameter is its implicit default, and shared parameters are applied in
//! stored order), so every map is an `IndexMap`.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::content_type::Scope;
use super::validation::validate_config;
use crate::utils::error::{AppError, AppResult};

/// Parameters keyed by parameter id, in stored order.
pub type ParameterMap = IndexMap<String, Parameter>;

/// Parameter values keyed by value key, in stored order.
pub type ValueMap = IndexMap<String, String>;

/// Templates keyed by content type.
pub type TemplateMap = IndexMap<String, Template>;

/// Implicit value key of a `single` parameter.
pub const SINGLE_VALUE_KEY: &str = "value";

/// Checkbox value appended when the box is ticked.
pub const CHECKBOX_TRUE: &str = "true";
/// Checkbox value stored for the unticked state; never appended.
pub const CHECKBOX_FALSE: &str = "false";

/// Compiled-in configuration document.
const DEFAULT_CONFIG_JSON: &str = include_str!("../../resources/default_config.json");

/// How a parameter's values are selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    /// Several named values, one selected
    List,
    /// `"true"`/`"false"` values, additive when ticked
    Checkbox,
    /// One value, always included
    Single,
}

impl ParameterKind {
    /// All accepted type names
    pub const NAMES: [&'static str; 3] = ["list", "checkbox", "single"];

    /// Parse a type name
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "list" => Some(Self::List),
            "checkbox" => Some(Self::Checkbox),
            "single" => Some(Self::Single),
            _ => None,
        }
    }

    /// Type name as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Checkbox => "checkbox",
            Self::Single => "single",
        }
    }
}

/// A configurable instruction unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Display label
    #[serde(default)]
    pub param_name: String,
    /// Selection type; inferred during normalization when absent
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ParameterKind>,
    /// Named values for `list` and `checkbox` parameters
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub values: ValueMap,
    /// The only value of a `single` parameter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Position among sibling parameters of the same scope
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

impl Parameter {
    /// Infer the type from the stored shape: a scalar value means `single`,
    /// exactly the keys `true`/`false` mean `checkbox`, anything else `list`.
    pub fn infer_kind(&self) -> ParameterKind {
        if self.value.is_some() {
            ParameterKind::Single
        } else if self.values.len() == 2
            && self.values.contains_key(CHECKBOX_TRUE)
            && self.values.contains_key(CHECKBOX_FALSE)
        {
            ParameterKind::Checkbox
        } else {
            ParameterKind::List
        }
    }

    /// Declared type, or the inferred one
    pub fn effective_kind(&self) -> ParameterKind {
        self.kind.unwrap_or_else(|| self.infer_kind())
    }

    /// Value entries in stored order. A `single` parameter exposes its scalar
    /// under [`SINGLE_VALUE_KEY`].
    pub fn entries(&self) -> Vec<(&str, &str)> {
        if self.effective_kind() == ParameterKind::Single {
            return self
                .value
                .as_deref()
                .map(|value| vec![(SINGLE_VALUE_KEY, value)])
                .unwrap_or_default();
        }
        self.values
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect()
    }

    /// Number of values this parameter holds
    pub fn value_count(&self) -> usize {
        if self.effective_kind() == ParameterKind::Single {
            usize::from(self.value.is_some())
        } else {
            self.values.len()
        }
    }

    /// Key of the first value; the implicit default selection
    pub fn first_key(&self) -> Option<&str> {
        self.entries().first().map(|(key, _)| *key)
    }

    /// Content of the first value
    pub fn first_value(&self) -> Option<&str> {
        self.entries().first().map(|(_, value)| *value)
    }

    /// Content stored under `key`
    pub fn value_for(&self, key: &str) -> Option<&str> {
        self.entries()
            .into_iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, value)| value)
    }

    /// Equal including value key order
    pub fn is_identical(&self, other: &Self) -> bool {
        self == other && self.values.keys().eq(other.values.keys())
    }
}

/// Base prompt text plus the parameters scoped to one content type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Root prompt text
    #[serde(default)]
    pub base_template: String,
    /// Parameters applied only to this content type
    #[serde(default)]
    pub parameters: ParameterMap,
}

impl Template {
    /// Starter template for a content type that has no configuration yet.
    ///
    /// The base text is derived from the content type so the document stays
    /// valid and can be exported and imported again.
    pub fn shell(content_type: &str) -> Self {
        Self {
            name: content_type.to_string(),
            base_template: format!(
                "Summarize the following {} content.",
                content_type.replace('_', " ")
            ),
            parameters: ParameterMap::new(),
        }
    }

    /// Equal including parameter and value key order
    pub fn is_identical(&self, other: &Self) -> bool {
        self == other && parameters_identical(&self.parameters, &other.parameters)
    }
}

/// The root configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptConfig {
    /// Parameters applied to every content type
    pub shared_parameters: ParameterMap,
    /// One template per content type
    pub default_prompts: TemplateMap,
}

impl PromptConfig {
    /// Template for a content type
    pub fn template(&self, content_type: &str) -> Option<&Template> {
        self.default_prompts.get(content_type)
    }

    /// Parameter map of a scope, if the scope exists
    pub fn parameters(&self, scope: &Scope) -> Option<&ParameterMap> {
        match scope {
            Scope::Shared => Some(&self.shared_parameters),
            Scope::ContentType(content_type) => self
                .default_prompts
                .get(content_type)
                .map(|template| &template.parameters),
        }
    }

    /// Mutable parameter map of a scope, if the scope exists
    pub fn parameters_mut(&mut self, scope: &Scope) -> Option<&mut ParameterMap> {
        match scope {
            Scope::Shared => Some(&mut self.shared_parameters),
            Scope::ContentType(content_type) => self
                .default_prompts
                .get_mut(content_type)
                .map(|template| &mut template.parameters),
        }
    }

    /// Mutable parameter `id` of a scope
    pub fn parameter_mut(&mut self, scope: &Scope, id: &str) -> Option<&mut Parameter> {
        self.parameters_mut(scope)?.get_mut(id)
    }

    /// Backfill missing `order` and `type` fields in every scope.
    ///
    /// Idempotent: parameters that already carry an order or a type are never
    /// touched.
    pub fn normalize(&mut self) {
        normalize_parameters(&mut self.shared_parameters);
        for template in self.default_prompts.values_mut() {
            normalize_parameters(&mut template.parameters);
        }
    }

    /// Consuming form of [`PromptConfig::normalize`]
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// Deep equality that also requires every map to iterate in the same order.
    pub fn is_identical(&self, other: &Self) -> bool {
        self == other
            && parameters_identical(&self.shared_parameters, &other.shared_parameters)
            && self.default_prompts.keys().eq(other.default_prompts.keys())
            && self
                .default_prompts
                .values()
                .zip(other.default_prompts.values())
                .all(|(a, b)| a.is_identical(b))
    }

    /// Parse and validate a configuration document.
    pub fn from_value(document: serde_json::Value) -> AppResult<Self> {
        validate_config(&document)?;
        serde_json::from_value(document)
            .map_err(|e| AppError::validation(format!("Malformed configuration: {}", e)))
    }
}

/// Load the compiled-in configuration, validated but not yet normalized.
pub fn default_config() -> AppResult<PromptConfig> {
    let document: serde_json::Value = serde_json::from_str(DEFAULT_CONFIG_JSON)
        .map_err(|e| AppError::config(format!("Invalid compiled-in configuration: {}", e)))?;
    PromptConfig::from_value(document)
        .map_err(|e| AppError::config(format!("Invalid compiled-in configuration: {}", e)))
}

/// Normalize one scope: infer missing types, then backfill missing orders.
pub fn normalize_parameters(parameters: &mut ParameterMap) {
    for parameter in parameters.values_mut() {
        if parameter.kind.is_none() {
            parameter.kind = Some(parameter.infer_kind());
        }
    }
    backfill_order(parameters);
}

/// Assign `order` to parameters that lack one.
///
/// A parameter gets its positional index; if a sibling already holds that
/// index it gets the next unused value instead, so orders stay unique. When
/// the existing orders leave no room above them the scope is renumbered.
pub fn backfill_order(parameters: &mut ParameterMap) {
    let missing = parameters.values().filter(|p| p.order.is_none()).count();
    if missing == 0 {
        return;
    }
    let mut taken: HashSet<u32> = parameters.values().filter_map(|p| p.order).collect();
    let mut next_free = match taken.iter().max() {
        None => 0,
        Some(max) => match u32::try_from(missing).ok().and_then(|m| max.checked_add(m)) {
            Some(_) => max + 1,
            None => {
                renumber_orders(parameters);
                return;
            }
        },
    };

    for (index, parameter) in parameters.values_mut().enumerate() {
        if parameter.order.is_some() {
            continue;
        }
        let position = index as u32;
        let order = if taken.contains(&position) {
            next_free
        } else {
            position
        };
        taken.insert(order);
        next_free = next_free.max(order.saturating_add(1));
        parameter.order = Some(order);
    }
}

/// Renumber a scope to contiguous zero-based orders, keeping the current
/// display order. Parameters without an order go last, in stored order.
pub fn renumber_orders(parameters: &mut ParameterMap) {
    let mut ranked: Vec<(Option<u32>, usize)> = parameters
        .values()
        .enumerate()
        .map(|(index, parameter)| (parameter.order, index))
        .collect();
    ranked.sort_by_key(|(order, index)| (order.is_none(), *order, *index));
    for (order, (_, index)) in ranked.into_iter().enumerate() {
        if let Some((_, parameter)) = parameters.get_index_mut(index) {
            parameter.order = Some(order as u32);
        }
    }
}

fn parameters_identical(a: &ParameterMap, b: &ParameterMap) -> bool {
    a.keys().eq(b.keys()) && a.values().zip(b.values()).all(|(x, y)| x.is_identical(y))
}
