//! Configuration Validation
//!
//! Structural checks for configuration documents supplied from outside
//! (imports, the compiled-in defaults). Runs on the raw JSON so that errors
//! can name the missing or malformed field instead of surfacing as a
//! deserialization failure.

use serde_json::{Map, Value};

use super::config::{ParameterKind, CHECKBOX_FALSE, CHECKBOX_TRUE};
use super::content_type::REQUIRED_CONTENT_TYPES;
use crate::utils::error::{AppError, AppResult};

/// Validate a configuration document.
///
/// Fails with `AppError::Validation` when a section or required template is
/// missing, a template has no `baseTemplate`, or a parameter is malformed
/// for its (declared or inferred) type.
pub fn validate_config(document: &Value) -> AppResult<()> {
    let root = document
        .as_object()
        .ok_or_else(|| AppError::validation("Configuration must be a JSON object"))?;

    let shared = section(root, "sharedParameters")?;
    let prompts = section(root, "defaultPrompts")?;

    for content_type in REQUIRED_CONTENT_TYPES {
        if !prompts.contains_key(content_type) {
            return Err(AppError::validation(format!(
                "Missing template for required content type: defaultPrompts.{}",
                content_type
            )));
        }
    }

    validate_parameters(shared, "sharedParameters")?;

    for (content_type, template) in prompts {
        let path = format!("defaultPrompts.{}", content_type);
        let template = template
            .as_object()
            .ok_or_else(|| AppError::validation(format!("{} must be an object", path)))?;

        match template.get("baseTemplate") {
            Some(Value::String(text)) if !text.trim().is_empty() => {}
            Some(Value::String(_)) => {
                return Err(AppError::validation(format!(
                    "{}.baseTemplate must not be empty",
                    path
                )))
            }
            Some(_) => {
                return Err(AppError::validation(format!(
                    "{}.baseTemplate must be a string",
                    path
                )))
            }
            None => {
                return Err(AppError::validation(format!(
                    "Missing baseTemplate: {}.baseTemplate",
                    path
                )))
            }
        }

        if let Some(parameters) = template.get("parameters") {
            let parameters = parameters.as_object().ok_or_else(|| {
                AppError::validation(format!("{}.parameters must be an object", path))
            })?;
            validate_parameters(parameters, &format!("{}.parameters", path))?;
        }
    }

    Ok(())
}

fn section<'a>(root: &'a Map<String, Value>, name: &str) -> AppResult<&'a Map<String, Value>> {
    match root.get(name) {
        Some(Value::Object(map)) => Ok(map),
        Some(_) => Err(AppError::validation(format!("{} must be an object", name))),
        None => Err(AppError::validation(format!("Missing section: {}", name))),
    }
}

fn validate_parameters(parameters: &Map<String, Value>, path: &str) -> AppResult<()> {
    for (id, parameter) in parameters {
        validate_parameter(parameter, &format!("{}.{}", path, id))?;
    }
    Ok(())
}

fn validate_parameter(parameter: &Value, path: &str) -> AppResult<()> {
    let parameter = parameter
        .as_object()
        .ok_or_else(|| AppError::validation(format!("{} must be an object", path)))?;

    let values = match parameter.get("values") {
        None | Some(Value::Null) => None,
        Some(Value::Object(values)) => {
            if let Some((key, _)) = values.iter().find(|(_, v)| !v.is_string()) {
                return Err(AppError::validation(format!(
                    "{}.values.{} must be a string",
                    path, key
                )));
            }
            Some(values)
        }
        Some(_) => {
            return Err(AppError::validation(format!(
                "{}.values must be an object",
                path
            )))
        }
    };

    let value = match parameter.get("value") {
        None | Some(Value::Null) => None,
        Some(Value::String(value)) => Some(value),
        Some(_) => {
            return Err(AppError::validation(format!(
                "{}.value must be a string",
                path
            )))
        }
    };

    if let Some(order) = parameter.get("order") {
        if !order.is_null() && order.as_u64().map_or(true, |o| o > u64::from(u32::MAX)) {
            return Err(AppError::validation(format!(
                "{}.order must be a non-negative integer",
                path
            )));
        }
    }

    let kind = match parameter.get("type") {
        None | Some(Value::Null) => infer_kind(values, value),
        Some(Value::String(name)) => ParameterKind::parse(name).ok_or_else(|| {
            AppError::validation(format!(
                "{}.type has invalid value '{}' (expected one of: {})",
                path,
                name,
                ParameterKind::NAMES.join(", ")
            ))
        })?,
        Some(_) => {
            return Err(AppError::validation(format!(
                "{}.type must be a string",
                path
            )))
        }
    };

    match kind {
        ParameterKind::List => {
            if values.map_or(true, |v| v.is_empty()) {
                return Err(AppError::validation(format!(
                    "{}.values: list parameter must have at least one value",
                    path
                )));
            }
        }
        ParameterKind::Checkbox => {
            for key in [CHECKBOX_TRUE, CHECKBOX_FALSE] {
                if !values.is_some_and(|v| v.contains_key(key)) {
                    return Err(AppError::validation(format!(
                        "Missing checkbox value: {}.values.{}",
                        path, key
                    )));
                }
            }
        }
        ParameterKind::Single => {
            if value.is_none() {
                return Err(AppError::validation(format!(
                    "Missing value: {}.value is required for single parameters",
                    path
                )));
            }
        }
    }

    Ok(())
}

/// Same rule as `Parameter::infer_kind`, applied to the raw document.
fn infer_kind(values: Option<&Map<String, Value>>, value: Option<&String>) -> ParameterKind {
    if value.is_some() {
        return ParameterKind::Single;
    }
    match values {
        Some(v) if v.len() == 2 && v.contains_key(CHECKBOX_TRUE) && v.contains_key(CHECKBOX_FALSE) => {
            ParameterKind::Checkbox
        }
        _ => ParameterKind::List,
    }
}
