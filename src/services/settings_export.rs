//! Configuration Export/Import
//!
//! Moves the prompt configuration in and out of the application as a plain
//! pretty-printed JSON document. Imports go through the manager so they are
//! validated, normalized and broadcast like any other replacement.

use std::path::Path;

use serde_json::Value;

use super::config_manager::ConfigManager;
use crate::models::config::PromptConfig;
use crate::utils::error::{AppError, AppResult};

/// Serialize the current configuration.
pub async fn export_config(manager: &ConfigManager) -> AppResult<String> {
    let config = manager.get_config().await?;
    Ok(serde_json::to_string_pretty(&config)?)
}

/// Write the current configuration to `path`.
pub async fn export_config_to_file(manager: &ConfigManager, path: &Path) -> AppResult<()> {
    let text = export_config(manager).await?;
    tokio::fs::write(path, text).await?;
    tracing::info!("[SettingsExport] Exported configuration to {}", path.display());
    Ok(())
}

/// Parse exported text into a JSON document.
///
/// Text that is not JSON is a validation failure, not a serialization one:
/// it came from the user.
pub fn parse_export(text: &str) -> AppResult<Value> {
    serde_json::from_str(text)
        .map_err(|e| AppError::validation(format!("Configuration is not valid JSON: {}", e)))
}

/// Import a configuration from exported text.
pub async fn import_config_from_str(
    manager: &ConfigManager,
    text: &str,
) -> AppResult<PromptConfig> {
    let document = parse_export(text)?;
    manager.import_config(document).await
}

/// Import a configuration from a file written by `export_config_to_file`.
pub async fn import_config_from_file(
    manager: &ConfigManager,
    path: &Path,
) -> AppResult<PromptConfig> {
    let text = tokio::fs::read_to_string(path).await?;
    import_config_from_str(manager, &text).await
}
