//! Cross-Platform Path Utilities
//!
//! Resolves where the file-backed store keeps its data.

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Directory name used under the platform config directory
pub const APP_DIR_NAME: &str = "summarizer-prompts";

/// Get the platform configuration directory (e.g. ~/.config on Linux)
pub fn platform_config_dir() -> AppResult<PathBuf> {
    dirs::config_dir()
        .ok_or_else(|| AppError::config("Could not determine configuration directory"))
}

/// Get the application directory (<config_dir>/summarizer-prompts/)
pub fn app_dir() -> AppResult<PathBuf> {
    Ok(platform_config_dir()?.join(APP_DIR_NAME))
}

/// Get the store file path (<config_dir>/summarizer-prompts/storage.json)
pub fn store_path() -> AppResult<PathBuf> {
    Ok(app_dir()?.join("storage.json"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Get the application directory, creating if it doesn't exist
pub fn ensure_app_dir() -> AppResult<PathBuf> {
    let path = app_dir()?;
    ensure_dir(&path)?;
    Ok(path)
}
