//! Preference Models
//!
//! A user's selection per parameter, supplied when a prompt is built.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Selected value for one parameter.
///
/// Serialized untagged: `true`/`false` for checkboxes, a value key otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PreferenceValue {
    /// Checkbox state
    Flag(bool),
    /// Selected value key
    Key(String),
}

impl PreferenceValue {
    /// Boolean view of the preference, if it is a flag
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(flag) => Some(*flag),
            Self::Key(_) => None,
        }
    }

    /// Key view of the preference, if it is a value key
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Self::Flag(_) => None,
            Self::Key(key) => Some(key),
        }
    }
}

impl From<bool> for PreferenceValue {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

impl From<&str> for PreferenceValue {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PreferenceValue {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

/// Preferences keyed by parameter id
pub type Preferences = HashMap<String, PreferenceValue>;
