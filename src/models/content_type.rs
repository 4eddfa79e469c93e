//! Content Types and Scopes
//!
//! Content types name the kind of source material a prompt is built for.
//! A scope selects either the shared parameter set or one content type's
//! parameter set.

use std::fmt;

/// Generic web page
pub const GENERAL: &str = "general";
/// Reddit post with comments
pub const REDDIT: &str = "reddit";
/// YouTube video transcript
pub const YOUTUBE: &str = "youtube";
/// PDF document
pub const PDF: &str = "pdf";
/// Text selected by the user on a page
pub const SELECTED_TEXT: &str = "selected_text";

/// Content types every configuration document must define a template for.
pub const REQUIRED_CONTENT_TYPES: [&str; 3] = [GENERAL, REDDIT, YOUTUBE];

/// Content types shipped with the compiled-in configuration.
pub const KNOWN_CONTENT_TYPES: [&str; 5] = [GENERAL, REDDIT, YOUTUBE, PDF, SELECTED_TEXT];

/// Literal scope name for the shared parameter set.
pub const SHARED_SCOPE: &str = "shared";

/// Per-type instruction parameter; always applied, never user-configurable.
pub const TYPE_SPECIFIC_INSTRUCTIONS: &str = "typeSpecificInstructions";

/// Comment analysis parameter; only offered for YouTube.
pub const COMMENT_ANALYSIS: &str = "commentAnalysis";

/// Whether a content-specific parameter is offered to the user and appended
/// as a regular parameter for `content_type`.
pub fn is_user_parameter(content_type: &str, parameter_id: &str) -> bool {
    match parameter_id {
        TYPE_SPECIFIC_INSTRUCTIONS => false,
        COMMENT_ANALYSIS => content_type == YOUTUBE,
        _ => true,
    }
}

/// Target of a parameter operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Parameters applied to every content type
    Shared,
    /// Parameters of a single content type
    ContentType(String),
}

impl Scope {
    /// Parse a scope name; `"shared"` selects the shared set, anything else a content type.
    pub fn parse(name: &str) -> Self {
        if name == SHARED_SCOPE {
            Self::Shared
        } else {
            Self::ContentType(name.to_string())
        }
    }

    /// Scope name as used by callers
    pub fn as_str(&self) -> &str {
        match self {
            Self::Shared => SHARED_SCOPE,
            Self::ContentType(content_type) => content_type,
        }
    }

    /// Content type of this scope, if it is not the shared scope
    pub fn content_type(&self) -> Option<&str> {
        match self {
            Self::Shared => None,
            Self::ContentType(content_type) => Some(content_type),
        }
    }
}

impl From<&str> for Scope {
    fn from(name: &str) -> Self {
        Self::parse(name)
    }
}

impl From<String> for Scope {
    fn from(name: String) -> Self {
        if name == SHARED_SCOPE {
            Self::Shared
        } else {
            Self::ContentType(name)
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
