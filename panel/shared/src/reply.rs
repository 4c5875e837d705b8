//! Reply body returned by the panel's JSON endpoints.

use serde::{Deserialize, Serialize};

/// `{"message": ...}` on success, `{"error": ...}` on failure.
///
/// Both fields are optional on the wire so that any JSON object decodes.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandReply {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            message: None,
            error: Some(error.into()),
        }
    }

    /// Text to show in the status line: a non-empty `message` wins over
    /// `error`. `None` when neither carries text.
    pub fn display_text(&self) -> Option<&str> {
        self.message
            .as_deref()
            .filter(|m| !m.is_empty())
            .or_else(|| self.error.as_deref().filter(|e| !e.is_empty()))
    }
}
