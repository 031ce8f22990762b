//! Anthropic error envelope:
//! `{ "type": "error", "error": { "type": "invalid_request_error", "message": "..." } }`

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ClaudeErrorBody {
    pub r#type: String,
    pub error: ClaudeErrorObject,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClaudeErrorObject {
    pub r#type: String,
    pub message: String,
}

impl ClaudeErrorBody {
    pub fn new(r#type: &str, message: impl Into<String>) -> Self {
        Self {
            r#type: "error".to_string(),
            error: ClaudeErrorObject {
                r#type: r#type.to_string(),
                message: message.into(),
            },
        }
    }
}
