//! OpenAI-compatible error schema.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Standard envelope:
/// `{ "error": { "message": "...", "type": "...", "code": "...", "param": ... } }`
#[derive(Debug, Serialize, Deserialize)]
pub struct OpenaiErrorBody {
    #[serde(rename = "error")]
    pub inner: OpenaiErrorObject,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OpenaiErrorObject {
    pub message: String,
    pub r#type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<Value>,
}

impl OpenaiErrorObject {
    pub fn new(r#type: &str, code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            r#type: r#type.to_string(),
            code: code.map(str::to_string),
            param: None,
        }
    }
}
