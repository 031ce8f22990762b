//! Google API error envelope:
//! `{ "error": { "code": 400, "message": "...", "status": "INVALID_ARGUMENT" } }`

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiErrorBody {
    pub error: GeminiErrorObject,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiErrorObject {
    pub code: u16,
    pub message: String,
    pub status: String,
}

impl GeminiErrorBody {
    pub fn new(code: u16, status: &str, message: impl Into<String>) -> Self {
        Self {
            error: GeminiErrorObject {
                code,
                message: message.into(),
                status: status.to_string(),
            },
        }
    }
}
