use serde::{Deserialize, Serialize};

/// Non-streaming `message` object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub id: String,
    pub r#type: String,
    pub role: String,
    pub model: String,
    pub content: Vec<ResponseTextBlock>,
    pub stop_reason: Option<String>,
    pub stop_sequence: Option<String>,
    pub usage: ClaudeUsage,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponseTextBlock {
    pub r#type: String,
    pub text: String,
}

impl ResponseTextBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            r#type: "text".to_string(),
            text: text.into(),
        }
    }
}

/// Token usage; both numbers are `chars / 4` estimates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ClaudeUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl MessagesResponse {
    pub fn assistant(
        id: String,
        model: String,
        content: Vec<ResponseTextBlock>,
        stop_reason: Option<String>,
        usage: ClaudeUsage,
    ) -> Self {
        Self {
            id,
            r#type: "message".to_string(),
            role: "assistant".to_string(),
            model,
            content,
            stop_reason,
            stop_sequence: None,
            usage,
        }
    }
}
