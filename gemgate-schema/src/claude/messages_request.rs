//! Anthropic Messages API request schema.

use crate::content::MessageContent;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Request body for `POST /v1/messages`.
///
/// Reference: <https://docs.anthropic.com/en/api/messages>
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesRequest {
    /// Empty when the client omits it; the translator substitutes a default.
    #[serde(default)]
    pub model: String,

    pub messages: Vec<ClaudeMessage>,

    /// Top-level system prompt: a string or an array of text blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<MessageContent>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(default)]
    pub stream: bool,

    /// `tools`, `metadata`, `stop_sequences`, `thinking`, ...
    #[serde(default, flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaudeMessage {
    /// `user` or `assistant`.
    pub role: String,

    #[serde(default)]
    pub content: MessageContent,

    #[serde(default, flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn system_as_block_array() {
        let req: MessagesRequest = serde_json::from_value(json!({
            "model": "claude-3-5-sonnet",
            "max_tokens": 1024,
            "system": [{"type": "text", "text": "be brief", "cache_control": {"type": "ephemeral"}}],
            "messages": [{"role": "user", "content": [{"type": "text", "text": "hi"}]}]
        }))
        .unwrap();
        assert_eq!(req.system.as_ref().map(MessageContent::text).as_deref(), Some("be brief"));
        assert_eq!(req.messages[0].content.text(), "hi");
        assert_eq!(req.max_tokens, Some(1024));
        assert!(!req.stream);
    }

    #[test]
    fn model_may_be_omitted() {
        let req: MessagesRequest = serde_json::from_value(json!({
            "messages": [{"role": "user", "content": "hi"}],
            "metadata": {"user_id": "u1"}
        }))
        .unwrap();
        assert!(req.model.is_empty());
        assert!(req.system.is_none());
        assert_eq!(req.extra.get("metadata"), Some(&json!({"user_id": "u1"})));
    }
}
