//! OpenAI Chat Completions request schema.

use crate::content::MessageContent;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Request body for `POST /v1/chat/completions`.
///
/// Schema reference:
/// https://platform.openai.com/docs/api-reference/chat/create
///
/// Only the fields the gateway acts on are typed; everything else (tools,
/// response_format, ...) lands in `extra` so unknown fields never break
/// deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// OpenAI docs: `string`, required. Passed through to the upstream as-is.
    #[serde(default)]
    pub model: String,

    /// OpenAI docs: `array`, required.
    pub messages: Vec<ChatMessage>,

    /// OpenAI docs: `boolean`, optional, default `false`.
    #[serde(default)]
    pub stream: bool,

    /// OpenAI docs: `number`, optional, between 0 and 2.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    /// Legacy output cap. Kept signed so negative values can be rejected
    /// instead of failing to parse.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<i64>,

    #[serde(default, flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// `system`, `developer`, `user`, `assistant` or `tool`.
    pub role: String,

    #[serde(default)]
    pub content: MessageContent,

    #[serde(default, flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ChatCompletionRequest {
    /// Effective output cap, preferring the newer field.
    pub fn output_cap(&self) -> Option<i64> {
        self.max_completion_tokens.or(self.max_tokens)
    }
}
