use super::ClaudeMessage;
use crate::content::MessageContent;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Request body for `POST /v1/messages/count_tokens`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountTokensRequest {
    #[serde(default)]
    pub model: String,

    pub messages: Vec<ClaudeMessage>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<MessageContent>,

    #[serde(default, flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountTokensResponse {
    pub input_tokens: u64,
}
