use super::normalized::{NormalizedRequest, Role, Turn, estimate_tokens};
use crate::config::ClaudeModelMap;
use crate::error::GatewayError;
use crate::providers::geminiweb::Reply;
use chrono::{DateTime, Utc};
use gemgate_schema::claude::{
    ClaudeModel, ClaudeModelList, ClaudeUsage, CountTokensRequest, CountTokensResponse,
    MessagesRequest, MessagesResponse, ResponseTextBlock,
};

pub const DEFAULT_CLAUDE_MODEL: &str = "claude-sonnet-4-6";

/// Models advertised on the Claude list endpoints: `(id, display name)`.
const CLAUDE_MODELS: [(&str, &str); 3] = [
    ("claude-sonnet-4-6", "Claude Sonnet 4.6"),
    ("claude-opus-4-6", "Claude Opus 4.6"),
    ("claude-haiku-4-5", "Claude Haiku 4.5"),
];
const CLAUDE_MODELS_CREATED_AT: i64 = 1_740_000_000;

/// Rewrites a Claude model tag by family substring (case-insensitive).
/// Empty or unrecognized tags use the sonnet entry.
pub fn map_claude_model(tag: &str, map: &ClaudeModelMap) -> String {
    let lower = if tag.trim().is_empty() {
        DEFAULT_CLAUDE_MODEL.to_string()
    } else {
        tag.to_ascii_lowercase()
    };
    if lower.contains("opus") {
        map.opus.clone()
    } else if lower.contains("haiku") {
        map.haiku.clone()
    } else {
        map.sonnet.clone()
    }
}

pub fn normalize_claude(
    req: &MessagesRequest,
    map: &ClaudeModelMap,
) -> Result<NormalizedRequest, GatewayError> {
    let turns = req
        .messages
        .iter()
        .map(|m| {
            let role = match Role::from_wire(&m.role) {
                Role::Model => Role::Model,
                _ => Role::User,
            };
            Turn::new(role, m.content.text())
        })
        .collect();

    NormalizedRequest {
        model_tag: map_claude_model(&req.model, map),
        system_text: req.system.as_ref().map(|s| s.text()).unwrap_or_default(),
        turns,
        max_tokens: req.max_tokens,
        temperature: req.temperature,
    }
    .validated()
}

/// `chars / 4` estimates for the prompt and the reply.
pub fn claude_usage(prompt: &str, reply_text: &str) -> ClaudeUsage {
    ClaudeUsage {
        input_tokens: estimate_tokens(prompt),
        output_tokens: estimate_tokens(reply_text),
    }
}

pub fn message_id() -> String {
    format!("msg_{}", uuid::Uuid::new_v4())
}

pub fn claude_response(
    id: String,
    reply: &Reply,
    model: &str,
    usage: ClaudeUsage,
) -> MessagesResponse {
    MessagesResponse::assistant(
        id,
        model.to_string(),
        vec![ResponseTextBlock::text(reply.text.clone())],
        Some("end_turn".to_string()),
        usage,
    )
}

/// Estimate over the system text and every message text.
pub fn count_tokens(req: &CountTokensRequest) -> CountTokensResponse {
    let mut text = req.system.as_ref().map(|s| s.text()).unwrap_or_default();
    for m in &req.messages {
        text.push_str(&m.content.text());
    }
    CountTokensResponse {
        input_tokens: estimate_tokens(&text),
    }
}

fn models_created_at() -> DateTime<Utc> {
    DateTime::from_timestamp(CLAUDE_MODELS_CREATED_AT, 0).unwrap_or_default()
}

pub fn claude_model_list() -> ClaudeModelList {
    let created = models_created_at();
    ClaudeModelList::from_models(
        CLAUDE_MODELS
            .iter()
            .map(|(id, name)| ClaudeModel::new(id, name, created))
            .collect(),
    )
}

/// A known model, or a synthesized entry for an unknown id.
pub fn claude_model(id: &str) -> ClaudeModel {
    CLAUDE_MODELS
        .iter()
        .find(|(known, _)| *known == id)
        .map(|(known, name)| ClaudeModel::new(known, name, models_created_at()))
        .unwrap_or_else(|| ClaudeModel::new(id, id, Utc::now()))
}
