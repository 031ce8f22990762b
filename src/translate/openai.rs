use super::normalized::{NormalizedRequest, Role, Turn};
use crate::error::GatewayError;
use crate::providers::geminiweb::Reply;
use gemgate_schema::openai::{ChatCompletionRequest, ChatCompletionResponse, OpenaiModelList};

const OWNED_BY: &str = "google";

/// `system` messages are hoisted into the system preamble (joined with a
/// blank line); every other message becomes a turn.
pub fn normalize_openai(req: &ChatCompletionRequest) -> Result<NormalizedRequest, GatewayError> {
    if req.messages.is_empty() {
        return Err(GatewayError::invalid("messages array cannot be empty"));
    }

    let mut system = Vec::new();
    let mut turns = Vec::with_capacity(req.messages.len());
    for message in &req.messages {
        let text = message.content.text();
        match Role::from_wire(&message.role) {
            Role::System => system.push(text),
            role => turns.push(Turn::new(role, text)),
        }
    }

    NormalizedRequest {
        model_tag: req.model.clone(),
        system_text: system
            .into_iter()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n\n"),
        turns,
        max_tokens: req.output_cap(),
        temperature: req.temperature,
    }
    .validated()
}

pub fn completion_id(created: i64) -> String {
    format!("chatcmpl-{created}")
}

pub fn openai_response(reply: &Reply, model: &str, created: i64) -> ChatCompletionResponse {
    ChatCompletionResponse::assistant_text(
        completion_id(created),
        created,
        model.to_string(),
        reply.text.clone(),
        reply.finish_reason.clone(),
    )
}

pub fn openai_model_list(model_names: &[String], created: i64) -> OpenaiModelList {
    OpenaiModelList::from_model_names(model_names, OWNED_BY, created)
}
