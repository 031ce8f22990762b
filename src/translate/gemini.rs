use super::normalized::{NormalizedRequest, Role, Turn};
use crate::error::GatewayError;
use crate::providers::geminiweb::Reply;
use gemgate_schema::gemini::{
    GeminiGenerateContentRequest, GeminiModelList, GeminiResponseBody, SimpleChatRequest,
};

const FINISH_STOP: &str = "STOP";

/// `model` is the path segment of `models/{model}:generateContent`, passed
/// through untouched.
pub fn normalize_gemini(
    model: &str,
    req: &GeminiGenerateContentRequest,
) -> Result<NormalizedRequest, GatewayError> {
    let turns = req
        .contents
        .iter()
        .map(|c| Turn::new(Role::from_wire(c.role.as_deref().unwrap_or("user")), c.joined_text()))
        .collect();
    let generation = req.generation_config.as_ref();

    NormalizedRequest {
        model_tag: model.to_string(),
        system_text: req.system_text().unwrap_or_default().to_string(),
        turns,
        max_tokens: generation.and_then(|g| g.max_output_tokens),
        temperature: generation.and_then(|g| g.temperature),
    }
    .validated()
}

/// Simple chat: one user turn, no system text.
pub fn normalize_simple_chat(req: &SimpleChatRequest) -> Result<NormalizedRequest, GatewayError> {
    NormalizedRequest {
        model_tag: String::new(),
        system_text: String::new(),
        turns: vec![Turn::new(Role::User, req.message.clone())],
        max_tokens: None,
        temperature: None,
    }
    .validated()
}

pub fn gemini_response(reply: &Reply) -> GeminiResponseBody {
    GeminiResponseBody::finished(reply.text.clone(), FINISH_STOP)
}

pub fn gemini_model_list(model_names: &[String]) -> GeminiModelList {
    GeminiModelList::from_model_names(model_names)
}
