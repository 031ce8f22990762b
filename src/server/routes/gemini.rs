use super::respond::stream_response;
use crate::error::{GatewayError, GeminiError};
use crate::providers::geminiweb::SessionCookies;
use crate::server::router::GatewayState;
use crate::stream::StreamShape;
use crate::translate::{gemini_model_list, gemini_response, normalize_gemini, normalize_simple_chat};
use crate::utils::logging::with_pretty_json_debug;
use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use gemgate_schema::gemini::{
    GeminiGenerateContentRequest, GeminiModelList, SimpleChatRequest, SimpleChatResponse,
};
use serde::Deserialize;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GenerateAction {
    Generate,
    StreamGenerate,
}

/// Splits `"{model}:{action}"` from the path tail.
fn parse_model_action(path: &str) -> Result<(&str, GenerateAction), GatewayError> {
    let last = path.rsplit('/').next().unwrap_or(path);
    let Some((model, action)) = last.split_once(':') else {
        return Err(GatewayError::invalid(format!(
            "expected models/{{model}}:generateContent, got models/{path}"
        )));
    };
    if model.is_empty() {
        return Err(GatewayError::invalid("model not found in path"));
    }
    match action {
        "generateContent" => Ok((model, GenerateAction::Generate)),
        "streamGenerateContent" => Ok((model, GenerateAction::StreamGenerate)),
        other => Err(GatewayError::invalid(format!("unsupported method: {other}"))),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GenerateQuery {
    #[serde(default)]
    alt: Option<String>,
}

pub async fn generate_content_handler(
    State(state): State<GatewayState>,
    Path(path): Path<String>,
    Query(query): Query<GenerateQuery>,
    payload: Result<Json<GeminiGenerateContentRequest>, JsonRejection>,
) -> Result<Response, GeminiError> {
    let deadline = Instant::now() + state.providers.geminiweb_cfg.request_timeout;
    let (model, action) = parse_model_action(&path)?;
    let Json(req) = payload?;

    with_pretty_json_debug(&req, |pretty_body| {
        debug!(channel = "gemini", model, body = %pretty_body, "Generate content request");
    });

    let normalized = normalize_gemini(model, &req)?;
    let reply = state.providers.geminiweb.send(&normalized, None).await?;

    match action {
        GenerateAction::Generate => Ok(Json(gemini_response(&reply)).into_response()),
        GenerateAction::StreamGenerate => {
            let shape = StreamShape::Gemini {
                sse: query.alt.as_deref() == Some("sse"),
            };
            Ok(stream_response(&state, shape, &reply, deadline)?)
        }
    }
}

/// Single message in, single answer out. Request cookies, when present,
/// are used for this call only.
pub async fn simple_chat_handler(
    State(state): State<GatewayState>,
    payload: Result<Json<SimpleChatRequest>, JsonRejection>,
) -> Result<Json<SimpleChatResponse>, GeminiError> {
    let Json(req) = payload?;
    let normalized = normalize_simple_chat(&req)?;
    let cookie_override = req.cookies.and_then(SessionCookies::from_override);
    debug!(
        channel = "gemini",
        message_chars = req.message.chars().count(),
        cookie_override = cookie_override.is_some(),
        "Simple chat request"
    );

    let reply = state
        .providers
        .geminiweb
        .send(&normalized, cookie_override)
        .await?;
    Ok(Json(SimpleChatResponse {
        response: reply.text,
    }))
}

pub async fn gemini_models_handler(State(state): State<GatewayState>) -> Json<GeminiModelList> {
    Json(gemini_model_list(&state.providers.geminiweb_cfg.model_list))
}

pub fn router() -> Router<GatewayState> {
    Router::new()
        .route("/gemini/v1beta/models", get(gemini_models_handler))
        .route("/gemini/v1beta/models/{*path}", post(generate_content_handler))
        .route("/gemini/chat", post(simple_chat_handler))
}
