use super::claude::claude_models_handler;
use super::respond::stream_response;
use crate::error::OpenaiError;
use crate::server::router::GatewayState;
use crate::stream::StreamShape;
use crate::translate::{completion_id, normalize_openai, openai_model_list, openai_response};
use crate::utils::logging::with_pretty_json_debug;
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use gemgate_schema::openai::{ChatCompletionRequest, OpenaiModelList};
use tokio::time::Instant;
use tracing::debug;

const ANTHROPIC_VERSION: &str = "anthropic-version";

pub async fn chat_completions_handler(
    State(state): State<GatewayState>,
    payload: Result<Json<ChatCompletionRequest>, JsonRejection>,
) -> Result<Response, OpenaiError> {
    let deadline = Instant::now() + state.providers.geminiweb_cfg.request_timeout;
    let Json(req) = payload?;

    with_pretty_json_debug(&req, |pretty_body| {
        debug!(channel = "openai", body = %pretty_body, "Chat completion request");
    });

    let normalized = normalize_openai(&req)?;
    let reply = state.providers.geminiweb.send(&normalized, None).await?;

    let created = Utc::now().timestamp();
    if req.stream {
        let shape = StreamShape::Openai {
            id: completion_id(created),
            created,
            model: req.model.clone(),
        };
        return Ok(stream_response(&state, shape, &reply, deadline)?);
    }
    Ok(Json(openai_response(&reply, &req.model, created)).into_response())
}

pub async fn openai_models_handler(State(state): State<GatewayState>) -> Json<OpenaiModelList> {
    Json(openai_model_list(
        &state.providers.geminiweb_cfg.model_list,
        Utc::now().timestamp(),
    ))
}

/// `/v1/models` is shared with Anthropic clients, which always send
/// `anthropic-version`.
pub async fn shared_models_handler(state: State<GatewayState>, headers: HeaderMap) -> Response {
    if headers.contains_key(ANTHROPIC_VERSION) {
        claude_models_handler().await.into_response()
    } else {
        openai_models_handler(state).await.into_response()
    }
}

pub fn router() -> Router<GatewayState> {
    Router::new()
        .route("/v1/models", get(shared_models_handler))
        .route("/openai/v1/models", get(openai_models_handler))
        .route("/v1/chat/completions", post(chat_completions_handler))
        .route("/openai/v1/chat/completions", post(chat_completions_handler))
}
