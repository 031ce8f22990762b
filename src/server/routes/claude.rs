use super::respond::stream_response;
use crate::error::ClaudeError;
use crate::server::router::GatewayState;
use crate::stream::StreamShape;
use crate::translate::{
    DEFAULT_CLAUDE_MODEL, claude_model, claude_model_list, claude_response, claude_usage,
    count_tokens, message_id, normalize_claude,
};
use crate::utils::logging::with_pretty_json_debug;
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use gemgate_schema::claude::{
    ClaudeModel, ClaudeModelList, CountTokensRequest, CountTokensResponse, MessagesRequest,
};
use tokio::time::Instant;
use tracing::debug;

pub async fn messages_handler(
    State(state): State<GatewayState>,
    payload: Result<Json<MessagesRequest>, JsonRejection>,
) -> Result<Response, ClaudeError> {
    let deadline = Instant::now() + state.providers.geminiweb_cfg.request_timeout;
    let Json(req) = payload?;

    with_pretty_json_debug(&req, |pretty_body| {
        debug!(channel = "claude", body = %pretty_body, "Messages request");
    });

    let normalized = normalize_claude(&req, &state.providers.geminiweb_cfg.claude_model_map)?;
    let prompt = normalized.prompt();
    let reply = state.providers.geminiweb.send(&normalized, None).await?;

    let model = if req.model.trim().is_empty() {
        DEFAULT_CLAUDE_MODEL
    } else {
        req.model.as_str()
    };
    let usage = claude_usage(&prompt, &reply.text);

    if req.stream {
        let shape = StreamShape::Claude {
            id: message_id(),
            model: model.to_string(),
            usage,
        };
        return Ok(stream_response(&state, shape, &reply, deadline)?);
    }
    Ok(Json(claude_response(message_id(), &reply, model, usage)).into_response())
}

pub async fn count_tokens_handler(
    payload: Result<Json<CountTokensRequest>, JsonRejection>,
) -> Result<Json<CountTokensResponse>, ClaudeError> {
    let Json(req) = payload?;
    Ok(Json(count_tokens(&req)))
}

pub async fn claude_models_handler() -> Json<ClaudeModelList> {
    Json(claude_model_list())
}

pub async fn claude_model_handler(Path(model_id): Path<String>) -> Json<ClaudeModel> {
    Json(claude_model(&model_id))
}

pub fn router() -> Router<GatewayState> {
    Router::new()
        .route("/v1/messages", post(messages_handler))
        .route("/claude/v1/messages", post(messages_handler))
        .route("/v1/messages/count_tokens", post(count_tokens_handler))
        .route("/claude/v1/messages/count_tokens", post(count_tokens_handler))
        .route("/claude/v1/models", get(claude_models_handler))
        .route("/claude/v1/models/{model_id}", get(claude_model_handler))
}
