use super::{GatewayError, client_closed_request};
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gemgate_schema::claude::ClaudeErrorBody;
use thiserror::Error as ThisError;

/// Rejection for the Anthropic-shaped routes.
#[derive(Debug, ThisError)]
#[error(transparent)]
pub struct ClaudeError(#[from] pub GatewayError);

impl From<JsonRejection> for ClaudeError {
    fn from(rejection: JsonRejection) -> Self {
        ClaudeError(GatewayError::invalid(rejection.body_text()))
    }
}

impl IntoResponse for ClaudeError {
    fn into_response(self) -> Response {
        let err = self.0;
        err.log_rejection("claude");

        let (status, kind) = match &err {
            GatewayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request_error"),
            GatewayError::Auth(_) => (StatusCode::UNAUTHORIZED, "authentication_error"),
            GatewayError::Upstream(_) => (StatusCode::INTERNAL_SERVER_ERROR, "api_error"),
            GatewayError::ClientCancelled => return client_closed_request().into_response(),
        };

        let message = match err {
            GatewayError::InvalidRequest(message) => message,
            other => other.to_string(),
        };
        (status, Json(ClaudeErrorBody::new(kind, message))).into_response()
    }
}
