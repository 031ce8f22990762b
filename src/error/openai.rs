use super::{GatewayError, client_closed_request};
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gemgate_schema::openai::{OpenaiErrorBody, OpenaiErrorObject};
use thiserror::Error as ThisError;

/// Rejection for the OpenAI-shaped routes.
#[derive(Debug, ThisError)]
#[error(transparent)]
pub struct OpenaiError(#[from] pub GatewayError);

impl From<JsonRejection> for OpenaiError {
    fn from(rejection: JsonRejection) -> Self {
        OpenaiError(GatewayError::invalid(rejection.body_text()))
    }
}

impl IntoResponse for OpenaiError {
    fn into_response(self) -> Response {
        let err = self.0;
        err.log_rejection("openai");

        let (status, body) = match &err {
            GatewayError::InvalidRequest(message) => (
                StatusCode::BAD_REQUEST,
                OpenaiErrorObject::new("invalid_request_error", Some("invalid_request"), message),
            ),
            GatewayError::Auth(failure) => (
                StatusCode::UNAUTHORIZED,
                OpenaiErrorObject::new(
                    "authentication_error",
                    Some(failure.code()),
                    failure.to_string(),
                ),
            ),
            GatewayError::Upstream(failure) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                OpenaiErrorObject::new(
                    "api_error",
                    Some(&format!("upstream_{}", failure.kind)),
                    failure.to_string(),
                ),
            ),
            GatewayError::ClientCancelled => return client_closed_request().into_response(),
        };

        (status, Json(OpenaiErrorBody { inner: body })).into_response()
    }
}
