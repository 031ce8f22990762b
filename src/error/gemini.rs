use super::{GatewayError, client_closed_request};
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gemgate_schema::gemini::GeminiErrorBody;
use thiserror::Error as ThisError;

/// Rejection for the Google-native routes. Auth failures surface as 503, the
/// way Google reports an unusable backend.
#[derive(Debug, ThisError)]
#[error(transparent)]
pub struct GeminiError(#[from] pub GatewayError);

impl From<JsonRejection> for GeminiError {
    fn from(rejection: JsonRejection) -> Self {
        GeminiError(GatewayError::invalid(rejection.body_text()))
    }
}

impl IntoResponse for GeminiError {
    fn into_response(self) -> Response {
        let err = self.0;
        err.log_rejection("gemini");

        let (status, status_str) = match &err {
            GatewayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT"),
            GatewayError::Auth(_) => (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE"),
            GatewayError::Upstream(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
            GatewayError::ClientCancelled => return client_closed_request().into_response(),
        };

        let message = match err {
            GatewayError::InvalidRequest(message) => message,
            other => other.to_string(),
        };
        (
            status,
            Json(GeminiErrorBody::new(status.as_u16(), status_str, message)),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AuthFailure, UpstreamFailure};

    #[test]
    fn status_mapping() {
        let cases = [
            (GatewayError::invalid("x"), StatusCode::BAD_REQUEST),
            (
                GatewayError::from(AuthFailure::MissingCookie),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                GatewayError::from(UpstreamFailure::blocked("x")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (GatewayError::ClientCancelled, client_closed_request()),
        ];
        for (err, expected) in cases {
            assert_eq!(GeminiError(err).into_response().status(), expected);
        }
    }
}
