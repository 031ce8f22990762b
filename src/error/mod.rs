mod claude;
mod gateway;
mod gemini;
mod openai;

pub use claude::ClaudeError;
pub use gateway::{AuthFailure, GatewayError, UpstreamFailure, UpstreamFailureKind};
pub use gemini::GeminiError;
pub use openai::OpenaiError;

use axum::http::StatusCode;

/// Non-standard status used when the client went away before a reply was ready.
pub(crate) fn client_closed_request() -> StatusCode {
    StatusCode::from_u16(499).unwrap_or(StatusCode::BAD_REQUEST)
}
