use std::fmt;
use thiserror::Error as ThisError;

/// Closed error taxonomy shared by every inbound shape.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum GatewayError {
    /// Body does not parse, misses required fields or carries no text.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Auth(#[from] AuthFailure),

    #[error(transparent)]
    Upstream(#[from] UpstreamFailure),

    /// The inbound connection went away. Never rendered as an error body.
    #[error("client cancelled the request")]
    ClientCancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum AuthFailure {
    #[error("no __Secure-1PSID cookie was found in the request, configuration or browser store")]
    MissingCookie,

    #[error("the upstream rejected the session cookies")]
    Unauthenticated,
}

impl AuthFailure {
    pub fn code(self) -> &'static str {
        match self {
            AuthFailure::MissingCookie => "missing_cookie",
            AuthFailure::Unauthenticated => "unauthenticated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamFailureKind {
    Transport,
    Http,
    Parse,
    Blocked,
    Empty,
}

impl UpstreamFailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            UpstreamFailureKind::Transport => "transport",
            UpstreamFailureKind::Http => "http",
            UpstreamFailureKind::Parse => "parse",
            UpstreamFailureKind::Blocked => "blocked",
            UpstreamFailureKind::Empty => "empty",
        }
    }
}

impl fmt::Display for UpstreamFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("upstream {kind} failure{}: {detail}", .status.map(|s| format!(" (status {s})")).unwrap_or_default())]
pub struct UpstreamFailure {
    pub kind: UpstreamFailureKind,
    pub status: Option<u16>,
    pub detail: String,
}

impl UpstreamFailure {
    fn new(kind: UpstreamFailureKind, status: Option<u16>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            detail: detail.into(),
        }
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        Self::new(UpstreamFailureKind::Transport, None, detail)
    }

    pub fn http(status: u16, detail: impl Into<String>) -> Self {
        Self::new(UpstreamFailureKind::Http, Some(status), detail)
    }

    pub fn parse(detail: impl Into<String>) -> Self {
        Self::new(UpstreamFailureKind::Parse, None, detail)
    }

    pub fn blocked(detail: impl Into<String>) -> Self {
        Self::new(UpstreamFailureKind::Blocked, None, detail)
    }

    pub fn empty(detail: impl Into<String>) -> Self {
        Self::new(UpstreamFailureKind::Empty, None, detail)
    }
}

impl GatewayError {
    pub fn invalid(message: impl Into<String>) -> Self {
        GatewayError::InvalidRequest(message.into())
    }

    pub(crate) fn log_rejection(&self, shape: &'static str) {
        match self {
            GatewayError::InvalidRequest(message) => {
                tracing::warn!(shape, message = %message, "Request rejected");
            }
            GatewayError::Auth(failure) => {
                tracing::warn!(shape, code = failure.code(), "Upstream authentication failed");
            }
            GatewayError::Upstream(failure) => {
                tracing::error!(
                    shape,
                    kind = %failure.kind,
                    status = ?failure.status,
                    detail = %failure.detail,
                    "Upstream call failed"
                );
            }
            GatewayError::ClientCancelled => {
                tracing::debug!(shape, "Client cancelled request");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_failure_message_exposes_kind_and_status() {
        let err = GatewayError::from(UpstreamFailure::http(429, "rate limited"));
        assert_eq!(
            err.to_string(),
            "upstream http failure (status 429): rate limited"
        );
        let err = GatewayError::from(UpstreamFailure::empty("no frames"));
        assert_eq!(err.to_string(), "upstream empty failure: no frames");
    }

    #[test]
    fn auth_failure_is_transparent() {
        let err = GatewayError::from(AuthFailure::Unauthenticated);
        assert_eq!(err.to_string(), AuthFailure::Unauthenticated.to_string());
    }
}
