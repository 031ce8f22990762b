use crate::server::router::GatewayState;
use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use serde_json::json;
use subtle::ConstantTimeEq;

/// Header keys in lookup order, after which `Authorization: Bearer` is tried.
const KEY_HEADERS: [&str; 2] = ["x-api-key", "x-goog-api-key"];

fn extract_header_token(headers: &axum::http::HeaderMap) -> Option<String> {
    if let Some(k) = KEY_HEADERS
        .iter()
        .find_map(|name| headers.get(*name).and_then(|v| v.to_str().ok()))
    {
        return Some(k.to_string());
    }
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
}

fn extract_query_token(query: Option<&str>) -> Option<String> {
    query.and_then(|q| {
        url::form_urlencoded::parse(q.as_bytes())
            .find(|(k, _)| k == "key")
            .map(|(_, v)| v.into_owned())
    })
}

/// Gateway key check. Passes everything when no key is configured.
#[derive(Debug, Clone, Copy)]
pub struct RequireKeyAuth;

impl FromRequestParts<GatewayState> for RequireKeyAuth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &GatewayState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.gateway_key.as_deref() else {
            return Ok(RequireKeyAuth);
        };

        let token =
            extract_header_token(&parts.headers).or_else(|| extract_query_token(parts.uri.query()));

        match token {
            Some(key) => {
                if key.as_bytes().ct_eq(expected.as_bytes()).into() {
                    Ok(RequireKeyAuth)
                } else {
                    Err(AuthError::InvalidKey)
                }
            }
            None => Err(AuthError::MissingKey),
        }
    }
}

pub enum AuthError {
    MissingKey,
    InvalidKey,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let reason = match self {
            AuthError::MissingKey => "Missing API key",
            AuthError::InvalidKey => "Invalid API key",
        };
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "unauthorized", "reason": reason })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;

    #[test]
    fn header_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Bearer from-bearer".parse().unwrap());
        assert_eq!(extract_header_token(&headers).as_deref(), Some("from-bearer"));

        headers.insert("x-goog-api-key", "from-goog".parse().unwrap());
        assert_eq!(extract_header_token(&headers).as_deref(), Some("from-goog"));

        headers.insert("x-api-key", "from-anthropic".parse().unwrap());
        assert_eq!(extract_header_token(&headers).as_deref(), Some("from-anthropic"));
    }

    #[test]
    fn query_key() {
        assert_eq!(extract_query_token(Some("alt=sse&key=abc")).as_deref(), Some("abc"));
        assert_eq!(extract_query_token(Some("alt=sse")), None);
        assert_eq!(extract_query_token(None), None);
    }
}
