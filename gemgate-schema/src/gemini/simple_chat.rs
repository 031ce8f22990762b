//! Single-message chat shape served at `/gemini/chat`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleChatRequest {
    pub message: String,

    /// Overrides the stored session cookies for this request only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies: Option<ChatCookies>,
}

#[derive(Clone, Serialize, Deserialize, Default)]
pub struct ChatCookies {
    #[serde(rename = "__Secure-1PSID", default)]
    pub secure_1psid: String,

    #[serde(rename = "__Secure-1PSIDTS", default, skip_serializing_if = "Option::is_none")]
    pub secure_1psidts: Option<String>,
}

// Cookie values stay out of logs.
impl std::fmt::Debug for ChatCookies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCookies")
            .field("secure_1psid", &"<redacted>")
            .field("secure_1psidts", &self.secure_1psidts.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleChatResponse {
    pub response: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cookie_names_match_browser() {
        let req: SimpleChatRequest = serde_json::from_value(json!({
            "message": "hello",
            "cookies": {"__Secure-1PSID": "sid", "__Secure-1PSIDTS": "ts"}
        }))
        .unwrap();
        let cookies = req.cookies.unwrap();
        assert_eq!(cookies.secure_1psid, "sid");
        assert_eq!(cookies.secure_1psidts.as_deref(), Some("ts"));
        let rendered = format!("{cookies:?}");
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("\"sid\""));
        assert!(!rendered.contains("\"ts\""));
    }

    #[test]
    fn cookies_optional() {
        let req: SimpleChatRequest = serde_json::from_value(json!({"message": "hi"})).unwrap();
        assert!(req.cookies.is_none());
    }
}
