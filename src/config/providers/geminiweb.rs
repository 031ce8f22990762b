use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};
use url::Url;

use super::ProviderDefaults;

/// Gemini web app provider configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeminiWebConfig {
    /// Web app origin used for the handshake and generate calls.
    /// TOML: `providers.geminiweb.base_url`. Default: `https://gemini.google.com`.
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    /// Bootstrap `__Secure-1PSID` cookie.
    /// TOML: `providers.geminiweb.secure_1psid`.
    #[serde(default)]
    pub secure_1psid: Option<String>,

    /// Bootstrap `__Secure-1PSIDTS` cookie.
    /// TOML: `providers.geminiweb.secure_1psidts`.
    #[serde(default)]
    pub secure_1psidts: Option<String>,

    /// Browser cookie store (Firefox `cookies.sqlite` or Netscape `cookies.txt`).
    /// Discovered under the Firefox profile directory when unset.
    /// TOML: `providers.geminiweb.browser_cookie_db`.
    #[serde(default)]
    pub browser_cookie_db: Option<PathBuf>,

    /// Models advertised by the list endpoints.
    /// TOML: `providers.geminiweb.model_list`.
    #[serde(default = "default_model_list")]
    pub model_list: Vec<String>,

    /// Upstream models substituted for Claude family names.
    /// TOML: `providers.geminiweb.claude_model_map`.
    #[serde(default)]
    pub claude_model_map: ClaudeModelMap,

    /// Per-request deadline covering the mutex wait, the upstream call and stream pacing.
    /// TOML: `providers.geminiweb.request_timeout_secs`. Default: `300`.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Optional upstream HTTP proxy.
    /// TOML: `providers.geminiweb.proxy`. Falls back to `providers.defaults.proxy`.
    #[serde(default)]
    pub proxy: Option<Url>,

    /// TOML: `providers.geminiweb.enable_multiplexing`.
    /// Falls back to `providers.defaults.enable_multiplexing`.
    #[serde(default)]
    pub enable_multiplexing: Option<bool>,
}

/// `opus` / `sonnet` / `haiku` rewrite table for Anthropic-shaped requests.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ClaudeModelMap {
    #[serde(default = "default_opus")]
    pub opus: String,
    #[serde(default = "default_sonnet")]
    pub sonnet: String,
    #[serde(default = "default_haiku")]
    pub haiku: String,
}

#[derive(Debug, Clone)]
pub struct GeminiWebResolvedConfig {
    pub base_url: Url,
    pub secure_1psid: Option<String>,
    pub secure_1psidts: Option<String>,
    pub browser_cookie_db: Option<PathBuf>,
    pub model_list: Vec<String>,
    pub claude_model_map: ClaudeModelMap,
    pub request_timeout: Duration,
    pub proxy: Option<Url>,
    pub enable_multiplexing: bool,
}

impl GeminiWebConfig {
    pub fn resolve(&self, defaults: &ProviderDefaults) -> GeminiWebResolvedConfig {
        GeminiWebResolvedConfig {
            base_url: self.base_url.clone(),
            secure_1psid: non_blank(self.secure_1psid.as_deref()),
            secure_1psidts: non_blank(self.secure_1psidts.as_deref()),
            browser_cookie_db: self.browser_cookie_db.clone(),
            model_list: self.model_list.clone(),
            claude_model_map: self.claude_model_map.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            proxy: self.proxy.clone().or_else(|| defaults.proxy.clone()),
            enable_multiplexing: self
                .enable_multiplexing
                .unwrap_or(defaults.enable_multiplexing),
        }
    }
}

impl Default for GeminiWebConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            secure_1psid: None,
            secure_1psidts: None,
            browser_cookie_db: None,
            model_list: default_model_list(),
            claude_model_map: ClaudeModelMap::default(),
            request_timeout_secs: default_request_timeout_secs(),
            proxy: None,
            enable_multiplexing: None,
        }
    }
}

impl Default for ClaudeModelMap {
    fn default() -> Self {
        Self {
            opus: default_opus(),
            sonnet: default_sonnet(),
            haiku: default_haiku(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn default_base_url() -> Url {
    Url::parse("https://gemini.google.com").expect("static base url is valid")
}

fn default_model_list() -> Vec<String> {
    vec![
        "gemini-3-pro".to_string(),
        "gemini-3-flash".to_string(),
        "gemini-3.1-pro-preview".to_string(),
    ]
}

fn default_request_timeout_secs() -> u64 {
    300
}

fn default_opus() -> String {
    "gemini-3.1-pro-preview".to_string()
}

fn default_sonnet() -> String {
    "gemini-3-pro".to_string()
}

fn default_haiku() -> String {
    "gemini-3-flash".to_string()
}
