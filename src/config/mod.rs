mod basic;
mod providers;
mod stream;

pub use basic::{BasicConfig, DEFAULT_FALLBACK_PORTS};
pub use providers::{
    ClaudeModelMap, GeminiWebConfig, GeminiWebResolvedConfig, ProviderDefaults, ProvidersConfig,
};
pub use stream::StreamConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, sync::LazyLock};

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core server configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Upstream settings (see `providers` table in config.toml).
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Synthesized streaming pacing (see `stream` table in config.toml).
    #[serde(default)]
    pub stream: StreamConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "GEMGATE_";

impl Config {
    /// Builds a Figment that merges defaults, an optional config TOML file and
    /// `GEMGATE_`-prefixed environment variables (`__` separates nested keys).
    pub fn figment() -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    /// Loads configuration, aborting startup when it cannot be extracted.
    pub fn from_optional_toml() -> Self {
        Self::load().unwrap_or_else(|err| {
            panic!("failed to extract configuration (defaults + optional config.toml + env): {err}")
        })
    }

    pub fn geminiweb(&self) -> GeminiWebResolvedConfig {
        self.providers.geminiweb.resolve(&self.providers.defaults)
    }
}

/// Global, lazily-initialized configuration instance.
pub static CONFIG: LazyLock<Config> = LazyLock::new(Config::from_optional_toml);

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_are_complete() {
        let cfg = Config::default();
        assert_eq!(cfg.basic.listen_port, 4981);
        assert_eq!(cfg.basic.fallback_ports, DEFAULT_FALLBACK_PORTS.to_vec());
        assert_eq!(cfg.stream.chunk_delay_ms, 30);
        assert_eq!(cfg.stream.split_delimiter, " ");

        let web = cfg.geminiweb();
        assert_eq!(web.base_url.as_str(), "https://gemini.google.com/");
        assert_eq!(web.request_timeout.as_secs(), 300);
        assert!(!web.enable_multiplexing);
        assert_eq!(web.claude_model_map.sonnet, "gemini-3-pro");
    }

    #[test]
    fn toml_and_env_layers_merge() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [basic]
                listen_port = 9999
                gateway_key = "abc"

                [providers.defaults]
                proxy = "http://127.0.0.1:1080"

                [providers.geminiweb]
                secure_1psid = "from-toml"
                enable_multiplexing = true
                "#,
            )?;
            jail.set_env("GEMGATE_STREAM__CHUNK_DELAY_MS", "5");
            jail.set_env("GEMGATE_BASIC__LOGLEVEL", "debug");

            let cfg = Config::load()?;
            assert_eq!(cfg.basic.listen_port, 9999);
            assert_eq!(cfg.basic.gateway_key.as_deref(), Some("abc"));
            assert_eq!(cfg.basic.loglevel, "debug");
            assert_eq!(cfg.stream.chunk_delay_ms, 5);

            let web = cfg.geminiweb();
            assert_eq!(web.secure_1psid.as_deref(), Some("from-toml"));
            assert_eq!(
                web.proxy.as_ref().map(url::Url::as_str),
                Some("http://127.0.0.1:1080/")
            );
            assert!(web.enable_multiplexing);
            Ok(())
        });
    }
}
