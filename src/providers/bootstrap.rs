use crate::config::{Config, GeminiWebResolvedConfig};
use crate::error::UpstreamFailure;
use crate::providers::geminiweb::{CookieSource, ReqwestTransport, UpstreamDriver, WebTransport};
use std::sync::Arc;
use tracing::info;

/// Aggregates the upstream handle and its resolved config.
#[derive(Clone)]
pub struct Providers {
    pub geminiweb: UpstreamDriver,
    pub geminiweb_cfg: Arc<GeminiWebResolvedConfig>,
}

impl Providers {
    pub fn init(cfg: &Config) -> Result<Self, UpstreamFailure> {
        let provider_defaults = &cfg.providers.defaults;
        let geminiweb_cfg = Arc::new(cfg.geminiweb());

        // Log resolved provider configs here so `main` stays wiring-only.
        info!(
            providers_defaults_proxy = %provider_defaults.proxy.as_ref().map(|u| u.as_str()).unwrap_or("<none>"),
            providers_defaults_enable_multiplexing = provider_defaults.enable_multiplexing,
            "Provider defaults loaded"
        );
        info!(
            geminiweb_base_url = %geminiweb_cfg.base_url.as_str(),
            geminiweb_proxy = %geminiweb_cfg.proxy.as_ref().map(|u| u.as_str()).unwrap_or("<none>"),
            geminiweb_enable_multiplexing = geminiweb_cfg.enable_multiplexing,
            geminiweb_request_timeout_secs = geminiweb_cfg.request_timeout.as_secs(),
            geminiweb_cookies_configured = geminiweb_cfg.secure_1psid.is_some(),
            geminiweb_browser_cookie_db = ?geminiweb_cfg.browser_cookie_db,
            geminiweb_model_list = ?geminiweb_cfg.model_list,
            "Gemini web config (effective)"
        );

        let transport = ReqwestTransport::new(&geminiweb_cfg)?;
        Ok(Self::with_transport(Arc::new(transport), geminiweb_cfg))
    }

    /// Wires a driver over an arbitrary transport.
    pub fn with_transport(
        transport: Arc<dyn WebTransport>,
        geminiweb_cfg: Arc<GeminiWebResolvedConfig>,
    ) -> Self {
        let geminiweb = UpstreamDriver::new(
            transport,
            CookieSource::from_config(&geminiweb_cfg),
            geminiweb_cfg.request_timeout,
        );
        Self {
            geminiweb,
            geminiweb_cfg,
        }
    }
}
