use super::codec::scrape_quoted;
use super::cookies::{CookieSource, SessionCookies};
use super::transport::WebTransport;
use crate::error::{AuthFailure, GatewayError, UpstreamFailure, UpstreamFailureKind};
use backon::{ExponentialBuilder, Retryable};
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Page keys holding the anti-forgery token, newest first.
const TOKEN_KEYS: [&str; 2] = ["SNlM0e", "thykhd"];
const BUILD_LABEL_KEY: &str = "cfb2h";

/// One retry of the handshake, transport failures only.
static HANDSHAKE_RETRY_POLICY: LazyLock<ExponentialBuilder> = LazyLock::new(|| {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(200))
        .with_max_delay(Duration::from_millis(200))
        .with_max_times(1)
});

/// Credential for talking to the upstream, harvested once per session.
#[derive(Clone)]
pub struct AuthState {
    pub cookies: SessionCookies,
    pub anti_forgery_token: String,
    pub build_label: Option<String>,
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("cookies", &self.cookies)
            .field("anti_forgery_token", &"<redacted>")
            .field("build_label", &self.build_label)
            .finish()
    }
}

/// Owns the stored [`AuthState`]. Callers hold the upstream mutex around
/// every method, so `&mut self` is the write guard.
pub struct SessionManager {
    transport: Arc<dyn WebTransport>,
    cookie_source: CookieSource,
    state: Option<AuthState>,
}

impl SessionManager {
    pub fn new(transport: Arc<dyn WebTransport>, cookie_source: CookieSource) -> Self {
        Self {
            transport,
            cookie_source,
            state: None,
        }
    }

    /// Returns the stored credential, performing the handshake when none is held.
    pub async fn ensure_ready(&mut self) -> Result<&AuthState, GatewayError> {
        if self.state.is_none() {
            let cookies = self.cookie_source.resolve().await?;
            let state = handshake(self.transport.as_ref(), cookies).await?;
            info!(
                channel = "geminiweb",
                build_label = state.build_label.as_deref().unwrap_or("-"),
                "Upstream session initialized"
            );
            self.state = Some(state);
        }
        self.state
            .as_ref()
            .ok_or(GatewayError::Auth(AuthFailure::Unauthenticated))
    }

    /// Drops the stored credential; the next call handshakes again.
    pub fn invalidate(&mut self) {
        if self.state.take().is_some() {
            warn!(channel = "geminiweb", "Upstream session invalidated");
        }
    }

    /// Handshake for request-scoped cookies, leaving the stored state alone.
    pub async fn one_shot(&self, cookies: SessionCookies) -> Result<AuthState, GatewayError> {
        handshake(self.transport.as_ref(), cookies).await
    }
}

/// GETs the app page and scrapes the anti-forgery token (and build label).
async fn handshake(
    transport: &dyn WebTransport,
    cookies: SessionCookies,
) -> Result<AuthState, GatewayError> {
    let page = (|| async { transport.fetch_app_page(&cookies).await })
        .retry(*HANDSHAKE_RETRY_POLICY)
        .when(|e: &UpstreamFailure| e.kind == UpstreamFailureKind::Transport)
        .notify(|e: &UpstreamFailure, dur: Duration| {
            warn!(
                channel = "geminiweb",
                error = %e,
                retry_in_ms = dur.as_millis(),
                "Handshake transport failure, retrying"
            );
        })
        .await?;

    match page.status {
        200..=299 => {}
        // Expired cookies get bounced to the sign-in page.
        300..=399 | 401 | 403 => {
            debug!(channel = "geminiweb", status = page.status, "App page refused cookies");
            return Err(AuthFailure::Unauthenticated.into());
        }
        status => {
            return Err(
                UpstreamFailure::http(status, format!("app page returned HTTP {status}")).into(),
            );
        }
    }

    let Some(anti_forgery_token) = TOKEN_KEYS
        .iter()
        .find_map(|key| scrape_quoted(&page.body, key))
    else {
        debug!(channel = "geminiweb", "No anti-forgery token on app page");
        return Err(AuthFailure::Unauthenticated.into());
    };

    Ok(AuthState {
        cookies,
        anti_forgery_token,
        build_label: scrape_quoted(&page.body, BUILD_LABEL_KEY),
    })
}
