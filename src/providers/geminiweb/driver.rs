use super::codec::{Reply, SessionKeys, decode_reply, encode_generate_form};
use super::cookies::{CookieSource, SessionCookies};
use super::session::{AuthState, SessionManager};
use super::transport::WebTransport;
use crate::error::{GatewayError, UpstreamFailure, UpstreamFailureKind};
use crate::translate::NormalizedRequest;
use rand::Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Everything guarded by the upstream mutex.
struct Upstream {
    session: SessionManager,
    keys: SessionKeys,
}

/// Single entry point to the web app. All calls are serialized: the upstream
/// corrupts per-session state when driven in parallel.
#[derive(Clone)]
pub struct UpstreamDriver {
    inner: Arc<Mutex<Upstream>>,
    transport: Arc<dyn WebTransport>,
    request_timeout: Duration,
}

impl UpstreamDriver {
    pub fn new(
        transport: Arc<dyn WebTransport>,
        cookie_source: CookieSource,
        request_timeout: Duration,
    ) -> Self {
        let session = SessionManager::new(transport.clone(), cookie_source);
        Self {
            inner: Arc::new(Mutex::new(Upstream {
                session,
                keys: SessionKeys::default(),
            })),
            transport,
            request_timeout,
        }
    }

    /// Current continuation keys.
    pub async fn session_keys(&self) -> SessionKeys {
        self.inner.lock().await.keys.clone()
    }

    /// Sends the assembled prompt of `request`.
    ///
    /// With `cookie_override` the call uses a one-shot handshake and a fresh
    /// conversation, and the stored session is neither read nor updated.
    /// The whole call, mutex wait included, runs under the request deadline.
    pub async fn send(
        &self,
        request: &NormalizedRequest,
        cookie_override: Option<SessionCookies>,
    ) -> Result<Reply, GatewayError> {
        let prompt = request.prompt();
        let started = Instant::now();

        let fut = async {
            let mut upstream = self.inner.lock().await;
            debug!(
                channel = "geminiweb",
                waited_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                "Acquired upstream lock"
            );
            match cookie_override {
                Some(cookies) => {
                    let auth = upstream.session.one_shot(cookies).await?;
                    self.generate(&auth, &prompt, &SessionKeys::default())
                        .await
                        .map_err(GatewayError::from)
                }
                None => self.send_stored(&mut upstream, &prompt).await,
            }
        };

        let result = match tokio::time::timeout(self.request_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamFailure::transport(format!(
                "request deadline of {}s exceeded",
                self.request_timeout.as_secs()
            ))
            .into()),
        };

        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        match &result {
            Ok(reply) => info!(
                channel = "geminiweb",
                req.model = %request.model_tag,
                prompt_chars = prompt.chars().count(),
                reply_chars = reply.text.chars().count(),
                latency_ms,
                "Upstream reply received"
            ),
            Err(e) => warn!(
                channel = "geminiweb",
                req.model = %request.model_tag,
                latency_ms,
                error = %e,
                "Upstream call failed"
            ),
        }
        result
    }

    async fn send_stored(
        &self,
        upstream: &mut Upstream,
        prompt: &str,
    ) -> Result<Reply, GatewayError> {
        let auth = upstream.session.ensure_ready().await?.clone();
        debug!(
            channel = "geminiweb",
            continuation = !upstream.keys.is_empty(),
            "Sending generate request"
        );

        match self.generate(&auth, prompt, &upstream.keys).await {
            Ok(reply) => {
                if let Some(keys) = reply.session_keys() {
                    upstream.keys = keys;
                }
                Ok(reply)
            }
            Err(failure) => {
                if is_auth_expired(&failure) {
                    upstream.session.invalidate();
                    upstream.keys = SessionKeys::default();
                }
                Err(failure.into())
            }
        }
    }

    async fn generate(
        &self,
        auth: &AuthState,
        prompt: &str,
        keys: &SessionKeys,
    ) -> Result<Reply, UpstreamFailure> {
        let req_id = rand::rng().random_range(100_000..1_000_000);
        let form = encode_generate_form(
            prompt,
            keys,
            &auth.anti_forgery_token,
            auth.build_label.as_deref(),
            req_id,
        )?;
        let resp = self.transport.post_generate(&auth.cookies, &form).await?;
        decode_reply(resp.status, &resp.body)
    }
}

fn is_auth_expired(failure: &UpstreamFailure) -> bool {
    failure.kind == UpstreamFailureKind::Http && matches!(failure.status, Some(401 | 403))
}
