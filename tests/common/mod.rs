#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response},
};
use gemgate::config::Config;
use gemgate::error::UpstreamFailure;
use gemgate::providers::Providers;
use gemgate::providers::geminiweb::{GenerateForm, SessionCookies, UpstreamResponse, WebTransport};
use gemgate::server::router::{GatewayState, gemgate_router};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

pub const APP_PAGE: &str =
    r#"<html><script>window.WIZ_global_data = {"cfb2h":"boq_assistant-bard-web-server_20250101","SNlM0e":"AFWLbD-test-token"};</script></html>"#;

/// Upstream body in the web app's wire format carrying `text` and continuation ids.
pub fn wire_body(text: &str, cid: &str, rid: &str, rcid: &str) -> String {
    let inner = json!([null, [cid, rid], null, null, [[rcid, [text]]]]);
    let frame = json!([["wrb.fr", null, inner.to_string()]]).to_string();
    format!(")]}}'\n\n{}\n{frame}\n", frame.len())
}

/// Instrumented stand-in for the web app.
pub struct FakeUpstream {
    reply_texts: Mutex<VecDeque<String>>,
    default_text: String,
    service_time: Duration,
    page_statuses: Mutex<VecDeque<u16>>,
    generate_bodies: Mutex<VecDeque<(u16, String)>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub page_calls: AtomicUsize,
    pub generate_calls: AtomicUsize,
    pub forms: Mutex<Vec<GenerateForm>>,
    pub cookies_seen: Mutex<Vec<String>>,
}

impl FakeUpstream {
    pub fn new(default_text: &str) -> Self {
        Self {
            reply_texts: Mutex::new(VecDeque::new()),
            default_text: default_text.to_string(),
            service_time: Duration::ZERO,
            page_statuses: Mutex::new(VecDeque::new()),
            generate_bodies: Mutex::new(VecDeque::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            page_calls: AtomicUsize::new(0),
            generate_calls: AtomicUsize::new(0),
            forms: Mutex::new(Vec::new()),
            cookies_seen: Mutex::new(Vec::new()),
        }
    }

    pub fn with_service_time(mut self, service_time: Duration) -> Self {
        self.service_time = service_time;
        self
    }

    pub fn queue_reply(&self, text: &str) {
        self.reply_texts.lock().unwrap().push_back(text.to_string());
    }

    /// Next app page fetch answers with `status`.
    pub fn queue_page_status(&self, status: u16) {
        self.page_statuses.lock().unwrap().push_back(status);
    }

    /// Next generate call answers with this raw status and body.
    pub fn queue_generate_raw(&self, status: u16, body: &str) {
        self.generate_bodies
            .lock()
            .unwrap()
            .push_back((status, body.to_string()));
    }

    /// Prompt of the `n`th generate call.
    pub fn prompt(&self, n: usize) -> String {
        let forms = self.forms.lock().unwrap();
        forms[n].inner_payload().unwrap()[0][0]
            .as_str()
            .unwrap()
            .to_string()
    }

    /// Continuation tuple of the `n`th generate call.
    pub fn continuation(&self, n: usize) -> Value {
        self.forms.lock().unwrap()[n].inner_payload().unwrap()[2].clone()
    }
}

#[async_trait]
impl WebTransport for FakeUpstream {
    async fn fetch_app_page(
        &self,
        cookies: &SessionCookies,
    ) -> Result<UpstreamResponse, UpstreamFailure> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.cookies_seen
            .lock()
            .unwrap()
            .push(cookies.secure_1psid.clone());
        let status = self.page_statuses.lock().unwrap().pop_front().unwrap_or(200);
        Ok(UpstreamResponse {
            status,
            body: APP_PAGE.to_string(),
        })
    }

    async fn post_generate(
        &self,
        _cookies: &SessionCookies,
        form: &GenerateForm,
    ) -> Result<UpstreamResponse, UpstreamFailure> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let n = self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.forms.lock().unwrap().push(form.clone());

        if !self.service_time.is_zero() {
            tokio::time::sleep(self.service_time).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some((status, body)) = self.generate_bodies.lock().unwrap().pop_front() {
            return Ok(UpstreamResponse { status, body });
        }
        let text = self
            .reply_texts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default_text.clone());
        Ok(UpstreamResponse {
            status: 200,
            body: wire_body(&text, &format!("c_{n}"), &format!("r_{n}"), &format!("rc_{n}")),
        })
    }
}

/// Config with bootstrap cookies and no stream pacing.
pub fn test_config() -> Config {
    let mut cfg = Config::default();
    cfg.providers.geminiweb.secure_1psid = Some("configured-psid".to_string());
    cfg.providers.geminiweb.secure_1psidts = Some("configured-psidts".to_string());
    cfg.stream.chunk_delay_ms = 0;
    cfg
}

pub fn app_with_config(fake: Arc<FakeUpstream>, cfg: &Config) -> Router {
    let providers = Providers::with_transport(fake, Arc::new(cfg.geminiweb()));
    let state = GatewayState::new(providers, cfg.stream.clone(), cfg.basic.gateway_key());
    gemgate_router(state)
}

pub fn app(fake: Arc<FakeUpstream>) -> Router {
    app_with_config(fake, &test_config())
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("failed to build request")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("failed to build request")
}

pub async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
    app.clone().oneshot(req).await.expect("request failed")
}

pub async fn body_text(resp: Response<Body>) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    String::from_utf8(bytes.to_vec()).expect("response body was not utf-8")
}

pub async fn body_json(resp: Response<Body>) -> Value {
    serde_json::from_str(&body_text(resp).await).expect("response body was not JSON")
}
