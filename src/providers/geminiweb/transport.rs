use super::{GEMINIWEB_USER_AGENT, GENERATE_PATH, codec::GenerateForm, cookies::SessionCookies};
use crate::config::GeminiWebResolvedConfig;
use crate::error::UpstreamFailure;
use async_trait::async_trait;
use reqwest::header::{CONNECTION, COOKIE, HeaderMap, HeaderValue, ORIGIN, REFERER};
use std::time::Duration;
use url::Url;

/// Status and raw body of an upstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

/// HTTP seam to the web app. Production uses [`ReqwestTransport`]; tests
/// plug in an instrumented fake.
#[async_trait]
pub trait WebTransport: Send + Sync {
    /// GET the app root page with the session cookies.
    async fn fetch_app_page(
        &self,
        cookies: &SessionCookies,
    ) -> Result<UpstreamResponse, UpstreamFailure>;

    /// POST one `StreamGenerate` form.
    async fn post_generate(
        &self,
        cookies: &SessionCookies,
        form: &GenerateForm,
    ) -> Result<UpstreamResponse, UpstreamFailure>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: Url,
    generate_url: Url,
}

impl ReqwestTransport {
    pub fn new(cfg: &GeminiWebResolvedConfig) -> Result<Self, UpstreamFailure> {
        let mut base_url = cfg.base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let generate_url = base_url
            .join(GENERATE_PATH)
            .map_err(|e| UpstreamFailure::transport(format!("invalid base_url: {e}")))?;
        let client = build_client(cfg.proxy.as_ref(), cfg.enable_multiplexing)
            .map_err(|e| UpstreamFailure::transport(format!("build http client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            generate_url,
        })
    }

    fn origin(&self) -> String {
        self.base_url.origin().ascii_serialization()
    }
}

fn build_client(proxy: Option<&Url>, enable_multiplexing: bool) -> reqwest::Result<reqwest::Client> {
    let mut headers = HeaderMap::new();

    let mut builder = reqwest::Client::builder()
        .user_agent(GEMINIWEB_USER_AGENT)
        .redirect(reqwest::redirect::Policy::none())
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(10 * 60));

    if let Some(proxy_url) = proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
    }

    if enable_multiplexing {
        builder = builder.http2_adaptive_window(true);
    } else {
        headers.insert(CONNECTION, HeaderValue::from_static("close"));

        builder = builder
            .http1_only()
            .pool_max_idle_per_host(0)
            .pool_idle_timeout(Duration::from_secs(0));
    }

    builder.default_headers(headers).build()
}

fn cookie_header(cookies: &SessionCookies) -> Result<HeaderValue, UpstreamFailure> {
    let mut value = HeaderValue::from_str(&cookies.header_value())
        .map_err(|_| UpstreamFailure::transport("cookie value is not a valid header"))?;
    value.set_sensitive(true);
    Ok(value)
}

async fn into_upstream_response(
    resp: reqwest::Response,
) -> Result<UpstreamResponse, UpstreamFailure> {
    let status = resp.status().as_u16();
    let body = resp
        .text()
        .await
        .map_err(|e| UpstreamFailure::transport(format!("read body: {e}")))?;
    Ok(UpstreamResponse { status, body })
}

#[async_trait]
impl WebTransport for ReqwestTransport {
    async fn fetch_app_page(
        &self,
        cookies: &SessionCookies,
    ) -> Result<UpstreamResponse, UpstreamFailure> {
        let resp = self
            .client
            .get(self.base_url.clone())
            .header(COOKIE, cookie_header(cookies)?)
            .send()
            .await
            .map_err(|e| UpstreamFailure::transport(format!("fetch app page: {e}")))?;
        into_upstream_response(resp).await
    }

    async fn post_generate(
        &self,
        cookies: &SessionCookies,
        form: &GenerateForm,
    ) -> Result<UpstreamResponse, UpstreamFailure> {
        let origin = self.origin();
        let resp = self
            .client
            .post(self.generate_url.clone())
            .query(&form.query_pairs())
            .header(COOKIE, cookie_header(cookies)?)
            .header("X-Same-Domain", "1")
            .header(ORIGIN, origin.as_str())
            .header(REFERER, format!("{origin}/"))
            .form(&form.form_pairs())
            .send()
            .await
            .map_err(|e| UpstreamFailure::transport(format!("post generate: {e}")))?;
        into_upstream_response(resp).await
    }
}
