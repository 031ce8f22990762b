mod codec;
mod cookies;
mod driver;
mod session;
mod transport;

pub use codec::{GenerateForm, Reply, ReplyMetadata, SessionKeys, decode_reply};
pub use cookies::{CookieSource, SessionCookies};
pub use driver::UpstreamDriver;
pub use transport::{ReqwestTransport, UpstreamResponse, WebTransport};

/// Desktop browser User-Agent; the web app serves a degraded page to unknown agents.
pub(crate) const GEMINIWEB_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Generate endpoint, relative to the configured base URL.
const GENERATE_PATH: &str = "_/BardChatUi/data/assistant.lamda.BardFrontendService/StreamGenerate";
