//! Session cookie sources: configuration, and the local browser cookie store
//! (Firefox `cookies.sqlite` or a Netscape `cookies.txt` export).

use crate::config::GeminiWebResolvedConfig;
use crate::error::AuthFailure;
use sqlx::{ConnectOptions, Connection, sqlite::SqliteConnectOptions};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const PSID_COOKIE: &str = "__Secure-1PSID";
pub const PSIDTS_COOKIE: &str = "__Secure-1PSIDTS";

const DOMAIN_SUFFIX: &str = "google.com";
const PREFERRED_HOSTS: [&str; 2] = [".google.com", "gemini.google.com"];
const SQLITE_MAGIC: &[u8] = b"SQLite format 3\0";

/// The two opaque session cookies. Never parsed, never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCookies {
    pub secure_1psid: String,
    pub secure_1psidts: Option<String>,
}

impl fmt::Debug for SessionCookies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCookies")
            .field("secure_1psid", &"<redacted>")
            .field("has_secure_1psidts", &self.secure_1psidts.is_some())
            .finish()
    }
}

impl SessionCookies {
    pub fn new(secure_1psid: impl Into<String>, secure_1psidts: Option<String>) -> Self {
        Self {
            secure_1psid: secure_1psid.into(),
            secure_1psidts: secure_1psidts.filter(|v| !v.trim().is_empty()),
        }
    }

    /// Per-request override from the simple chat shape; `None` when it carries
    /// no `__Secure-1PSID`.
    pub fn from_override(value: gemgate_schema::gemini::ChatCookies) -> Option<Self> {
        let psid = value.secure_1psid.trim();
        (!psid.is_empty()).then(|| SessionCookies::new(psid, value.secure_1psidts))
    }

    /// `Cookie` header value.
    pub fn header_value(&self) -> String {
        match &self.secure_1psidts {
            Some(ts) => format!("{PSID_COOKIE}={}; {PSIDTS_COOKIE}={ts}", self.secure_1psid),
            None => format!("{PSID_COOKIE}={}", self.secure_1psid),
        }
    }
}

/// Where stored sessions get their cookies from.
#[derive(Debug, Clone, Default)]
pub struct CookieSource {
    configured: Option<SessionCookies>,
    browser_store: Option<PathBuf>,
}

impl CookieSource {
    pub fn from_config(cfg: &GeminiWebResolvedConfig) -> Self {
        Self {
            configured: cfg
                .secure_1psid
                .as_ref()
                .map(|psid| SessionCookies::new(psid.clone(), cfg.secure_1psidts.clone())),
            browser_store: cfg.browser_cookie_db.clone(),
        }
    }

    pub fn fixed(cookies: SessionCookies) -> Self {
        Self {
            configured: Some(cookies),
            browser_store: None,
        }
    }

    pub fn browser_store(path: PathBuf) -> Self {
        Self {
            configured: None,
            browser_store: Some(path),
        }
    }

    /// Configuration first, then the browser store.
    pub async fn resolve(&self) -> Result<SessionCookies, AuthFailure> {
        if let Some(cookies) = &self.configured {
            debug!(channel = "geminiweb", source = "config", "Using configured session cookies");
            return Ok(cookies.clone());
        }

        let path = match &self.browser_store {
            Some(path) => Some(path.clone()),
            None => discover_firefox_store().await,
        };
        let Some(path) = path else {
            warn!(channel = "geminiweb", "No session cookies configured and no browser cookie store found");
            return Err(AuthFailure::MissingCookie);
        };

        match read_cookie_store(&path).await {
            Ok(entries) => pick_session_cookies(&entries).ok_or_else(|| {
                warn!(
                    channel = "geminiweb",
                    path = %path.display(),
                    "Browser cookie store holds no {PSID_COOKIE} for {DOMAIN_SUFFIX}"
                );
                AuthFailure::MissingCookie
            }),
            Err(e) => {
                warn!(
                    channel = "geminiweb",
                    path = %path.display(),
                    error = %e,
                    "Failed to read browser cookie store"
                );
                Err(AuthFailure::MissingCookie)
            }
        }
    }
}

/// One row of a browser cookie store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCookie {
    pub host: String,
    pub name: String,
    pub value: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CookieStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub async fn read_cookie_store(path: &Path) -> Result<Vec<StoredCookie>, CookieStoreError> {
    let bytes = tokio::fs::read(path).await?;
    if bytes.starts_with(SQLITE_MAGIC) {
        read_firefox_sqlite(path).await
    } else {
        Ok(parse_netscape(&String::from_utf8_lossy(&bytes)))
    }
}

async fn read_firefox_sqlite(path: &Path) -> Result<Vec<StoredCookie>, CookieStoreError> {
    // Firefox keeps the file locked while running; immutable mode skips locking.
    let mut conn = SqliteConnectOptions::new()
        .filename(path)
        .read_only(true)
        .immutable(true)
        .connect()
        .await?;

    let rows: Vec<(String, String, String)> = sqlx::query_as(
        "SELECT host, name, value FROM moz_cookies WHERE name IN (?1, ?2) AND host LIKE ?3",
    )
    .bind(PSID_COOKIE)
    .bind(PSIDTS_COOKIE)
    .bind(format!("%{DOMAIN_SUFFIX}"))
    .fetch_all(&mut conn)
    .await?;
    conn.close().await?;

    Ok(rows
        .into_iter()
        .map(|(host, name, value)| StoredCookie { host, name, value })
        .collect())
}

/// Parses a Netscape `cookies.txt` export
/// (`domain \t flag \t path \t secure \t expiry \t name \t value`).
pub fn parse_netscape(text: &str) -> Vec<StoredCookie> {
    text.lines()
        .filter_map(|line| {
            let line = line.strip_prefix("#HttpOnly_").unwrap_or(line);
            if line.trim().is_empty() || line.starts_with('#') {
                return None;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 7 {
                return None;
            }
            Some(StoredCookie {
                host: fields[0].trim().to_string(),
                name: fields[5].trim().to_string(),
                value: fields[6].trim().to_string(),
            })
        })
        .collect()
}

/// Picks the session cookies among `google.com` entries, preferring
/// `.google.com` and `gemini.google.com` hosts.
pub fn pick_session_cookies(entries: &[StoredCookie]) -> Option<SessionCookies> {
    let pick = |name: &str| {
        let matching: Vec<&StoredCookie> = entries
            .iter()
            .filter(|c| c.name == name && c.host.ends_with(DOMAIN_SUFFIX) && !c.value.is_empty())
            .collect();
        matching
            .iter()
            .find(|c| PREFERRED_HOSTS.contains(&c.host.as_str()))
            .or_else(|| matching.first())
            .map(|c| c.value.clone())
    };

    let psid = pick(PSID_COOKIE)?;
    Some(SessionCookies::new(psid, pick(PSIDTS_COOKIE)))
}

/// Looks for `cookies.sqlite` in the local Firefox profiles, favouring the
/// `default-release` profile.
async fn discover_firefox_store() -> Option<PathBuf> {
    let mut candidates = Vec::new();
    for root in firefox_profile_roots() {
        let Ok(mut dir) = tokio::fs::read_dir(&root).await else {
            continue;
        };
        while let Ok(Some(entry)) = dir.next_entry().await {
            let db = entry.path().join("cookies.sqlite");
            if tokio::fs::try_exists(&db).await.unwrap_or(false) {
                candidates.push(db);
            }
        }
    }
    candidates.sort_by_key(|p| !p.to_string_lossy().contains("default-release"));
    let found = candidates.into_iter().next();
    if let Some(path) = &found {
        debug!(channel = "geminiweb", path = %path.display(), "Discovered Firefox cookie store");
    }
    found
}

fn firefox_profile_roots() -> Vec<PathBuf> {
    let mut roots = Vec::new();
    if let Some(home) = dirs::home_dir() {
        roots.push(home.join(".mozilla/firefox"));
        roots.push(home.join("snap/firefox/common/.mozilla/firefox"));
    }
    if let Some(data) = dirs::data_dir() {
        roots.push(data.join("Firefox/Profiles"));
        roots.push(data.join("Mozilla/Firefox/Profiles"));
    }
    roots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookie(host: &str, name: &str, value: &str) -> StoredCookie {
        StoredCookie {
            host: host.to_string(),
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn preferred_host_wins() {
        let entries = vec![
            cookie("accounts.google.com", PSID_COOKIE, "accounts"),
            cookie(".google.com", PSID_COOKIE, "root"),
            cookie(".google.com.evil", PSID_COOKIE, "nope"),
            cookie("mail.google.com", PSIDTS_COOKIE, "ts-mail"),
        ];
        let picked = pick_session_cookies(&entries).unwrap();
        assert_eq!(picked.secure_1psid, "root");
        assert_eq!(picked.secure_1psidts.as_deref(), Some("ts-mail"));
    }

    #[test]
    fn missing_psid_yields_none() {
        let entries = vec![cookie(".google.com", PSIDTS_COOKIE, "ts")];
        assert!(pick_session_cookies(&entries).is_none());
    }

    #[test]
    fn netscape_export_parses() {
        let text = "# Netscape HTTP Cookie File\n\
                    \n\
                    #HttpOnly_.google.com\tTRUE\t/\tTRUE\t1999999999\t__Secure-1PSID\tg.a000abc\n\
                    .google.com\tTRUE\t/\tTRUE\t1999999999\t__Secure-1PSIDTS\tsidts-xyz\n\
                    .example.com\tTRUE\t/\tFALSE\t0\tother\tv\n\
                    broken line\n";
        let entries = parse_netscape(text);
        assert_eq!(entries.len(), 3);
        let picked = pick_session_cookies(&entries).unwrap();
        assert_eq!(picked.secure_1psid, "g.a000abc");
        assert_eq!(picked.secure_1psidts.as_deref(), Some("sidts-xyz"));
    }

    #[test]
    fn header_value_and_redacted_debug() {
        let cookies = SessionCookies::new("sid", Some("ts".to_string()));
        assert_eq!(
            cookies.header_value(),
            "__Secure-1PSID=sid; __Secure-1PSIDTS=ts"
        );
        assert!(!format!("{cookies:?}").contains("\"sid\""));
        let only = SessionCookies::new("sid", Some(" ".to_string()));
        assert_eq!(only.header_value(), "__Secure-1PSID=sid");
    }

    #[tokio::test]
    async fn explicit_missing_store_is_missing_cookie() {
        let source = CookieSource {
            configured: None,
            browser_store: Some(PathBuf::from("/nonexistent/gemgate/cookies.sqlite")),
        };
        assert_eq!(source.resolve().await, Err(AuthFailure::MissingCookie));
    }

    #[tokio::test]
    async fn netscape_file_on_disk_resolves() {
        let mut path = std::env::temp_dir();
        path.push(format!("gemgate-cookies-{}.txt", std::process::id()));
        tokio::fs::write(
            &path,
            "gemini.google.com\tFALSE\t/\tTRUE\t0\t__Secure-1PSID\tfrom-file\n",
        )
        .await
        .unwrap();

        let source = CookieSource {
            configured: None,
            browser_store: Some(path.clone()),
        };
        let cookies = source.resolve().await.unwrap();
        assert_eq!(cookies.secure_1psid, "from-file");
        assert!(cookies.secure_1psidts.is_none());

        let _ = tokio::fs::remove_file(&path).await;
    }
}
