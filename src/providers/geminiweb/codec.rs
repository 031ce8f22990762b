//! Wire codec for the web app's `StreamGenerate` endpoint.
//!
//! Request: a form post carrying `at` and a doubly JSON-encoded `f.req`.
//! Response: a guard-prefixed, length-chunked sequence of JSON arrays whose
//! `wrb.fr` frames wrap a second JSON document with the answer inside.

use crate::error::UpstreamFailure;
use serde_json::{Value, json};

/// Anti-XSSI prefix on every upstream JSON body.
pub const GUARD_PREFIX: &str = ")]}'";

const FRAME_TAG: &str = "wrb.fr";
const ERROR_FRAME_TAG: &str = "er";
const DEFAULT_FINISH_REASON: &str = "stop";

/// Continuation keys of a conversation. Either all three are empty (new
/// conversation) or all three are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionKeys {
    pub conversation_id: String,
    pub response_id: String,
    pub choice_id: String,
}

impl SessionKeys {
    pub fn is_empty(&self) -> bool {
        self.conversation_id.is_empty() && self.response_id.is_empty() && self.choice_id.is_empty()
    }

    fn metadata(&self) -> Value {
        if self.is_empty() {
            json!([null, null, null])
        } else {
            json!([self.conversation_id, self.response_id, self.choice_id])
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyMetadata {
    pub cid: Option<String>,
    pub rid: Option<String>,
    pub rcid: Option<String>,
}

/// Fully received upstream answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub metadata: ReplyMetadata,
    pub finish_reason: String,
}

impl Reply {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: ReplyMetadata::default(),
            finish_reason: DEFAULT_FINISH_REASON.to_string(),
        }
    }

    /// Continuation keys carried by this reply, only when all three are present.
    pub fn session_keys(&self) -> Option<SessionKeys> {
        let ReplyMetadata { cid, rid, rcid } = &self.metadata;
        match (cid, rid, rcid) {
            (Some(cid), Some(rid), Some(rcid)) => Some(SessionKeys {
                conversation_id: cid.clone(),
                response_id: rid.clone(),
                choice_id: rcid.clone(),
            }),
            _ => None,
        }
    }
}

/// Everything the transport needs to post one generate call.
#[derive(Clone, PartialEq, Eq)]
pub struct GenerateForm {
    pub at: String,
    pub f_req: String,
    pub build_label: Option<String>,
    pub req_id: u32,
}

impl std::fmt::Debug for GenerateForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerateForm")
            .field("at", &"<redacted>")
            .field("f_req_len", &self.f_req.len())
            .field("build_label", &self.build_label)
            .field("req_id", &self.req_id)
            .finish()
    }
}

impl GenerateForm {
    /// URL query: `bl` (when known), `_reqid`, `rt=c` and `at`.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(4);
        if let Some(bl) = &self.build_label {
            pairs.push(("bl", bl.clone()));
        }
        pairs.push(("_reqid", self.req_id.to_string()));
        pairs.push(("rt", "c".to_string()));
        pairs.push(("at", self.at.clone()));
        pairs
    }

    /// Form body fields.
    pub fn form_pairs(&self) -> [(&'static str, &str); 2] {
        [("at", self.at.as_str()), ("f.req", self.f_req.as_str())]
    }

    /// Inner `[[prompt], null, [cid, rid, rcid]]` tuple, decoded back from `f.req`.
    pub fn inner_payload(&self) -> Option<Value> {
        let outer: Value = serde_json::from_str(&self.f_req).ok()?;
        let inner = outer.get(1)?.as_str()?;
        serde_json::from_str(inner).ok()
    }
}

pub fn encode_generate_form(
    prompt: &str,
    keys: &SessionKeys,
    at: &str,
    build_label: Option<&str>,
    req_id: u32,
) -> Result<GenerateForm, UpstreamFailure> {
    let inner = json!([[prompt], null, keys.metadata()]);
    let inner_json = serde_json::to_string(&inner)
        .map_err(|e| UpstreamFailure::parse(format!("encode f.req inner payload: {e}")))?;
    let f_req = serde_json::to_string(&json!([null, inner_json]))
        .map_err(|e| UpstreamFailure::parse(format!("encode f.req wrapper: {e}")))?;

    Ok(GenerateForm {
        at: at.to_string(),
        f_req,
        build_label: build_label.map(str::to_string),
        req_id,
    })
}

/// Decodes one upstream generate response.
///
/// Frames are scanned in order; among the frames carrying an answer the one
/// with the longest text wins (later frames extend earlier partial ones), and
/// inside a frame the first candidate is always taken.
pub fn decode_reply(status: u16, body: &str) -> Result<Reply, UpstreamFailure> {
    if status != 200 {
        return Err(UpstreamFailure::http(
            status,
            format!("generate returned HTTP {status}"),
        ));
    }

    let trimmed = body.trim_start();
    let payload = trimmed.strip_prefix(GUARD_PREFIX).unwrap_or(trimmed);
    if payload.trim().is_empty() {
        return Err(UpstreamFailure::empty("body holds only the guard prefix"));
    }

    let mut scan = FrameScan::default();
    for line in payload.lines().map(str::trim) {
        if !line.starts_with('[') {
            continue;
        }
        if let Ok(value) = serde_json::from_str::<Value>(line) {
            scan.parsed_lines += 1;
            scan.visit(&value);
        }
    }
    if scan.parsed_lines == 0 {
        // Not chunked: the whole payload may be a single JSON document.
        if let Ok(value) = serde_json::from_str::<Value>(payload.trim()) {
            scan.parsed_lines += 1;
            scan.visit(&value);
        }
    }

    if let Some(reply) = scan.best {
        return Ok(reply);
    }
    if let Some(code) = scan.error_status {
        return Err(UpstreamFailure::http(
            code,
            format!("error frame reported status {code}"),
        ));
    }
    if scan.blocked {
        return Err(UpstreamFailure::blocked(
            "answer frame withheld by upstream safety filter",
        ));
    }
    if scan.parsed_lines == 0 {
        return Err(UpstreamFailure::parse("no JSON document after guard prefix"));
    }
    if let Some(detail) = scan.payload_error {
        return Err(UpstreamFailure::parse(detail));
    }
    Err(UpstreamFailure::empty("no candidate text in response frames"))
}

#[derive(Default)]
struct FrameScan {
    parsed_lines: usize,
    best: Option<Reply>,
    error_status: Option<u16>,
    blocked: bool,
    payload_error: Option<String>,
}

impl FrameScan {
    /// Accepts either a single frame or an array of frames.
    fn visit(&mut self, value: &Value) {
        let Some(items) = value.as_array() else {
            return;
        };
        if items.first().and_then(Value::as_str).is_some() {
            self.visit_frame(items);
            return;
        }
        for item in items {
            if let Some(frame) = item.as_array() {
                self.visit_frame(frame);
            }
        }
    }

    fn visit_frame(&mut self, frame: &[Value]) {
        match frame.first().and_then(Value::as_str) {
            Some(FRAME_TAG) => self.visit_answer_frame(frame),
            Some(ERROR_FRAME_TAG) => {
                let code = frame
                    .iter()
                    .skip(1)
                    .find_map(Value::as_u64)
                    .and_then(|c| u16::try_from(c).ok());
                if let Some(code @ 400..=599) = code {
                    // 401/403 mark auth expiry and outrank other codes.
                    let auth = matches!(code, 401 | 403);
                    if auth || self.error_status.is_none() {
                        self.error_status = Some(code);
                    }
                }
            }
            _ => {}
        }
    }

    fn visit_answer_frame(&mut self, frame: &[Value]) {
        let Some(raw) = frame.get(2).and_then(Value::as_str) else {
            if frame.get(5).is_some_and(Value::is_array) {
                self.blocked = true;
            }
            return;
        };

        let inner: Value = match serde_json::from_str(raw) {
            Ok(inner) => inner,
            Err(e) => {
                self.payload_error = Some(format!("answer frame payload is not JSON: {e}"));
                return;
            }
        };

        let Some(reply) = reply_from_payload(&inner) else {
            return;
        };
        let longer = self
            .best
            .as_ref()
            .is_none_or(|best| reply.text.len() > best.text.len());
        if longer {
            self.best = Some(reply);
        }
    }
}

/// Reads `inner[4][0][1][0]` (text), `inner[4][0][0]` (rcid) and
/// `inner[1][0..2]` (cid, rid).
fn reply_from_payload(inner: &Value) -> Option<Reply> {
    let candidate = inner.get(4)?.get(0)?;
    let text = candidate.get(1)?.get(0)?.as_str()?;
    if text.is_empty() {
        return None;
    }

    let string_at = |v: Option<&Value>| {
        v.and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let ids = inner.get(1);

    let mut reply = Reply::new(text);
    reply.metadata = ReplyMetadata {
        cid: string_at(ids.and_then(|i| i.get(0))),
        rid: string_at(ids.and_then(|i| i.get(1))),
        rcid: string_at(candidate.get(0)),
    };
    Some(reply)
}

/// Extracts the quoted value following `"<key>":"` in an HTML page.
pub(crate) fn scrape_quoted(html: &str, key: &str) -> Option<String> {
    let needle = format!("\"{key}\":\"");
    let start = html.find(&needle)? + needle.len();
    let rest = &html[start..];
    let end = rest.find('"')?;
    let value = rest[..end].trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpstreamFailureKind;

    const OK: &str = include_str!("fixtures/generate_ok.txt");
    const MULTI: &str = include_str!("fixtures/generate_multi_candidate.txt");
    const GUARD_ONLY: &str = include_str!("fixtures/generate_guard_only.txt");
    const BLOCKED: &str = include_str!("fixtures/generate_blocked.txt");
    const AUTH_EXPIRED: &str = include_str!("fixtures/generate_auth_expired.txt");
    const NO_FRAMES: &str = include_str!("fixtures/generate_no_frames.txt");

    #[test]
    fn recorded_body_decodes_final_text_and_keys() {
        let reply = decode_reply(200, OK).unwrap();
        assert_eq!(
            reply.text,
            "Rust is a systems programming language focused on safety."
        );
        assert_eq!(reply.finish_reason, "stop");
        assert_eq!(
            reply.session_keys(),
            Some(SessionKeys {
                conversation_id: "c_1f2e3d4c5b6a7980".to_string(),
                response_id: "r_0a1b2c3d4e5f6071".to_string(),
                choice_id: "rc_9f8e7d6c5b4a3920".to_string(),
            })
        );
    }

    #[test]
    fn first_candidate_wins_within_a_frame() {
        let reply = decode_reply(200, MULTI).unwrap();
        assert_eq!(reply.text, "first draft");
        assert_eq!(reply.metadata.rcid.as_deref(), Some("rc_first"));
    }

    #[test]
    fn guard_prefix_only_is_empty() {
        let err = decode_reply(200, GUARD_ONLY).unwrap_err();
        assert_eq!(err.kind, UpstreamFailureKind::Empty);
    }

    #[test]
    fn withheld_answer_frame_is_blocked() {
        let err = decode_reply(200, BLOCKED).unwrap_err();
        assert_eq!(err.kind, UpstreamFailureKind::Blocked);
    }

    #[test]
    fn error_frame_with_401_is_auth_expiry() {
        let err = decode_reply(200, AUTH_EXPIRED).unwrap_err();
        assert_eq!(err.kind, UpstreamFailureKind::Http);
        assert_eq!(err.status, Some(401));
    }

    #[test]
    fn error_frame_with_other_status_is_http_failure() {
        let body = ")]}'\n\n[[\"er\",null,null,null,null,429,null,null,null,8],[\"di\",21]]\n";
        let err = decode_reply(200, body).unwrap_err();
        assert_eq!(err.kind, UpstreamFailureKind::Http);
        assert_eq!(err.status, Some(429));

        let both = ")]}'\n\n[[\"er\",null,500],[\"er\",null,403]]\n";
        assert_eq!(decode_reply(200, both).unwrap_err().status, Some(403));
    }

    #[test]
    fn frames_without_answer_are_empty() {
        let err = decode_reply(200, NO_FRAMES).unwrap_err();
        assert_eq!(err.kind, UpstreamFailureKind::Empty);
    }

    #[test]
    fn non_200_is_http_failure() {
        let err = decode_reply(500, OK).unwrap_err();
        assert_eq!(err.kind, UpstreamFailureKind::Http);
        assert_eq!(err.status, Some(500));
    }

    #[test]
    fn html_body_is_parse_failure() {
        let err = decode_reply(200, "<!doctype html><html></html>").unwrap_err();
        assert_eq!(err.kind, UpstreamFailureKind::Parse);
    }

    #[test]
    fn new_conversation_encodes_three_nulls() {
        let form = encode_generate_form("User: ping", &SessionKeys::default(), "tok", None, 123_456)
            .unwrap();
        assert_eq!(
            form.inner_payload(),
            Some(json!([["User: ping"], null, [null, null, null]]))
        );
        let outer: Value = serde_json::from_str(&form.f_req).unwrap();
        assert!(outer[0].is_null());
        assert!(outer[1].is_string());
        assert_eq!(form.form_pairs()[0], ("at", "tok"));
        assert_eq!(
            form.query_pairs(),
            vec![
                ("_reqid", "123456".to_string()),
                ("rt", "c".to_string()),
                ("at", "tok".to_string()),
            ]
        );
    }

    #[test]
    fn continuation_encodes_keys() {
        let keys = SessionKeys {
            conversation_id: "c".to_string(),
            response_id: "r".to_string(),
            choice_id: "rc".to_string(),
        };
        let form = encode_generate_form("p \"quoted\"", &keys, "tok", Some("boq_x"), 1).unwrap();
        assert_eq!(
            form.inner_payload(),
            Some(json!([["p \"quoted\""], null, ["c", "r", "rc"]]))
        );
        assert_eq!(form.query_pairs()[0], ("bl", "boq_x".to_string()));
    }

    #[test]
    fn scrape_finds_token_and_trims() {
        let html = r#"<script>WIZ_global_data = {"cfb2h":"boq_assistant-bard-web-server_20250101.00_p0","SNlM0e":" AFaketoken:1700000000000 ","x":1};</script>"#;
        assert_eq!(
            scrape_quoted(html, "SNlM0e").as_deref(),
            Some("AFaketoken:1700000000000")
        );
        assert_eq!(
            scrape_quoted(html, "cfb2h").as_deref(),
            Some("boq_assistant-bard-web-server_20250101.00_p0")
        );
        assert!(scrape_quoted(html, "thykhd").is_none());
        assert!(scrape_quoted(r#"{"SNlM0e":""}"#, "SNlM0e").is_none());
    }
}
