//! Per-request context for the MCP session header.
//!
//! Nothing is stored server-side: the id is read from `mcp-session-id` when the
//! client sends one, otherwise generated, and echoed back on the response.

use axum::http::HeaderMap;

pub const SESSION_HEADER: &str = "mcp-session-id";

/// Longest session id accepted from a client before a fresh one is issued.
const MAX_SESSION_ID_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub session_id: String,
    /// True when the id came from the client rather than being generated here.
    pub resumed: bool,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            resumed: false,
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        let existing = headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|id| is_valid_session_id(id));

        match existing {
            Some(id) => Self {
                session_id: id.to_string(),
                resumed: true,
            },
            None => Self::new(),
        }
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Visible ASCII only, so the id can be echoed as a header value.
fn is_valid_session_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= MAX_SESSION_ID_LEN && id.bytes().all(|b| (0x21..=0x7e).contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_reuses_client_session_id() {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, HeaderValue::from_static("abc-123"));
        let ctx = RequestContext::from_headers(&headers);
        assert_eq!(ctx.session_id, "abc-123");
        assert!(ctx.resumed);
    }

    #[test]
    fn test_generates_when_absent_or_invalid() {
        let ctx = RequestContext::from_headers(&HeaderMap::new());
        assert!(!ctx.resumed);
        assert!(uuid::Uuid::parse_str(&ctx.session_id).is_ok());

        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, HeaderValue::from_static("has space"));
        assert!(!RequestContext::from_headers(&headers).resumed);

        let other = RequestContext::new();
        assert_ne!(ctx.session_id, other.session_id);
    }
}
