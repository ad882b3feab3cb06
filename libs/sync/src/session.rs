//! Session context handed to network-issuing components.

use std::time::Duration;

/// Per-call timeout used when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Where to reach the API and how to authenticate.
///
/// There is no ambient token: whoever builds an [`HttpApi`](crate::HttpApi)
/// passes a session explicitly.
#[derive(Clone)]
pub struct Session {
    api_url: String,
    token: Option<String>,
    request_timeout: Duration,
}

impl Session {
    /// Create an unauthenticated session for `api_url`.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Attach a bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Bound every request by `timeout`.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// `Authorization` header value, accepting tokens with or without the
    /// `Bearer ` prefix.
    pub fn bearer(&self) -> Option<String> {
        let raw = self.token.as_deref()?.trim();
        if raw.starts_with("Bearer ") || raw.starts_with("bearer ") {
            Some(raw.to_string())
        } else {
            Some(format!("Bearer {raw}"))
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_prefix_added_once() {
        let session = Session::new("http://localhost:4000").with_token("abc");
        assert_eq!(session.bearer().as_deref(), Some("Bearer abc"));

        let session = Session::new("http://localhost:4000").with_token("Bearer abc");
        assert_eq!(session.bearer().as_deref(), Some("Bearer abc"));

        assert!(Session::new("http://localhost:4000").bearer().is_none());
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let session = Session::new("http://localhost:4000/api/");
        assert_eq!(session.api_url(), "http://localhost:4000/api");
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = Session::new("http://localhost:4000").with_token("secret");
        let rendered = format!("{session:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
