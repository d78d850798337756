//! Error types for API calls.
//!
//! Every failure a caller can see is an [`ApiError`]. [`ApiError::kind`]
//! collapses the variants onto the categories callers branch on: transport
//! failures, API error responses, authentication protocol failures, and
//! rejected parameter combinations.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Coarse classification of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The call did not complete, or a success reply was unreadable.
    Transport,
    /// The server answered with a non-success status.
    Api,
    /// Login or logout could not be completed.
    Auth,
    /// The caller combined parameters the API does not accept.
    Validation,
    /// The client could not be constructed.
    Config,
}

/// Errors that can occur while talking to the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level error (DNS resolution, connection refused, TLS, timeout).
    #[error("network error calling {url}: {source}")]
    Transport {
        /// The URL that was being called.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// A success response whose body was not valid JSON.
    #[error("invalid JSON in HTTP {status} response from {url}: {source}")]
    Decode {
        /// The URL that was called.
        url: String,
        /// The (successful) HTTP status.
        status: u16,
        /// The parse failure.
        #[source]
        source: serde_json::Error,
    },

    /// Non-success HTTP response.
    #[error("{0}")]
    Api(Box<ApiFailure>),

    /// Login/logout precondition or protocol violation.
    #[error("authentication failed: {reason}")]
    Auth {
        /// What went wrong.
        reason: String,
    },

    /// Invalid combination of call parameters; never sent to the network.
    #[error("invalid request: {message}")]
    Validation {
        /// Which parameters clash.
        message: String,
    },

    /// The configured API URL is malformed.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The rejected URL string.
        url: String,
    },

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        /// The builder error.
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    /// Creates a transport error from a reqwest error.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    /// Creates a decode error for an unreadable success body.
    pub fn decode(url: impl Into<String>, status: u16, source: serde_json::Error) -> Self {
        Self::Decode {
            url: url.into(),
            status,
            source,
        }
    }

    /// Creates an API error from a non-success status and its raw body.
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api(Box::new(ApiFailure::from_response(status, body.into())))
    }

    /// Creates an authentication error.
    pub fn auth(reason: impl Into<String>) -> Self {
        Self::Auth {
            reason: reason.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Returns the error category.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } | Self::Decode { .. } => ErrorKind::Transport,
            Self::Api(_) => ErrorKind::Api,
            Self::Auth { .. } => ErrorKind::Auth,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::InvalidUrl { .. } | Self::ClientBuild { .. } => ErrorKind::Config,
        }
    }

    /// Returns the API failure details for [`ApiError::Api`].
    #[must_use]
    pub fn as_api_failure(&self) -> Option<&ApiFailure> {
        match self {
            Self::Api(failure) => Some(&**failure),
            _ => None,
        }
    }

    /// HTTP status, when a response was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api(failure) => Some(failure.status),
            Self::Decode { status, .. } => Some(*status),
            Self::Transport { source, .. } => source.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}

// We intentionally do NOT implement `From<reqwest::Error>`: the transport
// variant needs the URL, which the source error does not reliably carry.

/// Details of a non-success HTTP response.
#[derive(Debug, Clone)]
pub struct ApiFailure {
    status: u16,
    code: Option<String>,
    info: Option<String>,
    body: String,
    parsed: Option<Value>,
}

impl ApiFailure {
    /// Classifies a non-success response body.
    ///
    /// The body may be arbitrary text; when it parses as JSON with an
    /// `error` object, its `code` and `info` strings are extracted.
    #[must_use]
    pub fn from_response(status: u16, body: String) -> Self {
        let parsed = serde_json::from_str::<Value>(&body).ok();
        let error_object = parsed.as_ref().and_then(|value| value.get("error"));
        let field = |name: &str| {
            error_object
                .and_then(|error| error.get(name))
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        Self {
            status,
            code: field("code"),
            info: field("info"),
            body,
            parsed,
        }
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Machine-readable API error code.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Human-readable API error description.
    #[must_use]
    pub fn info(&self) -> Option<&str> {
        self.info.as_deref()
    }

    /// Raw response text.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Response body as JSON, when it parsed.
    #[must_use]
    pub fn parsed(&self) -> Option<&Value> {
        self.parsed.as_ref()
    }
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.code, &self.info) {
            (Some(code), Some(info)) => {
                write!(f, "API error {code}: {info} (HTTP {})", self.status)
            }
            (None, Some(info)) => write!(f, "API error: {info} (HTTP {})", self.status),
            (Some(code), None) => write!(f, "API error {code} (HTTP {})", self.status),
            (None, None) => write!(f, "request failed with status {}", self.status),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_with_code_and_info() {
        let error = ApiError::api(403, r#"{"error":{"code":"badtoken","info":"Invalid token"}}"#);
        let failure = error.as_api_failure().unwrap();
        assert_eq!(failure.status(), 403);
        assert_eq!(failure.code(), Some("badtoken"));
        assert_eq!(failure.info(), Some("Invalid token"));
        assert!(failure.parsed().is_some());

        let msg = error.to_string();
        assert!(msg.contains("badtoken"), "Expected code in: {msg}");
        assert!(msg.contains("Invalid token"), "Expected info in: {msg}");
        assert_eq!(error.kind(), ErrorKind::Api);
        assert_eq!(error.status(), Some(403));
    }

    #[test]
    fn test_api_error_with_code_only() {
        let error = ApiError::api(400, r#"{"error":{"code":"maxlag"}}"#);
        let msg = error.to_string();
        assert!(msg.contains("maxlag"), "Expected code in: {msg}");
        assert!(msg.contains("400"), "Expected status in: {msg}");
    }

    #[test]
    fn test_api_error_with_info_only() {
        let error = ApiError::api(500, r#"{"error":{"info":"Database is locked"}}"#);
        assert_eq!(
            error.to_string(),
            "API error: Database is locked (HTTP 500)"
        );
    }

    #[test]
    fn test_api_error_plain_text_body() {
        let error = ApiError::api(502, "<html>Bad Gateway</html>");
        let failure = error.as_api_failure().unwrap();
        assert_eq!(failure.body(), "<html>Bad Gateway</html>");
        assert!(failure.parsed().is_none());
        assert!(failure.code().is_none());
        assert_eq!(error.to_string(), "request failed with status 502");
    }

    #[test]
    fn test_api_error_json_without_error_object() {
        let error = ApiError::api(404, r#"{"message":"nope"}"#);
        let failure = error.as_api_failure().unwrap();
        assert!(failure.parsed().is_some());
        assert_eq!(error.to_string(), "request failed with status 404");
    }

    #[test]
    fn test_decode_error_is_transport_kind() {
        let source = serde_json::from_str::<Value>("not json").unwrap_err();
        let error = ApiError::decode("https://example.org/w/api.php", 200, source);
        assert_eq!(error.kind(), ErrorKind::Transport);
        assert_eq!(error.status(), Some(200));
        assert!(error.to_string().contains("invalid JSON"));
    }

    #[test]
    fn test_auth_and_validation_kinds() {
        let auth = ApiError::auth("missing login token");
        assert_eq!(auth.kind(), ErrorKind::Auth);
        assert!(auth.to_string().contains("missing login token"));

        let validation = ApiError::validation("titles and pageids cannot be combined");
        assert_eq!(validation.kind(), ErrorKind::Validation);
        assert!(validation.status().is_none());
    }

    #[test]
    fn test_invalid_url_display() {
        let error = ApiError::invalid_url("not-a-url");
        let msg = error.to_string();
        assert!(msg.contains("invalid URL"), "Expected 'invalid URL' in: {msg}");
        assert_eq!(error.kind(), ErrorKind::Config);
    }
}
