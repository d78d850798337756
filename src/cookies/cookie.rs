//! The stored cookie record and its request-matching rules.

use std::fmt;
use std::time::SystemTime;

/// A single cookie received from a `Set-Cookie` response header.
///
/// The value field is intentionally redacted in Debug output to prevent
/// accidental logging of session credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Cookie {
    /// Cookie name.
    pub name: String,
    /// Domain the cookie is scoped to, without a leading dot.
    pub domain: String,
    /// URL path prefix the cookie applies to.
    pub path: String,
    /// Expiry instant; `None` for a session cookie.
    pub expires: Option<SystemTime>,
    /// Whether the cookie may only travel over HTTPS.
    pub secure: bool,
    /// Whether the server marked the cookie `HttpOnly`.
    pub http_only: bool,
    /// Raw `SameSite` attribute value, if any.
    pub same_site: Option<String>,
    /// `true` when the header carried no `Domain` attribute.
    pub host_only: bool,
    /// When this entry was stored.
    pub creation_time: SystemTime,
    /// Cookie value. Sensitive; never log it.
    value: String,
}

impl Cookie {
    /// Creates a host-only session cookie with path `/`.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            domain: host.into(),
            path: "/".to_string(),
            expires: None,
            secure: false,
            http_only: false,
            same_site: None,
            host_only: true,
            creation_time: SystemTime::now(),
            value: value.into(),
        }
    }

    /// Returns the cookie value.
    ///
    /// Cookie values are sensitive; avoid logging the return value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns true when `other` occupies the same `(name, domain, path)` slot.
    #[must_use]
    pub fn same_key(&self, other: &Cookie) -> bool {
        self.name == other.name && self.domain == other.domain && self.path == other.path
    }

    /// Returns true once `now` is strictly past the expiry instant.
    #[must_use]
    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        self.expires.is_some_and(|expires| expires < now)
    }

    /// Host-only cookies need an exact host; domain cookies also accept
    /// any proper subdomain.
    #[must_use]
    pub fn matches_host(&self, host: &str) -> bool {
        let host = host.to_ascii_lowercase();
        let domain = self.domain.to_ascii_lowercase();
        if host == domain {
            return true;
        }
        if self.host_only {
            return false;
        }
        host.strip_suffix(domain.as_str())
            .is_some_and(|prefix| prefix.ends_with('.'))
    }

    /// Simple prefix test on the request path.
    #[must_use]
    pub fn matches_path(&self, request_path: &str) -> bool {
        request_path.starts_with(&self.path)
    }

    /// Renders the `name=value` pair sent back in a `Cookie` header.
    #[must_use]
    pub fn pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

// Custom Debug impl that redacts the cookie value.
impl fmt::Debug for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cookie")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .field("domain", &self.domain)
            .field("path", &self.path)
            .field("expires", &self.expires)
            .field("secure", &self.secure)
            .field("http_only", &self.http_only)
            .field("same_site", &self.same_site)
            .field("host_only", &self.host_only)
            .finish_non_exhaustive()
    }
}
