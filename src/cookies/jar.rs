//! In-memory cookie jar shared by every request a client makes.

use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

use tracing::{debug, trace};
use url::Url;

use super::cookie::Cookie;
use super::parse::{CookieError, parse_set_cookie};

/// Ordered, thread-safe cookie store.
///
/// Iteration follows insertion order. A cookie that replaces an existing
/// `(name, domain, path)` entry takes over that entry's position. Expired
/// cookies are never purged, only skipped at selection time.
#[derive(Debug, Default)]
pub struct CookieJar {
    cookies: RwLock<Vec<Cookie>>,
}

impl CookieJar {
    /// Creates an empty jar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses one `Set-Cookie` header value received from `origin_host` and
    /// stores the result.
    ///
    /// # Errors
    ///
    /// Returns [`CookieError`] when the header carries no usable
    /// `name=value` pair; the jar is left unchanged in that case.
    pub fn ingest(&self, set_cookie: &str, origin_host: &str) -> Result<(), CookieError> {
        let cookie = parse_set_cookie(set_cookie, origin_host)?;
        debug!(
            name = %cookie.name,
            domain = %cookie.domain,
            path = %cookie.path,
            host_only = cookie.host_only,
            "storing cookie"
        );
        self.store(cookie);
        Ok(())
    }

    /// Stores a cookie, replacing any entry with the same
    /// `(name, domain, path)` key.
    pub fn store(&self, cookie: Cookie) {
        let mut cookies = self
            .cookies
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match cookies.iter_mut().find(|existing| existing.same_key(&cookie)) {
            Some(existing) => *existing = cookie,
            None => cookies.push(cookie),
        }
    }

    /// Returns the cookies that apply to a request against `url`.
    #[must_use]
    pub fn cookies_for(&self, url: &Url) -> Vec<Cookie> {
        self.cookies_for_at(url, SystemTime::now())
    }

    /// Like [`cookies_for`](Self::cookies_for) with an explicit clock.
    #[must_use]
    pub fn cookies_for_at(&self, url: &Url, now: SystemTime) -> Vec<Cookie> {
        let Some(host) = url.host_str() else {
            return Vec::new();
        };
        let secure_scheme = url.scheme().eq_ignore_ascii_case("https");
        let path = url.path();

        let cookies = self.cookies.read().unwrap_or_else(PoisonError::into_inner);
        let selected: Vec<Cookie> = cookies
            .iter()
            .filter(|cookie| !cookie.is_expired_at(now))
            .filter(|cookie| !cookie.secure || secure_scheme)
            .filter(|cookie| cookie.matches_host(host))
            .filter(|cookie| cookie.matches_path(path))
            .cloned()
            .collect();

        trace!(
            host,
            path,
            matched = selected.len(),
            stored = cookies.len(),
            "selected cookies"
        );
        selected
    }

    /// Builds the `Cookie` request header value for `url`.
    ///
    /// Returns `None` when no cookie applies.
    #[must_use]
    pub fn cookie_header(&self, url: &Url) -> Option<String> {
        let cookies = self.cookies_for(url);
        if cookies.is_empty() {
            return None;
        }
        Some(
            cookies
                .iter()
                .map(Cookie::pair)
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Returns a copy of every stored cookie, expired ones included.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Cookie> {
        self.cookies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of stored cookies, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every stored cookie.
    pub fn clear(&self) {
        self.cookies
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
