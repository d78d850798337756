//! The request pipeline every API call goes through.
//!
//! [`dispatch`] merges parameters, attaches cookies, performs the call,
//! stores returned cookies, and classifies the reply. It never retries.

use std::sync::atomic::{AtomicBool, Ordering};

use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderValue, SET_COOKIE};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;
use url::form_urlencoded;

use super::request::{RequestBody, RequestDescriptor};
use crate::cookies::CookieJar;
use crate::error::ApiError;
use crate::params::{Params, filter};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Per-client state shared by every call.
#[derive(Debug)]
pub struct ClientState {
    base_url: Url,
    default_params: Params,
    jar: CookieJar,
    authorized: AtomicBool,
}

impl ClientState {
    /// Creates anonymous state with an empty jar.
    #[must_use]
    pub fn new(base_url: Url, default_params: Params) -> Self {
        Self {
            base_url,
            default_params,
            jar: CookieJar::new(),
            authorized: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn default_params(&self) -> &Params {
        &self.default_params
    }

    #[must_use]
    pub fn jar(&self) -> &CookieJar {
        &self.jar
    }

    #[must_use]
    pub fn is_authorized(&self) -> bool {
        self.authorized.load(Ordering::SeqCst)
    }

    pub(crate) fn set_authorized(&self, authorized: bool) {
        self.authorized.store(authorized, Ordering::SeqCst);
    }

    fn origin_host(&self) -> &str {
        self.base_url.host_str().unwrap_or_default()
    }
}

/// Sends one call and classifies its outcome.
///
/// Cookies are selected against, and stored for, the client's base URL.
///
/// # Errors
///
/// - [`ApiError::Transport`] when the call cannot complete or the body
///   cannot be read.
/// - [`ApiError::Api`] for any non-success status.
/// - [`ApiError::Decode`] when a success reply is not JSON.
#[instrument(
    level = "debug",
    skip(http, state, descriptor),
    fields(method = %descriptor.method, url = %descriptor.url)
)]
pub async fn dispatch(
    http: &reqwest::Client,
    state: &ClientState,
    descriptor: RequestDescriptor,
) -> Result<Value, ApiError> {
    let form_body = descriptor.params_in_body();
    let RequestDescriptor {
        method,
        mut url,
        mut headers,
        params,
        body,
    } = descriptor;

    let pairs = filter(&params.merged_over(&state.default_params)).to_pairs();

    let payload = if form_body {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        Some(encode_form(&pairs).into_bytes())
    } else {
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(&pairs);
        }
        match body {
            RequestBody::Opaque {
                content_type,
                bytes,
            } => {
                if let Ok(value) = HeaderValue::from_str(&content_type) {
                    headers.insert(CONTENT_TYPE, value);
                } else {
                    warn!(%content_type, "dropping unencodable Content-Type for opaque body");
                }
                Some(bytes)
            }
            RequestBody::Empty | RequestBody::Form => None,
        }
    };

    if let Some(cookie_header) = state.jar.cookie_header(&state.base_url) {
        match HeaderValue::from_str(&cookie_header) {
            Ok(value) => {
                headers.insert(COOKIE, value);
                debug!("attached session cookies");
            }
            Err(_) => warn!("stored cookies do not form a valid header; sending none"),
        }
    }

    let url_text = url.to_string();
    let mut request = http.request(method, url).headers(headers);
    if let Some(bytes) = payload {
        request = request.body(bytes);
    }

    let response = request
        .send()
        .await
        .map_err(|e| ApiError::transport(url_text.as_str(), e))?;

    ingest_set_cookies(state, response.headers());

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| ApiError::transport(url_text.as_str(), e))?;

    if !status.is_success() {
        let error = ApiError::api(status.as_u16(), text);
        debug!(status = status.as_u16(), error = %error, "API call failed");
        return Err(error);
    }

    serde_json::from_str(&text).map_err(|e| ApiError::decode(url_text, status.as_u16(), e))
}

fn ingest_set_cookies(state: &ClientState, headers: &reqwest::header::HeaderMap) {
    let origin_host = state.origin_host();
    for raw in headers.get_all(SET_COOKIE) {
        let Ok(raw) = raw.to_str() else {
            warn!("skipping Set-Cookie header with non-ASCII bytes");
            continue;
        };
        if let Err(error) = state.jar.ingest(raw, origin_host) {
            warn!(reason = %error, "skipping malformed Set-Cookie header");
        }
    }
}

fn encode_form(pairs: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use reqwest::header::HeaderMap;

    fn state() -> ClientState {
        ClientState::new(
            Url::parse("https://wiki.example.org/w/api.php").unwrap(),
            Params::new().with("format", "json"),
        )
    }

    #[test]
    fn test_state_starts_anonymous() {
        let state = state();
        assert!(!state.is_authorized());
        assert!(state.jar().is_empty());
        state.set_authorized(true);
        assert!(state.is_authorized());
    }

    #[test]
    fn test_ingest_set_cookies_handles_many_and_skips_bad() {
        let state = state();
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("a=1; Path=/"));
        headers.append(SET_COOKIE, HeaderValue::from_static("not-a-cookie"));
        headers.append(SET_COOKIE, HeaderValue::from_static("b=2; Secure"));

        ingest_set_cookies(&state, &headers);

        let stored = state.jar().snapshot();
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|c| c.domain == "wiki.example.org"));
    }

    #[test]
    fn test_encode_form_escapes_reserved_characters() {
        let pairs = vec![
            ("lgtoken".to_string(), "abc+\\".to_string()),
            ("text".to_string(), "a b&c".to_string()),
        ];
        assert_eq!(encode_form(&pairs), "lgtoken=abc%2B%5C&text=a+b%26c");
    }
}
