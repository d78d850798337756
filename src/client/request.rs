//! Call descriptors handed to the request pipeline.

use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::params::Params;

/// Request body handling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestBody {
    /// No body; parameters travel in the query string.
    #[default]
    Empty,
    /// Parameters are form-url-encoded into the body.
    Form,
    /// Caller-built payload (multipart, binary) sent as-is. Parameters
    /// travel in the query string.
    Opaque {
        /// `Content-Type` header for the payload.
        content_type: String,
        /// Raw payload bytes.
        bytes: Vec<u8>,
    },
}

/// Everything the pipeline needs to make one call.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub params: Params,
    pub body: RequestBody,
}

impl RequestDescriptor {
    /// A GET call with parameters in the query string.
    #[must_use]
    pub fn get(url: Url, params: Params) -> Self {
        Self {
            method: Method::GET,
            url,
            headers: HeaderMap::new(),
            params,
            body: RequestBody::Empty,
        }
    }

    /// A POST call with parameters in a form-encoded body.
    #[must_use]
    pub fn post_form(url: Url, params: Params) -> Self {
        Self {
            method: Method::POST,
            url,
            headers: HeaderMap::new(),
            params,
            body: RequestBody::Form,
        }
    }

    /// A POST call carrying a caller-encoded payload.
    #[must_use]
    pub fn post_opaque(
        url: Url,
        params: Params,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            method: Method::POST,
            url,
            headers: HeaderMap::new(),
            params,
            body: RequestBody::Opaque {
                content_type: content_type.into(),
                bytes,
            },
        }
    }

    /// Adds a request header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// True when parameters go into a form body rather than the URL.
    #[must_use]
    pub fn params_in_body(&self) -> bool {
        matches!(self.body, RequestBody::Form) && !is_query_method(&self.method)
    }
}

fn is_query_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::DELETE)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn api_url() -> Url {
        Url::parse("https://wiki.example.org/w/api.php").unwrap()
    }

    #[test]
    fn test_get_keeps_params_in_query() {
        let descriptor = RequestDescriptor::get(api_url(), Params::new());
        assert_eq!(descriptor.method, Method::GET);
        assert!(!descriptor.params_in_body());
    }

    #[test]
    fn test_post_form_moves_params_to_body() {
        let descriptor = RequestDescriptor::post_form(api_url(), Params::new());
        assert!(descriptor.params_in_body());
    }

    #[test]
    fn test_opaque_body_keeps_params_in_query() {
        let descriptor = RequestDescriptor::post_opaque(
            api_url(),
            Params::new(),
            "multipart/form-data; boundary=x",
            b"--x--".to_vec(),
        );
        assert!(!descriptor.params_in_body());
    }

    #[test]
    fn test_form_body_on_get_stays_in_query() {
        let mut descriptor = RequestDescriptor::get(api_url(), Params::new());
        descriptor.body = RequestBody::Form;
        assert!(!descriptor.params_in_body());
    }

    #[test]
    fn test_with_header() {
        let descriptor = RequestDescriptor::get(api_url(), Params::new()).with_header(
            HeaderName::from_static("x-test"),
            HeaderValue::from_static("1"),
        );
        assert_eq!(descriptor.headers.get("x-test").unwrap(), "1");
    }
}
