//! Client construction settings.

use std::time::Duration;

use url::Url;

use crate::error::ApiError;
use crate::params::Params;
use crate::user_agent;

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (60 seconds).
pub const READ_TIMEOUT_SECS: u64 = 60;

/// Settings used to build an [`ApiClient`](super::ApiClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Endpoint every call is sent to, e.g. `https://host/w/api.php`.
    pub api_url: Url,
    /// User-Agent header value.
    pub user_agent: String,
    /// TCP/TLS connect timeout.
    pub connect_timeout: Duration,
    /// Whole-request timeout enforced by the transport.
    pub read_timeout: Duration,
    /// Parameters added to every call unless the call overrides them.
    pub default_params: Params,
}

impl ClientConfig {
    /// Creates a config with default timeouts, user agent, and `format=json`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] when `api_url` is not an absolute
    /// `http`/`https` URL with a host.
    pub fn new(api_url: &str) -> Result<Self, ApiError> {
        let parsed = Url::parse(api_url).map_err(|_| ApiError::invalid_url(api_url))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(ApiError::invalid_url(api_url));
        }

        Ok(Self {
            api_url: parsed,
            user_agent: user_agent::default_user_agent(),
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            read_timeout: Duration::from_secs(READ_TIMEOUT_SECS),
            default_params: Params::new().with("format", "json"),
        })
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn with_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout = connect;
        self.read_timeout = read;
        self
    }

    /// Adds or replaces one default parameter.
    #[must_use]
    pub fn with_default_param(
        mut self,
        key: impl Into<String>,
        value: impl Into<crate::params::ParamValue>,
    ) -> Self {
        self.default_params.insert(key, value);
        self
    }
}
