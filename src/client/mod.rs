//! API client: state, configuration, and the request pipeline.
//!
//! # Architecture
//!
//! - [`ClientConfig`] - endpoint, timeouts, user agent, default parameters
//! - [`ClientState`] - base URL, default parameters, cookie jar, login flag
//! - [`RequestDescriptor`] - one call as seen by the pipeline
//! - [`pipeline::dispatch`] - the single choke point for network calls
//! - [`ApiClient`] - cheap-to-clone handle bundling the HTTP client and state
//!
//! # Example
//!
//! ```no_run
//! use wikiclient_core::{ApiClient, ClientConfig, Params};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(ClientConfig::new("https://wiki.example.org/w/api.php")?)?;
//! let reply = client
//!     .get(Params::new().with("action", "query").with("meta", "siteinfo"))
//!     .await?;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```

mod config;
pub mod pipeline;
mod query;
mod request;

pub use config::{CONNECT_TIMEOUT_SECS, ClientConfig, READ_TIMEOUT_SECS};
pub use pipeline::ClientState;
pub use query::check_page_set;
pub use request::{RequestBody, RequestDescriptor};

use std::sync::Arc;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::cookies::CookieJar;
use crate::error::ApiError;
use crate::params::Params;

/// Handle for one API session.
///
/// Clones share the same cookie jar and login state, so concurrent calls
/// from clones belong to the same session.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    state: Arc<ClientState>,
}

impl ApiClient {
    /// Builds a client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ClientBuild`] when the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout)
            .user_agent(config.user_agent.as_str())
            .gzip(true)
            .build()
            .map_err(|source| ApiError::ClientBuild { source })?;

        debug!(api_url = %config.api_url, "API client ready");

        Ok(Self {
            http,
            state: Arc::new(ClientState::new(config.api_url, config.default_params)),
        })
    }

    /// Sends an arbitrary call through the pipeline.
    ///
    /// # Errors
    ///
    /// See [`pipeline::dispatch`].
    pub async fn dispatch(&self, descriptor: RequestDescriptor) -> Result<Value, ApiError> {
        pipeline::dispatch(&self.http, &self.state, descriptor).await
    }

    /// GET against the API endpoint with `params` in the query string.
    ///
    /// # Errors
    ///
    /// See [`pipeline::dispatch`].
    pub async fn get(&self, params: Params) -> Result<Value, ApiError> {
        self.dispatch(RequestDescriptor::get(self.api_url().clone(), params))
            .await
    }

    /// POST against the API endpoint with `params` form-encoded.
    ///
    /// # Errors
    ///
    /// See [`pipeline::dispatch`].
    pub async fn post(&self, params: Params) -> Result<Value, ApiError> {
        self.dispatch(RequestDescriptor::post_form(self.api_url().clone(), params))
            .await
    }

    /// `action=query` GET, rejecting conflicting page-set parameters before
    /// any network I/O.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a conflicting page set, otherwise
    /// see [`pipeline::dispatch`].
    pub async fn query(&self, params: Params) -> Result<Value, ApiError> {
        check_page_set(&params)?;
        self.get(params.with("action", "query")).await
    }

    /// The endpoint every convenience call targets.
    #[must_use]
    pub fn api_url(&self) -> &Url {
        self.state.base_url()
    }

    /// Whether a login has succeeded and no logout has happened since.
    #[must_use]
    pub fn is_authorized(&self) -> bool {
        self.state.is_authorized()
    }

    /// The session's cookie jar.
    #[must_use]
    pub fn cookie_jar(&self) -> &CookieJar {
        self.state.jar()
    }

    pub(crate) fn state(&self) -> &ClientState {
        &self.state
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn client() -> ApiClient {
        ApiClient::new(ClientConfig::new("http://127.0.0.1:9/w/api.php").unwrap()).unwrap()
    }

    #[test]
    fn test_new_client_is_anonymous_with_empty_jar() {
        let client = client();
        assert!(!client.is_authorized());
        assert!(client.cookie_jar().is_empty());
        assert_eq!(client.api_url().path(), "/w/api.php");
    }

    #[test]
    fn test_clones_share_state() {
        let client = client();
        let clone = client.clone();
        client.state().set_authorized(true);
        assert!(clone.is_authorized());
    }

    #[test]
    fn test_query_with_conflicting_page_set_fails_offline() {
        let client = client();
        let result = tokio_test::block_on(
            client.query(Params::new().with("titles", "A").with("revids", 5_i64)),
        );
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Validation);
    }
}
