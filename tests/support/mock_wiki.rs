//! Mock wiki endpoints for integration tests.
//!
//! Sandboxed runners sometimes forbid binding localhost sockets. Tests then
//! skip with a note on stderr, unless `WIKICLIENT_REQUIRE_SOCKET_TESTS` is
//! set, in which case they fail.

#![allow(dead_code)]

use std::net::{SocketAddr, TcpListener};

use wikiclient_core::{ApiClient, ClientConfig};
use wiremock::MockServer;

/// Path the mock API is served under.
pub const API_PATH: &str = "/w/api.php";

const REQUIRE_SOCKETS_ENV: &str = "WIKICLIENT_REQUIRE_SOCKET_TESTS";

fn sockets_required() -> bool {
    std::env::var(REQUIRE_SOCKETS_ENV).is_ok_and(|value| {
        ["1", "true", "yes"]
            .iter()
            .any(|accepted| value.eq_ignore_ascii_case(accepted))
    })
}

fn free_local_addr() -> std::io::Result<SocketAddr> {
    TcpListener::bind("127.0.0.1:0")?.local_addr()
}

/// Starts a mock server, or returns `None` when localhost cannot be bound.
///
/// # Panics
///
/// When sockets are unavailable and `WIKICLIENT_REQUIRE_SOCKET_TESTS` is set.
pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    if let Err(error) = free_local_addr() {
        assert!(
            !sockets_required(),
            "mock wiki needs a localhost socket ({error}); unset {REQUIRE_SOCKETS_ENV} to skip"
        );
        eprintln!("skipping mock wiki test: cannot bind localhost ({error})");
        return None;
    }
    Some(MockServer::start().await)
}

/// API endpoint URL on `server`.
#[must_use]
pub fn api_url(server: &MockServer) -> String {
    format!("{}{API_PATH}", server.uri())
}

/// Client with default configuration pointed at `server`.
///
/// # Panics
///
/// If the mock server URI does not produce a valid client config.
#[must_use]
pub fn client_for(server: &MockServer) -> ApiClient {
    let config = ClientConfig::new(&api_url(server)).unwrap();
    ApiClient::new(config).unwrap()
}

/// API URL on a localhost port nothing listens on.
#[must_use]
pub fn unreachable_api_url() -> Option<String> {
    let port = free_local_addr().ok()?.port();
    Some(format!("http://127.0.0.1:{port}{API_PATH}"))
}
