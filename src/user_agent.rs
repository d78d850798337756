//! User-Agent string sent with every API request.
//!
//! Wiki APIs commonly reject or throttle anonymous client strings, so the
//! default identifies the tool, its version, and where to find it.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/wikiclient";

/// Default User-Agent for API requests.
#[must_use]
pub fn default_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("wikiclient/{version} (+{PROJECT_UA_URL})")
}
