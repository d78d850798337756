//! Login and logout.
//!
//! Login is a two-step handshake: fetch a login token, then post the
//! credentials with it. The server may answer the first attempt with
//! `NeedToken` and a fresh challenge token; the attempt is then repeated
//! exactly once with that token. Any other outcome ends the handshake.
//!
//! ```text
//! TokenObtained --login--> Success                 -> Authorized
//!               \--------> NeedToken(challenge) --login--> Success -> Authorized
//!                                                      \--> other   -> AuthError
//! ```

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::params::Params;

/// `login.result` value for a completed login.
pub const LOGIN_SUCCESS: &str = "Success";

/// `login.result` value asking for a retry with a challenge token.
pub const LOGIN_NEED_TOKEN: &str = "NeedToken";

const UNKNOWN_REASON: &str = "Unknown reason";

/// Token types the API hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Token for `action=login`.
    Login,
    /// Generic write-protection token (edits, logout).
    Csrf,
}

impl TokenKind {
    /// Value of the `type` parameter.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Csrf => "csrf",
        }
    }

    /// Name of the field the token is returned in.
    #[must_use]
    pub fn response_field(self) -> &'static str {
        match self {
            Self::Login => "logintoken",
            Self::Csrf => "csrftoken",
        }
    }
}

/// Account a successful login resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub user_id: u64,
    pub user_name: String,
}

/// The `login` object of an `action=login` reply.
#[derive(Debug, Default, Deserialize)]
struct LoginReply {
    result: Option<String>,
    token: Option<String>,
    #[serde(default, deserialize_with = "lenient_user_id")]
    lguserid: Option<u64>,
    lgusername: Option<String>,
    reason: Option<Value>,
}

impl LoginReply {
    /// Reads the `login` object; a reply without one decodes as empty.
    fn from_response(response: &Value) -> Result<Self, ApiError> {
        match response.get("login") {
            Some(login) => Self::deserialize(login)
                .map_err(|e| ApiError::auth(format!("malformed login reply: {e}"))),
            None => Ok(Self::default()),
        }
    }

    fn reason(&self) -> String {
        match &self.reason {
            Some(Value::String(text)) if !text.is_empty() => text.clone(),
            Some(Value::Object(object)) => object
                .get("text")
                .or_else(|| object.get("code"))
                .and_then(Value::as_str)
                .map_or_else(|| UNKNOWN_REASON.to_string(), str::to_string),
            _ => UNKNOWN_REASON.to_string(),
        }
    }
}

/// User ids arrive as JSON numbers, but some servers send numeric strings.
fn lenient_user_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawUserId {
        Number(u64),
        Text(String),
    }

    match Option::<RawUserId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawUserId::Number(id)) => Ok(Some(id)),
        Some(RawUserId::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("lguserid `{text}` is not a number"))),
    }
}

/// Reads a token from a token-fetch reply.
///
/// The token normally sits under `query.tokens`; a bare top-level `tokens`
/// object is accepted as well. Empty strings count as missing.
#[must_use]
pub fn extract_token(response: &Value, kind: TokenKind) -> Option<String> {
    let field = kind.response_field();
    response
        .pointer(&format!("/query/tokens/{field}"))
        .or_else(|| response.pointer(&format!("/tokens/{field}")))
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

impl ApiClient {
    /// Requests a token of the given kind.
    ///
    /// Returns `Ok(None)` when the reply carries no such token.
    ///
    /// # Errors
    ///
    /// Propagates pipeline errors.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch_token(&self, kind: TokenKind) -> Result<Option<String>, ApiError> {
        let response = self
            .get(
                Params::new()
                    .with("action", "query")
                    .with("meta", "tokens")
                    .with("type", kind.as_str()),
            )
            .await?;
        Ok(extract_token(&response, kind))
    }

    /// Logs in and marks the client authorized.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Auth`] when no login token is issued, a `NeedToken`
    ///   reply lacks its challenge token, or the final result is not
    ///   `Success`.
    /// - Any pipeline error from the underlying calls.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<UserIdentity, ApiError> {
        let token = self
            .fetch_token(TokenKind::Login)
            .await?
            .ok_or_else(|| ApiError::auth("missing login token"))?;

        let first = self.attempt_login(username, password, &token).await?;

        let reply = if first.result.as_deref() == Some(LOGIN_NEED_TOKEN) {
            let challenge = first
                .token
                .filter(|challenge| !challenge.is_empty())
                .ok_or_else(|| ApiError::auth("missing challenge token"))?;
            debug!("server issued a challenge token; retrying login once");
            self.attempt_login(username, password, &challenge).await?
        } else {
            first
        };

        if reply.result.as_deref() != Some(LOGIN_SUCCESS) {
            let reason = reply.reason();
            warn!(result = ?reply.result, %reason, "login rejected");
            return Err(ApiError::auth(reason));
        }

        let identity = UserIdentity {
            user_id: reply.lguserid.unwrap_or_default(),
            user_name: reply
                .lgusername
                .unwrap_or_else(|| username.to_string()),
        };
        self.state().set_authorized(true);
        info!(user_id = identity.user_id, user = %identity.user_name, "logged in");
        Ok(identity)
    }

    /// Ends the session and marks the client anonymous.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Auth`] without any network call when not logged
    /// in, when no token is issued, or when the logout reply carries an
    /// `error` object. Pipeline errors are propagated.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ApiError> {
        if !self.is_authorized() {
            return Err(ApiError::auth("not logged in"));
        }

        let token = self
            .fetch_token(TokenKind::Csrf)
            .await?
            .ok_or_else(|| ApiError::auth("missing csrf token"))?;

        let response = self
            .post(Params::new().with("action", "logout").with("token", token))
            .await?;

        if let Some(error) = response.get("error") {
            let info = error
                .get("info")
                .or_else(|| error.get("code"))
                .and_then(Value::as_str)
                .unwrap_or(UNKNOWN_REASON);
            return Err(ApiError::auth(format!("logout rejected: {info}")));
        }

        self.state().set_authorized(false);
        info!("logged out");
        Ok(())
    }

    async fn attempt_login(
        &self,
        username: &str,
        password: &str,
        token: &str,
    ) -> Result<LoginReply, ApiError> {
        let response = self
            .post(
                Params::new()
                    .with("action", "login")
                    .with("lgname", username)
                    .with("lgpassword", password)
                    .with("lgtoken", token),
            )
            .await?;
        LoginReply::from_response(&response)
    }
}
