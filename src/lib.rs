//! Wikiclient Core Library
//!
//! A client for JSON-over-HTTP wiki APIs that keep a login session alive
//! through cookies.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`cookies`] - Cookie jar with `Set-Cookie` parsing and request matching
//! - [`params`] - Parameter mapping and the absent-value filter
//! - [`client`] - Client state, configuration, and the request pipeline
//! - [`auth`] - Login handshake and logout
//! - [`error`] - Error taxonomy shared by every call

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod client;
pub mod cookies;
pub mod error;
pub mod params;
pub mod user_agent;

// Re-export commonly used types
pub use auth::{TokenKind, UserIdentity};
pub use client::{ApiClient, ClientConfig, ClientState, RequestBody, RequestDescriptor};
pub use cookies::{Cookie, CookieError, CookieJar};
pub use error::{ApiError, ApiFailure, ErrorKind};
pub use params::{ParamValue, Params, filter};
