//! Session cookie handling.
//!
//! The remote API keeps a login session alive through cookies, so every
//! response's `Set-Cookie` headers are fed into a [`CookieJar`] and every
//! request carries the cookies the jar selects for it.
//!
//! Matching follows the parts of RFC 6265 a single-origin session needs:
//! host-only versus domain cookies, proper-suffix domain matching, path
//! prefixes, the `Secure` flag, and expiry. Public-suffix rules and cookie
//! prefixes are not applied.
//!
//! # Example
//!
//! ```
//! use wikiclient_core::cookies::CookieJar;
//! use url::Url;
//!
//! let jar = CookieJar::new();
//! jar.ingest("session=abc; Path=/; HttpOnly", "wiki.example.org").unwrap();
//!
//! let url = Url::parse("https://wiki.example.org/w/api.php").unwrap();
//! assert_eq!(jar.cookie_header(&url).as_deref(), Some("session=abc"));
//! ```

mod cookie;
mod jar;
mod parse;

pub use cookie::Cookie;
pub use jar::CookieJar;
pub use parse::{CookieError, parse_set_cookie};
