//! `Set-Cookie` header parsing.

use std::time::SystemTime;

use tracing::debug;

use super::cookie::Cookie;

/// Errors for `Set-Cookie` values that cannot produce a cookie at all.
///
/// Attribute problems never surface here: an unparseable `Expires` is
/// dropped and unknown attributes are ignored.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CookieError {
    /// The leading segment has no `=` separating name and value.
    #[error("Set-Cookie value has no name=value pair")]
    MissingPair,

    /// The cookie name is empty.
    #[error("Set-Cookie value has an empty cookie name")]
    EmptyName,
}

/// Parses one `Set-Cookie` header value received from `origin_host`.
///
/// The value is split on `;`; the first segment is `name=value` and every
/// later segment is an attribute (`key=value`, or a bare flag).
///
/// # Errors
///
/// Returns [`CookieError`] when the leading `name=value` pair is missing or
/// the name is empty.
pub fn parse_set_cookie(header: &str, origin_host: &str) -> Result<Cookie, CookieError> {
    let mut segments = header.split(';').map(str::trim);

    let pair = segments.next().unwrap_or_default();
    let (name, value) = pair.split_once('=').ok_or(CookieError::MissingPair)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CookieError::EmptyName);
    }

    let mut cookie = Cookie::new(name, value.trim(), origin_host.to_ascii_lowercase());

    for segment in segments.filter(|segment| !segment.is_empty()) {
        let (key, attr_value) = match segment.split_once('=') {
            Some((key, attr_value)) => (key.trim(), attr_value.trim()),
            None => (segment, ""),
        };

        match key.to_ascii_lowercase().as_str() {
            "expires" => {
                cookie.expires = parse_cookie_date(attr_value);
                if cookie.expires.is_none() {
                    debug!(cookie = %cookie.name, "ignoring unparseable Expires attribute");
                }
            }
            "path" => cookie.path = attr_value.to_string(),
            "domain" => {
                let domain = attr_value.strip_prefix('.').unwrap_or(attr_value);
                if !domain.is_empty() {
                    cookie.domain = domain.to_ascii_lowercase();
                    cookie.host_only = false;
                }
            }
            "secure" => cookie.secure = true,
            "httponly" => cookie.http_only = true,
            "samesite" => cookie.same_site = Some(attr_value.to_string()),
            _ => {}
        }
    }

    if cookie.path.is_empty() {
        cookie.path = "/".to_string();
    }

    Ok(cookie)
}

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Parses an `Expires` attribute value.
///
/// Strict RFC 7231 HTTP-dates are tried first. Anything else goes through
/// [`normalize_cookie_date`] and is parsed again.
fn parse_cookie_date(raw: &str) -> Option<SystemTime> {
    httpdate::parse_http_date(raw)
        .ok()
        .or_else(|| httpdate::parse_http_date(&normalize_cookie_date(raw)?).ok())
}

/// Rewrites the date forms servers actually send into an IMF-fixdate.
///
/// The weekday token is ignored and recomputed, dashes inside the date are
/// accepted, and two-digit years map to 1970..=2069 (RFC 6265 section 5.1.1).
/// Field ranges are left for `httpdate` to validate.
fn normalize_cookie_date(raw: &str) -> Option<String> {
    let mut tokens = raw
        .split(|c: char| c.is_ascii_whitespace() || c == '-' || c == ',')
        .filter(|token| !token.is_empty())
        .peekable();

    if tokens
        .peek()
        .is_some_and(|token| WEEKDAYS.iter().any(|day| abbreviation_matches(token, day)))
    {
        tokens.next();
    }

    let day: u32 = tokens.next()?.parse().ok()?;
    let month_token = tokens.next()?;
    let month = MONTHS
        .iter()
        .position(|name| abbreviation_matches(month_token, name))?;
    let year = expand_year(tokens.next()?)?;

    let mut clock = tokens.next()?.split(':').map(str::parse::<u32>);
    let (hour, minute, second) = (clock.next()?.ok()?, clock.next()?.ok()?, clock.next()?.ok()?);
    if clock.next().is_some() {
        return None;
    }

    match tokens.next() {
        None => {}
        Some(zone) if zone.eq_ignore_ascii_case("GMT") || zone.eq_ignore_ascii_case("UTC") => {}
        Some(_) => return None,
    }
    if tokens.next().is_some() {
        return None;
    }

    let weekday = weekday_of(year, u32::try_from(month).ok()? + 1, day)?;
    Some(format!(
        "{weekday}, {day:02} {} {year:04} {hour:02}:{minute:02}:{second:02} GMT",
        MONTHS[month]
    ))
}

fn abbreviation_matches(token: &str, abbreviation: &str) -> bool {
    token
        .get(..abbreviation.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(abbreviation))
}

fn expand_year(token: &str) -> Option<i64> {
    let year: i64 = token.parse().ok()?;
    match (token.len(), year) {
        (1 | 2, 70..=99) => Some(year + 1900),
        (1 | 2, 0..=69) => Some(year + 2000),
        (4, _) => Some(year),
        _ => None,
    }
}

/// Day of the week for a proleptic Gregorian date (1970-01-01 was a Thursday).
fn weekday_of(year: i64, month: u32, day: u32) -> Option<&'static str> {
    let (month, day) = (i64::from(month), i64::from(day));
    let shifted_year = if month <= 2 { year - 1 } else { year };
    let era = shifted_year.div_euclid(400);
    let year_of_era = shifted_year - era * 400;
    let day_of_year = (153 * ((month + 9) % 12) + 2) / 5 + day - 1;
    let day_of_era = year_of_era * 365 + year_of_era / 4 - year_of_era / 100 + day_of_year;
    let days_since_epoch = era * 146_097 + day_of_era - 719_468;
    let index = usize::try_from((days_since_epoch + 4).rem_euclid(7)).ok()?;
    WEEKDAYS.get(index).copied()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn test_parse_minimal_cookie_is_host_only() {
        let cookie = parse_set_cookie("session=abc123", "wiki.example.org").unwrap();
        assert_eq!(cookie.name, "session");
        assert_eq!(cookie.value(), "abc123");
        assert_eq!(cookie.domain, "wiki.example.org");
        assert!(cookie.host_only);
        assert_eq!(cookie.path, "/");
        assert!(cookie.expires.is_none());
        assert!(!cookie.secure);
        assert!(!cookie.http_only);
    }

    #[test]
    fn test_parse_full_attribute_set() {
        let header = "enwikiSession=xyz; Path=/w; Domain=.example.org; Secure; HttpOnly; \
                      SameSite=Lax; Expires=Wed, 21 Oct 2015 07:28:00 GMT";
        let cookie = parse_set_cookie(header, "en.example.org").unwrap();
        assert_eq!(cookie.path, "/w");
        assert_eq!(cookie.domain, "example.org", "leading dot must be stripped");
        assert!(!cookie.host_only);
        assert!(cookie.secure);
        assert!(cookie.http_only);
        assert_eq!(cookie.same_site.as_deref(), Some("Lax"));
        assert_eq!(
            cookie.expires,
            Some(UNIX_EPOCH + Duration::from_secs(1_445_412_480))
        );
    }

    #[test]
    fn test_attribute_keys_are_case_insensitive() {
        let cookie = parse_set_cookie("a=b; PATH=/x; secure; HTTPONLY", "h.org").unwrap();
        assert_eq!(cookie.path, "/x");
        assert!(cookie.secure);
        assert!(cookie.http_only);
    }

    #[test]
    fn test_value_splits_on_first_equals_only() {
        let cookie = parse_set_cookie("token=a=b=c; Path=/", "h.org").unwrap();
        assert_eq!(cookie.value(), "a=b=c");
    }

    #[test]
    fn test_netscape_dash_date_is_accepted() {
        let cookie =
            parse_set_cookie("a=b; expires=Wed, 21-Oct-2015 07:28:00 GMT", "h.org").unwrap();
        assert_eq!(
            cookie.expires,
            Some(UNIX_EPOCH + Duration::from_secs(1_445_412_480))
        );
    }

    #[test]
    fn test_two_digit_netscape_year_is_expanded() {
        let cookie =
            parse_set_cookie("a=b; expires=Wed, 21-Oct-15 07:28:00 GMT", "h.org").unwrap();
        assert_eq!(
            cookie.expires,
            Some(UNIX_EPOCH + Duration::from_secs(1_445_412_480))
        );

        let epoch = parse_set_cookie("a=b; expires=Thu, 01-Jan-70 00:00:00 GMT", "h.org").unwrap();
        assert_eq!(epoch.expires, Some(UNIX_EPOCH));
    }

    #[test]
    fn test_two_digit_years_below_seventy_are_this_century() {
        assert_eq!(expand_year("69"), Some(2069));
        assert_eq!(expand_year("70"), Some(1970));
        assert_eq!(expand_year("99"), Some(1999));
        assert_eq!(expand_year("2015"), Some(2015));
        assert_eq!(expand_year("123"), None);
    }

    #[test]
    fn test_wrong_weekday_is_ignored() {
        let cookie =
            parse_set_cookie("a=b; Expires=Mon, 21 Oct 2015 07:28:00 GMT", "h.org").unwrap();
        assert_eq!(
            cookie.expires,
            Some(UNIX_EPOCH + Duration::from_secs(1_445_412_480))
        );
    }

    #[test]
    fn test_date_without_weekday_is_accepted() {
        let cookie = parse_set_cookie("a=b; Expires=21 Oct 2015 07:28:00 GMT", "h.org").unwrap();
        assert_eq!(
            cookie.expires,
            Some(UNIX_EPOCH + Duration::from_secs(1_445_412_480))
        );
    }

    #[test]
    fn test_out_of_range_date_is_still_dropped() {
        let cookie = parse_set_cookie("a=b; Expires=Wed, 31-Feb-15 07:28:00 GMT", "h.org").unwrap();
        assert!(cookie.expires.is_none());
    }

    #[test]
    fn test_weekday_of_known_dates() {
        assert_eq!(weekday_of(1970, 1, 1), Some("Thu"));
        assert_eq!(weekday_of(2015, 10, 21), Some("Wed"));
        assert_eq!(weekday_of(2000, 2, 29), Some("Tue"));
    }

    #[test]
    fn test_unparseable_expires_is_dropped_not_fatal() {
        let cookie = parse_set_cookie("a=b; Expires=someday soon; Path=/p", "h.org").unwrap();
        assert!(cookie.expires.is_none());
        assert_eq!(cookie.path, "/p", "later attributes still apply");
    }

    #[test]
    fn test_unknown_attributes_are_ignored() {
        let cookie = parse_set_cookie("a=b; Max-Age=100; Priority=High; Partitioned", "h.org");
        assert!(cookie.is_ok());
    }

    #[test]
    fn test_empty_value_is_allowed() {
        let cookie = parse_set_cookie("deleted=; Path=/", "h.org").unwrap();
        assert_eq!(cookie.value(), "");
    }

    #[test]
    fn test_missing_pair_is_rejected() {
        assert_eq!(
            parse_set_cookie("justaflag; Path=/", "h.org"),
            Err(CookieError::MissingPair)
        );
    }

    #[test]
    fn test_empty_name_is_rejected() {
        assert_eq!(
            parse_set_cookie("=value", "h.org"),
            Err(CookieError::EmptyName)
        );
    }

    #[test]
    fn test_origin_host_is_lowercased() {
        let cookie = parse_set_cookie("a=b", "Wiki.Example.ORG").unwrap();
        assert_eq!(cookie.domain, "wiki.example.org");
        assert!(cookie.host_only);
    }

    #[test]
    fn test_empty_domain_attribute_keeps_host_only() {
        let cookie = parse_set_cookie("a=b; Domain=", "h.org").unwrap();
        assert!(cookie.host_only);
        assert_eq!(cookie.domain, "h.org");
    }
}
