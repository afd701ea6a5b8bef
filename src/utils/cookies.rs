use axum::http::{header, HeaderMap, HeaderValue};

use crate::config::get_config;
use crate::error::{Error, Result};

pub const SESSION_COOKIE: &str = "session";
pub const CONSENT_COOKIE: &str = "cookie_consent";

/// Value of the named cookie from the request `Cookie` headers.
pub fn read_cookie<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

pub fn build_cookie(name: &str, value: &str, max_age_secs: i64, http_only: bool) -> Result<HeaderValue> {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; SameSite=Lax",
        name, value, max_age_secs
    );
    if http_only {
        cookie.push_str("; HttpOnly");
    }
    if get_config().cookie_secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).map_err(|e| Error::Internal(format!("Invalid cookie: {}", e)))
}

pub fn session_cookie(token: &str) -> Result<HeaderValue> {
    let max_age = get_config().session_ttl_hours * 3600;
    build_cookie(SESSION_COOKIE, token, max_age, true)
}

pub fn expired_session_cookie() -> Result<HeaderValue> {
    build_cookie(SESSION_COOKIE, "", 0, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_cookie_among_many() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=abc.def.ghi; cookie_consent=x"),
        );
        assert_eq!(read_cookie(&headers, SESSION_COOKIE), Some("abc.def.ghi"));
        assert_eq!(read_cookie(&headers, CONSENT_COOKIE), Some("x"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn reads_across_multiple_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::COOKIE, HeaderValue::from_static("session=tok"));
        assert_eq!(read_cookie(&headers, SESSION_COOKIE), Some("tok"));
    }
}
