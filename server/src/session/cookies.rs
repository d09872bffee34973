//! Cookie plumbing for the provider's session protocol.
//!
//! The session-refresh call receives one `CookieReader` and two
//! `CookieWriter`s by reference: any cookie it writes must be mirrored onto
//! the forwarded request (so downstream handlers see the rotated token) and
//! onto the outgoing response (so the browser receives it).

use hyper::header::{HeaderMap, HeaderValue, SET_COOKIE};
use tracing::warn;

/// Name of the provider's access-token cookie.
pub const ACCESS_COOKIE: &str = "sb-access-token";
/// Name of the provider's refresh-token cookie.
pub const REFRESH_COOKIE: &str = "sb-refresh-token";

/// Max-Age for the session pair. The tokens themselves expire much sooner;
/// the long cookie lifetime lets the refresh token rotate the pair.
const SESSION_COOKIE_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

/// Read capability over a request's cookie jar.
///
/// `Sync` because the refresh call holds the reader across the provider
/// await inside spawned connection tasks.
pub trait CookieReader: Sync {
    fn get_all(&self) -> Vec<Cookie>;

    fn get(&self, name: &str) -> Option<String> {
        self.get_all()
            .into_iter()
            .find(|c| c.name == name)
            .map(|c| c.value)
    }
}

/// Write capability for refreshed cookies. `Send` for the same reason the
/// reader is `Sync`: both writers are held across the refresh await.
pub trait CookieWriter: Send {
    fn set(&mut self, name: &str, value: &str);
    fn clear(&mut self, name: &str);
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

fn parse_cookie_header(headers: &HeaderMap) -> Vec<Cookie> {
    headers
        .get_all("cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| {
            let mut parts = pair.trim().splitn(2, '=');
            let name = parts.next()?.trim();
            let value = parts.next()?.trim();
            if name.is_empty() {
                return None;
            }
            Some(Cookie {
                name: name.to_string(),
                value: value.to_string(),
            })
        })
        .collect()
}

/// Snapshot of a request's cookies, taken before any rewriting.
#[derive(Debug, Clone)]
pub struct RequestCookies {
    cookies: Vec<Cookie>,
}

impl RequestCookies {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            cookies: parse_cookie_header(headers),
        }
    }
}

impl CookieReader for RequestCookies {
    fn get_all(&self) -> Vec<Cookie> {
        self.cookies.clone()
    }
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

/// Mirrors refreshed cookies onto the forwarded request's `Cookie` header so
/// downstream handlers observe the rotated pair. All other cookies (theme,
/// accent, anything else) are carried through verbatim.
pub struct ForwardedRequestCookies<'a> {
    headers: &'a mut HeaderMap,
}

impl<'a> ForwardedRequestCookies<'a> {
    pub fn new(headers: &'a mut HeaderMap) -> Self {
        Self { headers }
    }

    fn rewrite<F>(&mut self, apply: F)
    where
        F: FnOnce(&mut Vec<Cookie>),
    {
        let mut cookies = parse_cookie_header(self.headers);
        apply(&mut cookies);

        let serialized = cookies
            .iter()
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ");

        self.headers.remove("cookie");
        if serialized.is_empty() {
            return;
        }
        match HeaderValue::from_str(&serialized) {
            Ok(value) => {
                self.headers.insert("cookie", value);
            }
            Err(e) => warn!("Failed to rebuild cookie header: {}", e),
        }
    }
}

impl CookieWriter for ForwardedRequestCookies<'_> {
    fn set(&mut self, name: &str, value: &str) {
        let (name, value) = (name.to_string(), value.to_string());
        self.rewrite(move |cookies| {
            if let Some(existing) = cookies.iter_mut().find(|c| c.name == name) {
                existing.value = value;
            } else {
                cookies.push(Cookie { name, value });
            }
        });
    }

    fn clear(&mut self, name: &str) {
        let name = name.to_string();
        self.rewrite(move |cookies| cookies.retain(|c| c.name != name));
    }
}

/// Collects `Set-Cookie` header values destined for the outgoing response.
pub struct ResponseCookies {
    secure: bool,
    values: Vec<HeaderValue>,
}

impl ResponseCookies {
    pub fn new(secure: bool) -> Self {
        Self {
            secure,
            values: Vec::new(),
        }
    }

    pub fn into_header_values(self) -> Vec<HeaderValue> {
        self.values
    }

    fn push(&mut self, name: &str, value: &str, max_age_secs: u64) {
        // SameSite=Lax so the pair survives the provider's redirect back to
        // /auth/callback.
        let mut cookie = format!("{}={}; Max-Age={}; Path=/; HttpOnly", name, value, max_age_secs);
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str("; SameSite=Lax");

        match HeaderValue::from_str(&cookie) {
            Ok(v) => self.values.push(v),
            Err(e) => warn!("Failed to build set-cookie header for {}: {}", name, e),
        }
    }
}

impl CookieWriter for ResponseCookies {
    fn set(&mut self, name: &str, value: &str) {
        self.push(name, value, SESSION_COOKIE_MAX_AGE_SECS);
    }

    fn clear(&mut self, name: &str) {
        self.push(name, "", 0);
    }
}

/// Sink for writes that have nowhere to go, such as the forwarded-request
/// side of a fallback lookup where no downstream service re-reads the
/// cookie header. Never discard the response side of a rotation: the
/// consumed refresh token cannot be replayed, so a fresh pair that misses
/// the browser is a lost session.
pub struct DiscardCookies;

impl CookieWriter for DiscardCookies {
    fn set(&mut self, _name: &str, _value: &str) {}
    fn clear(&mut self, _name: &str) {}
}

/// True when a response already carries a `Set-Cookie` for either session
/// cookie. Handler-issued values (the callback install, the logout clears)
/// must win over a rotation mirror appended afterwards.
pub fn has_session_set_cookie(headers: &HeaderMap) -> bool {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|cookie| {
            let name = cookie.split('=').next().unwrap_or_default().trim();
            name == ACCESS_COOKIE || name == REFRESH_COOKIE
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn jar_parses_multiple_cookies() {
        let headers = headers_with_cookie("theme=dark; sb-access-token=abc; accent=teal");
        let jar = RequestCookies::from_headers(&headers);
        assert_eq!(jar.get("theme").as_deref(), Some("dark"));
        assert_eq!(jar.get(ACCESS_COOKIE).as_deref(), Some("abc"));
        assert_eq!(jar.get("accent").as_deref(), Some("teal"));
        assert_eq!(jar.get("missing"), None);
    }

    #[test]
    fn jar_on_missing_header_is_empty() {
        let jar = RequestCookies::from_headers(&HeaderMap::new());
        assert!(jar.get_all().is_empty());
    }

    #[test]
    fn forwarded_writer_updates_token_and_preserves_preferences() {
        let mut headers = headers_with_cookie("theme=dark; sb-access-token=old; accent=teal");
        let mut writer = ForwardedRequestCookies::new(&mut headers);
        writer.set(ACCESS_COOKIE, "new");

        let jar = RequestCookies::from_headers(&headers);
        assert_eq!(jar.get(ACCESS_COOKIE).as_deref(), Some("new"));
        assert_eq!(jar.get("theme").as_deref(), Some("dark"));
        assert_eq!(jar.get("accent").as_deref(), Some("teal"));
    }

    #[test]
    fn forwarded_writer_inserts_when_absent() {
        let mut headers = headers_with_cookie("theme=dark");
        let mut writer = ForwardedRequestCookies::new(&mut headers);
        writer.set(REFRESH_COOKIE, "rt");

        let jar = RequestCookies::from_headers(&headers);
        assert_eq!(jar.get(REFRESH_COOKIE).as_deref(), Some("rt"));
        assert_eq!(jar.get("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn forwarded_writer_clear_removes_only_target() {
        let mut headers = headers_with_cookie("sb-access-token=abc; theme=dark");
        let mut writer = ForwardedRequestCookies::new(&mut headers);
        writer.clear(ACCESS_COOKIE);

        let jar = RequestCookies::from_headers(&headers);
        assert_eq!(jar.get(ACCESS_COOKIE), None);
        assert_eq!(jar.get("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn response_writer_builds_set_cookie_attributes() {
        let mut writer = ResponseCookies::new(true);
        writer.set(ACCESS_COOKIE, "abc");
        let values = writer.into_header_values();
        assert_eq!(values.len(), 1);
        let cookie = values[0].to_str().unwrap();
        assert!(cookie.starts_with("sb-access-token=abc"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Lax"));
    }

    #[test]
    fn session_set_cookie_is_detected_by_name() {
        let mut headers = HeaderMap::new();
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("theme=dark; Path=/"),
        );
        assert!(!has_session_set_cookie(&headers));

        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("sb-refresh-token=; Max-Age=0; Path=/"),
        );
        assert!(has_session_set_cookie(&headers));
    }

    #[test]
    fn response_writer_clear_expires_cookie() {
        let mut writer = ResponseCookies::new(false);
        writer.clear(REFRESH_COOKIE);
        let values = writer.into_header_values();
        let cookie = values[0].to_str().unwrap();
        assert!(cookie.starts_with("sb-refresh-token=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(!cookie.contains("Secure"));
    }
}
