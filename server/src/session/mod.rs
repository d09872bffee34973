pub mod client;
pub mod cookies;

pub use client::{CurrentSession, SessionClient};
pub use cookies::{
    ACCESS_COOKIE, Cookie, CookieReader, CookieWriter, DiscardCookies, ForwardedRequestCookies,
    REFRESH_COOKIE, RequestCookies, ResponseCookies, has_session_set_cookie,
};

use hyper::Request;

use crate::AppState;

/// Resolve the caller's session for a handler.
///
/// Routes behind the interceptor find it pre-resolved in request
/// extensions. Routes on the public allow-list (the interceptor skipped
/// them) fall back to a direct cookie lookup; a rotation on that path goes
/// through `response_writer` — the consumed refresh token cannot be
/// replayed, so the fresh pair must reach the browser on this response.
/// The forwarded-request side is discarded: the handler receives the
/// rotated tokens inside `CurrentSession` and nothing downstream re-reads
/// the cookie header.
pub async fn resolve_session<B>(
    req: &Request<B>,
    state: &AppState,
    response_writer: &mut dyn CookieWriter,
) -> Option<CurrentSession> {
    if let Some(session) = req.extensions().get::<CurrentSession>() {
        return Some(session.clone());
    }

    let jar = RequestCookies::from_headers(req.headers());
    let client = SessionClient::new(state.identity.as_ref());
    client
        .refresh(&jar, &mut DiscardCookies, response_writer)
        .await
}

/// Read-only session lookup for handlers on intercepted paths, where the
/// interceptor already mirrored any rotation. Do not use it for routes on
/// the public allow-list — use [`resolve_session`] there.
pub async fn current_session<B>(req: &Request<B>, state: &AppState) -> Option<CurrentSession> {
    resolve_session(req, state, &mut DiscardCookies).await
}
