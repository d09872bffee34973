//! Email-OTP sign-in and sign-out actions.

use anyhow::Result;
use hyper::{Request, Response, header};
use tracing::{info, warn};

use shared::types::RedirectCode;

use crate::handlers::utils::forms::parse_form;
use crate::handlers::utils::responses::{deliver_redirect, deliver_redirect_with_cookies};
use crate::session::{self, ResponseCookies, SessionClient};
use crate::{AppState, RequestBody, ResponseBody};

/// POST /auth/login — dispatch a one-time sign-in link.
///
/// The emailed link lands on `/auth/callback?code=...`. The callback base is
/// taken from the request's `Origin` header when present so the link works
/// behind a proxy, falling back to the configured public URL.
pub async fn handle_login(
    req: Request<RequestBody>,
    state: &AppState,
) -> Result<Response<ResponseBody>> {
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let form = parse_form(req).await?;
    let email = form.get("email").map(|s| s.trim()).unwrap_or_default();
    if email.is_empty() {
        return deliver_redirect("/login");
    }

    let base = match origin {
        Some(origin) => origin,
        None => state.config.read().await.site.public_url.clone(),
    };
    let redirect_to = format!("{}/auth/callback", base.trim_end_matches('/'));

    match state.identity.send_otp(email, &redirect_to).await {
        Ok(()) => {
            info!("Sign-in link dispatched");
            deliver_redirect("/login?check=1")
        }
        Err(e) => {
            warn!("OTP dispatch failed: {}", e);
            deliver_redirect(&RedirectCode::AuthFailed.target("/login"))
        }
    }
}

/// POST /auth/logout — invalidate the session and destroy its cookies.
///
/// Provider failures are logged and ignored: the cookies are cleared either
/// way, which is what signing out means to the browser.
pub async fn handle_logout(
    req: Request<RequestBody>,
    state: &AppState,
) -> Result<Response<ResponseBody>> {
    if let Some(session) = session::current_session(&req, state).await {
        if let Err(e) = state.identity.sign_out(&session.tokens.access_token).await {
            warn!("Provider sign-out failed: {}", e);
        }
    }

    let secure = state
        .config
        .read()
        .await
        .site
        .public_url
        .starts_with("https");
    let mut cookies = ResponseCookies::new(secure);
    SessionClient::clear(&mut cookies);

    deliver_redirect_with_cookies("/", cookies.into_header_values())
}
