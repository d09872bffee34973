//! The auth-code callback: code exchange and lazy profile creation.

use anyhow::Result;
use hyper::{Request, Response};
use tracing::{debug, info, warn};

use shared::types::RedirectCode;

use crate::handlers::utils::forms::query_param;
use crate::handlers::utils::responses::{deliver_redirect, deliver_redirect_with_cookies};
use crate::session::{ResponseCookies, SessionClient};
use crate::{AppState, RequestBody, ResponseBody};

/// GET /auth/callback — land the emailed sign-in link.
///
/// Exchanges the one-time code for a session, lazily creates the bare
/// profile row on first sign-in, installs the session cookies, and sends
/// the browser home. The interceptor's profile gate takes over from there.
pub async fn handle_callback(
    req: Request<RequestBody>,
    state: &AppState,
) -> Result<Response<ResponseBody>> {
    let Some(code) = query_param(&req, "code") else {
        debug!("Callback hit without a code, redirecting home");
        return deliver_redirect("/");
    };

    let (tokens, identity) = match state.identity.exchange_code(&code).await {
        Ok(grant) => grant,
        Err(e) => {
            warn!("Auth-code exchange failed: {}", e);
            return deliver_redirect(&RedirectCode::AuthFailed.target("/login"));
        }
    };

    // First sign-in: the profile row does not exist yet. Creation failures
    // are non-fatal — the row can be created on a later visit.
    match state
        .store
        .profile_by_id(Some(&tokens.access_token), identity.id)
        .await
    {
        Ok(Some(_)) => {}
        Ok(None) => {
            info!("Creating profile stub for first sign-in");
            if let Err(e) = state
                .store
                .insert_profile_stub(&tokens.access_token, identity.id, identity.email.clone())
                .await
            {
                warn!("Profile stub insert failed: {}", e);
            }
        }
        Err(e) => {
            debug!("Profile lookup failed during callback: {}", e);
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
    SessionClient::install(&tokens, &mut cookies);

    deliver_redirect_with_cookies("/", cookies.into_header_values())
}
