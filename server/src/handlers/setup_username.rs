//! The one-time username claim (profile completion).

use anyhow::Result;
use hyper::{Request, Response};
use tracing::{debug, info, warn};

use shared::types::{Profile, RedirectCode};

use crate::handlers::utils::forms::parse_form;
use crate::handlers::utils::responses::deliver_redirect;
use crate::session::CurrentSession;
use crate::{AppState, RequestBody, ResponseBody};

const SETUP_PAGE: &str = "/setup-username";
const USERNAME_MIN_CHARS: usize = 1;
const USERNAME_MAX_CHARS: usize = 50;

/// POST /setup-username — claim a username for the current profile.
///
/// Every outcome is a redirect; the target encodes the result.
pub async fn handle_setup_username(
    req: Request<RequestBody>,
    state: &AppState,
    session: &CurrentSession,
) -> Result<Response<ResponseBody>> {
    let form = parse_form(req).await?;
    let username = form.get("username").map(String::as_str).unwrap_or_default();
    let target = claim_username(state, session, username).await;
    deliver_redirect(&target)
}

/// The claim flow itself, returning the redirect target.
///
/// Ordering matters: the immutability check runs before the availability
/// check, so a user who already holds a username is bounced home without
/// touching the requested name. The availability pre-check is advisory —
/// the store's unique constraint is the real arbiter, surfacing as a
/// unique-violation on the write.
pub async fn claim_username(
    state: &AppState,
    session: &CurrentSession,
    username: &str,
) -> String {
    let username = username.trim();
    let char_count = username.chars().count();
    if char_count < USERNAME_MIN_CHARS || char_count > USERNAME_MAX_CHARS {
        return RedirectCode::InvalidUsername.target(SETUP_PAGE);
    }

    let access = session.tokens.access_token.as_str();

    // Usernames are immutable once set. A read failure here degrades to
    // "no username", letting the write proceed.
    let existing = match state
        .store
        .profile_by_id(Some(access), session.identity.id)
        .await
    {
        Ok(profile) => profile,
        Err(e) => {
            debug!("Profile read degraded to absence: {}", e);
            None
        }
    };
    if existing.as_ref().is_some_and(Profile::has_username) {
        return "/".to_string();
    }

    // Advisory availability check for a friendlier error.
    match state.store.profile_by_username(Some(access), username).await {
        Ok(Some(_)) => return RedirectCode::UsernameTaken.target(SETUP_PAGE),
        Ok(None) => {}
        Err(e) => debug!("Availability check degraded to available: {}", e),
    }

    let profile = Profile {
        id: session.identity.id,
        username: Some(username.to_string()),
        email: session.identity.email.clone(),
    };

    match state.store.upsert_profile(access, &profile).await {
        Ok(()) => {
            info!("Username claimed");
            "/".to_string()
        }
        Err(e) if e.is_unique_violation() => {
            // Lost the race for the name.
            RedirectCode::UsernameTaken.target(SETUP_PAGE)
        }
        Err(e) => {
            warn!("Profile upsert failed: {}", e);
            RedirectCode::Unknown.target(SETUP_PAGE)
        }
    }
}
