//! Place directory endpoints.

use anyhow::Result;
use hyper::{Request, Response, StatusCode};
use serde_json::json;
use tracing::warn;

use crate::content::visibility_for;
use crate::handlers::utils::responses::{deliver_error_json, deliver_success_json};
use crate::session;
use crate::{AppState, RequestBody, ResponseBody};

/// GET /places — the published directory, drafts included for admins.
pub async fn handle_list_places(
    req: Request<RequestBody>,
    state: &AppState,
) -> Result<Response<ResponseBody>> {
    let session = session::current_session(&req, state).await;
    let access = session.as_ref().map(|s| s.tokens.access_token.as_str());
    let visibility = visibility_for(state, access).await;

    let places = match state.store.list_places(access, visibility).await {
        Ok(places) => places,
        Err(e) => {
            warn!("Place listing degraded to empty: {}", e);
            Vec::new()
        }
    };

    deliver_success_json(Some(places))
}

/// GET /places/:slug — a single place with its comments.
pub async fn handle_place_detail(
    req: Request<RequestBody>,
    state: &AppState,
    slug: &str,
) -> Result<Response<ResponseBody>> {
    let slug = shared::slug::slugify(slug);
    let session = session::current_session(&req, state).await;
    let access = session.as_ref().map(|s| s.tokens.access_token.as_str());
    let visibility = visibility_for(state, access).await;

    let place = match state.store.place_by_slug(access, &slug, visibility).await {
        Ok(Some(place)) => place,
        Ok(None) => {
            return deliver_error_json("NOT_FOUND", "No such place", StatusCode::NOT_FOUND);
        }
        Err(e) => {
            warn!("Place detail read degraded to absence: {}", e);
            return deliver_error_json("NOT_FOUND", "No such place", StatusCode::NOT_FOUND);
        }
    };

    let comments = match state.store.comments_for(access, "place", place.id).await {
        Ok(comments) => comments,
        Err(e) => {
            warn!("Comment listing degraded to empty: {}", e);
            Vec::new()
        }
    };

    deliver_success_json(Some(json!({
        "item": place,
        "comments": comments,
    })))
}
