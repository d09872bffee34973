//! News listing and detail endpoints.

use anyhow::Result;
use hyper::{Request, Response, StatusCode};
use serde_json::json;
use tracing::warn;

use crate::content::visibility_for;
use crate::handlers::utils::responses::{deliver_error_json, deliver_success_json};
use crate::session;
use crate::{AppState, RequestBody, ResponseBody};

/// GET /news — the published feed, drafts included for admins.
///
/// A store read failure degrades to the empty feed; listings never 5xx over
/// a flaky provider.
pub async fn handle_list_news(
    req: Request<RequestBody>,
    state: &AppState,
) -> Result<Response<ResponseBody>> {
    let session = session::current_session(&req, state).await;
    let access = session.as_ref().map(|s| s.tokens.access_token.as_str());
    let visibility = visibility_for(state, access).await;

    let items = match state.store.list_news(access, visibility).await {
        Ok(items) => items,
        Err(e) => {
            warn!("News listing degraded to empty: {}", e);
            Vec::new()
        }
    };

    deliver_success_json(Some(items))
}

/// GET /news/:slug — a single article with its comments.
pub async fn handle_news_detail(
    req: Request<RequestBody>,
    state: &AppState,
    slug: &str,
) -> Result<Response<ResponseBody>> {
    // Slugs are stored normalized; normalize the request the same way so
    // /news/Парк and /news/park resolve identically.
    let slug = shared::slug::slugify(slug);
    let session = session::current_session(&req, state).await;
    let access = session.as_ref().map(|s| s.tokens.access_token.as_str());
    let visibility = visibility_for(state, access).await;

    let item = match state.store.news_by_slug(access, &slug, visibility).await {
        Ok(Some(item)) => item,
        Ok(None) => {
            return deliver_error_json("NOT_FOUND", "No such article", StatusCode::NOT_FOUND);
        }
        Err(e) => {
            warn!("News detail read degraded to absence: {}", e);
            return deliver_error_json("NOT_FOUND", "No such article", StatusCode::NOT_FOUND);
        }
    };

    let comments = match state.store.comments_for(access, "news", item.id).await {
        Ok(comments) => comments,
        Err(e) => {
            warn!("Comment listing degraded to empty: {}", e);
            Vec::new()
        }
    };

    deliver_success_json(Some(json!({
        "item": item,
        "comments": comments,
    })))
}
