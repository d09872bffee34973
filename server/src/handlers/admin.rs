//! Administrator endpoints.
//!
//! The router has already verified the admin predicate before these run;
//! the store's row policies enforce it a second time on every read.

use anyhow::Result;
use hyper::{Request, Response};
use serde_json::json;
use tracing::warn;

use crate::content::Visibility;
use crate::handlers::utils::responses::deliver_success_json;
use crate::session::CurrentSession;
use crate::{AppState, RequestBody, ResponseBody};

/// GET /admin — the dashboard: drafts and published counts per section.
pub async fn handle_admin_home(
    _req: Request<RequestBody>,
    state: &AppState,
    session: &CurrentSession,
) -> Result<Response<ResponseBody>> {
    let access = session.tokens.access_token.as_str();

    let news = match state.store.list_news(Some(access), Visibility::All).await {
        Ok(items) => items,
        Err(e) => {
            warn!("Admin news listing degraded to empty: {}", e);
            Vec::new()
        }
    };
    let places = match state.store.list_places(Some(access), Visibility::All).await {
        Ok(places) => places,
        Err(e) => {
            warn!("Admin place listing degraded to empty: {}", e);
            Vec::new()
        }
    };

    deliver_success_json(Some(json!({
        "news": {
            "total": news.len(),
            "drafts": news.iter().filter(|n| !n.is_published()).count(),
            "items": news,
        },
        "places": {
            "total": places.len(),
            "drafts": places.iter().filter(|p| !p.is_published()).count(),
            "items": places,
        },
    })))
}

/// GET /admin/feedback — the full feedback queue, newest first.
pub async fn handle_admin_feedback(
    _req: Request<RequestBody>,
    state: &AppState,
    session: &CurrentSession,
) -> Result<Response<ResponseBody>> {
    let entries = match state
        .store
        .list_feedback(&session.tokens.access_token)
        .await
    {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Feedback listing degraded to empty: {}", e);
            Vec::new()
        }
    };

    deliver_success_json(Some(entries))
}
