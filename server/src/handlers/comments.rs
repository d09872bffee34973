//! Comment submission on news articles.

use anyhow::Result;
use hyper::{Request, Response, header};
use tracing::{debug, warn};

use shared::types::NewComment;

use crate::content::visibility_for;
use crate::handlers::utils::forms::parse_form;
use crate::handlers::utils::responses::deliver_redirect;
use crate::session::CurrentSession;
use crate::{AppState, RequestBody, ResponseBody};

/// POST /news/:slug/comments — attach a comment and bounce back.
///
/// A blank body is a silent no-op: the form page simply reloads. Write
/// failures are logged and swallowed the same way; the browser always lands
/// back on the article.
pub async fn handle_post_comment(
    req: Request<RequestBody>,
    state: &AppState,
    session: &CurrentSession,
    slug: &str,
) -> Result<Response<ResponseBody>> {
    let back = req
        .headers()
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| format!("/news/{}", slug));

    let form = parse_form(req).await?;
    let body = form.get("body").map(|s| s.trim()).unwrap_or_default();
    if body.is_empty() {
        return deliver_redirect(&back);
    }

    let access = session.tokens.access_token.as_str();
    let visibility = visibility_for(state, Some(access)).await;

    let slug = shared::slug::slugify(slug);
    let item = match state
        .store
        .news_by_slug(Some(access), &slug, visibility)
        .await
    {
        Ok(Some(item)) => item,
        Ok(None) => {
            debug!("Comment posted against unknown slug");
            return deliver_redirect(&back);
        }
        Err(e) => {
            warn!("Article lookup failed for comment: {}", e);
            return deliver_redirect(&back);
        }
    };

    let comment = NewComment {
        entity_type: "news".to_string(),
        entity_id: item.id,
        author_id: session.identity.id,
        body: body.to_string(),
    };

    if let Err(e) = state.store.insert_comment(access, &comment).await {
        warn!("Comment insert failed: {}", e);
    }

    deliver_redirect(&back)
}
