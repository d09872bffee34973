//! The resident feedback form.

use anyhow::Result;
use hyper::{Request, Response};
use tracing::{info, warn};

use shared::types::{NewFeedback, RedirectCode};

use crate::handlers::utils::forms::parse_form;
use crate::handlers::utils::responses::deliver_redirect;
use crate::session::CurrentSession;
use crate::{AppState, RequestBody, ResponseBody};

const FEEDBACK_PAGE: &str = "/feedback";
const SUBJECT_MAX_CHARS: usize = 200;
const MESSAGE_MAX_CHARS: usize = 5000;

/// POST /feedback — queue a feedback message for the administrators.
pub async fn handle_submit_feedback(
    req: Request<RequestBody>,
    state: &AppState,
    session: &CurrentSession,
) -> Result<Response<ResponseBody>> {
    let form = parse_form(req).await?;
    let subject = form.get("subject").map(|s| s.trim()).unwrap_or_default();
    let message = form.get("message").map(|s| s.trim()).unwrap_or_default();
    let target = submit_feedback(state, session, subject, message).await;
    deliver_redirect(&target)
}

/// Validation and insert, returning the redirect target.
pub async fn submit_feedback(
    state: &AppState,
    session: &CurrentSession,
    subject: &str,
    message: &str,
) -> String {
    if subject.is_empty() || message.is_empty() {
        return RedirectCode::EmptyFields.target(FEEDBACK_PAGE);
    }
    if subject.chars().count() > SUBJECT_MAX_CHARS {
        return RedirectCode::SubjectTooLong.target(FEEDBACK_PAGE);
    }
    if message.chars().count() > MESSAGE_MAX_CHARS {
        return RedirectCode::MessageTooLong.target(FEEDBACK_PAGE);
    }

    let feedback = NewFeedback::new(
        session.identity.id,
        subject.to_string(),
        message.to_string(),
    );

    match state
        .store
        .insert_feedback(&session.tokens.access_token, &feedback)
        .await
    {
        Ok(()) => {
            info!("Feedback queued");
            format!("{}?success=1", FEEDBACK_PAGE)
        }
        Err(e) => {
            warn!("Feedback insert failed: {}", e);
            RedirectCode::Unknown.target(FEEDBACK_PAGE)
        }
    }
}
