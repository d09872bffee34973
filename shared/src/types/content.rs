use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A news article row. `published_at = None` marks a draft, visible only to
/// administrators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsItem {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_markdown: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image_path: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl NewsItem {
    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }
}

/// A point-of-interest row. Same publish semantics as [`NewsItem`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Place {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_markdown: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Place {
    pub fn is_published(&self) -> bool {
        self.published_at.is_some()
    }
}

/// A reader comment attached to a news item or place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: Uuid,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a comment — ids and timestamp are assigned by the
/// store.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewComment {
    pub entity_type: String,
    pub entity_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
}

/// A feedback message submitted by a resident.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedbackEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject: String,
    pub message: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for feedback. Always enters the queue as `"new"`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewFeedback {
    pub user_id: Uuid,
    pub subject: String,
    pub message: String,
    pub status: String,
}

impl NewFeedback {
    pub fn new(user_id: Uuid, subject: String, message: String) -> Self {
        Self {
            user_id,
            subject,
            message,
            status: "new".to_string(),
        }
    }
}
