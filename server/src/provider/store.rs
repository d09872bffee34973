use async_trait::async_trait;
use hyper::Method;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use shared::types::{Comment, FeedbackEntry, NewComment, NewFeedback, NewsItem, Place, Profile};

use crate::content::Visibility;

use super::error::ProviderError;
use super::http::{ProviderHttp, classify_store_error};

/// The RLS-gated relational store, reached through its REST gateway.
///
/// Reads take an optional access token: `None` means the caller is
/// anonymous and the row policies of the anon role apply. Writes always
/// require a session token.
#[async_trait]
pub trait DataStore: Send + Sync {
    // ── Profiles ─────────────────────────────────────────────────────────
    async fn profile_by_id(
        &self,
        access: Option<&str>,
        id: Uuid,
    ) -> Result<Option<Profile>, ProviderError>;

    async fn profile_by_username(
        &self,
        access: Option<&str>,
        username: &str,
    ) -> Result<Option<Profile>, ProviderError>;

    /// Upsert keyed on the profile id (`on_conflict=id`).
    async fn upsert_profile(&self, access: &str, profile: &Profile)
    -> Result<(), ProviderError>;

    /// Insert the bare profile row created lazily after the first auth
    /// callback — no username yet.
    async fn insert_profile_stub(
        &self,
        access: &str,
        id: Uuid,
        email: Option<String>,
    ) -> Result<(), ProviderError>;

    // ── Authorization ────────────────────────────────────────────────────
    /// The zero-argument, session-scoped admin predicate RPC.
    async fn is_admin(&self, access: &str) -> Result<bool, ProviderError>;

    // ── Content ──────────────────────────────────────────────────────────
    async fn list_news(
        &self,
        access: Option<&str>,
        visibility: Visibility,
    ) -> Result<Vec<NewsItem>, ProviderError>;

    async fn news_by_slug(
        &self,
        access: Option<&str>,
        slug: &str,
        visibility: Visibility,
    ) -> Result<Option<NewsItem>, ProviderError>;

    async fn list_places(
        &self,
        access: Option<&str>,
        visibility: Visibility,
    ) -> Result<Vec<Place>, ProviderError>;

    async fn place_by_slug(
        &self,
        access: Option<&str>,
        slug: &str,
        visibility: Visibility,
    ) -> Result<Option<Place>, ProviderError>;

    async fn comments_for(
        &self,
        access: Option<&str>,
        entity_type: &str,
        entity_id: Uuid,
    ) -> Result<Vec<Comment>, ProviderError>;

    async fn insert_comment(&self, access: &str, comment: &NewComment)
    -> Result<(), ProviderError>;

    // ── Feedback ─────────────────────────────────────────────────────────
    async fn insert_feedback(
        &self,
        access: &str,
        feedback: &NewFeedback,
    ) -> Result<(), ProviderError>;

    /// Full feedback queue — RLS restricts this to administrators.
    async fn list_feedback(&self, access: &str) -> Result<Vec<FeedbackEntry>, ProviderError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation against the store's REST gateway
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct HttpDataStore {
    http: ProviderHttp,
}

impl HttpDataStore {
    pub fn new(http: ProviderHttp) -> Self {
        Self { http }
    }

    async fn get_rows<T: serde::de::DeserializeOwned>(
        &self,
        access: Option<&str>,
        path_and_query: &str,
    ) -> Result<Vec<T>, ProviderError> {
        let (status, body) = self
            .http
            .request(Method::GET, path_and_query, access, None, &[])
            .await?;

        if !status.is_success() {
            let err = classify_store_error(status, &body);
            debug!("Store read failed: {}", err);
            return Err(err);
        }

        ProviderHttp::decode(&body)
    }

    async fn insert_rows(
        &self,
        access: &str,
        path: &str,
        rows: serde_json::Value,
        extra_headers: &[(&str, &str)],
    ) -> Result<(), ProviderError> {
        let (status, body) = self
            .http
            .request(Method::POST, path, Some(access), Some(rows), extra_headers)
            .await?;

        if !status.is_success() {
            return Err(classify_store_error(status, &body));
        }
        Ok(())
    }
}

fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Append the draft filter for non-admin callers: only rows whose publish
/// timestamp is non-null are visible.
fn visibility_filter(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::Published => "&published_at=not.is.null",
        Visibility::All => "",
    }
}

const NEWS_COLUMNS: &str = "id,slug,title,excerpt,body_markdown,cover_image_path,published_at";
const PLACE_COLUMNS: &str = "id,slug,name,description_markdown,category_id,published_at";
const LISTING_LIMIT: usize = 30;

#[async_trait]
impl DataStore for HttpDataStore {
    async fn profile_by_id(
        &self,
        access: Option<&str>,
        id: Uuid,
    ) -> Result<Option<Profile>, ProviderError> {
        let rows: Vec<Profile> = self
            .get_rows(
                access,
                &format!("/rest/v1/profiles?id=eq.{}&select=id,username,email", id),
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn profile_by_username(
        &self,
        access: Option<&str>,
        username: &str,
    ) -> Result<Option<Profile>, ProviderError> {
        let rows: Vec<Profile> = self
            .get_rows(
                access,
                &format!(
                    "/rest/v1/profiles?username=eq.{}&select=id,username,email",
                    encode(username)
                ),
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn upsert_profile(
        &self,
        access: &str,
        profile: &Profile,
    ) -> Result<(), ProviderError> {
        self.insert_rows(
            access,
            "/rest/v1/profiles?on_conflict=id",
            json!([profile]),
            &[("prefer", "resolution=merge-duplicates")],
        )
        .await
    }

    async fn insert_profile_stub(
        &self,
        access: &str,
        id: Uuid,
        email: Option<String>,
    ) -> Result<(), ProviderError> {
        self.insert_rows(
            access,
            "/rest/v1/profiles",
            json!([{ "id": id, "email": email }]),
            &[],
        )
        .await
    }

    async fn is_admin(&self, access: &str) -> Result<bool, ProviderError> {
        let (status, body) = self
            .http
            .request(
                Method::POST,
                "/rest/v1/rpc/is_admin",
                Some(access),
                Some(json!({})),
                &[],
            )
            .await?;

        if !status.is_success() {
            return Err(classify_store_error(status, &body));
        }
        ProviderHttp::decode(&body)
    }

    async fn list_news(
        &self,
        access: Option<&str>,
        visibility: Visibility,
    ) -> Result<Vec<NewsItem>, ProviderError> {
        self.get_rows(
            access,
            &format!(
                "/rest/v1/news?select={}&order=published_at.desc.nullsfirst&limit={}{}",
                NEWS_COLUMNS,
                LISTING_LIMIT,
                visibility_filter(visibility)
            ),
        )
        .await
    }

    async fn news_by_slug(
        &self,
        access: Option<&str>,
        slug: &str,
        visibility: Visibility,
    ) -> Result<Option<NewsItem>, ProviderError> {
        let rows: Vec<NewsItem> = self
            .get_rows(
                access,
                &format!(
                    "/rest/v1/news?slug=eq.{}&select={}{}",
                    encode(slug),
                    NEWS_COLUMNS,
                    visibility_filter(visibility)
                ),
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn list_places(
        &self,
        access: Option<&str>,
        visibility: Visibility,
    ) -> Result<Vec<Place>, ProviderError> {
        self.get_rows(
            access,
            &format!(
                "/rest/v1/places?select={}&order=name.asc&limit={}{}",
                PLACE_COLUMNS,
                LISTING_LIMIT,
                visibility_filter(visibility)
            ),
        )
        .await
    }

    async fn place_by_slug(
        &self,
        access: Option<&str>,
        slug: &str,
        visibility: Visibility,
    ) -> Result<Option<Place>, ProviderError> {
        let rows: Vec<Place> = self
            .get_rows(
                access,
                &format!(
                    "/rest/v1/places?slug=eq.{}&select={}{}",
                    encode(slug),
                    PLACE_COLUMNS,
                    visibility_filter(visibility)
                ),
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn comments_for(
        &self,
        access: Option<&str>,
        entity_type: &str,
        entity_id: Uuid,
    ) -> Result<Vec<Comment>, ProviderError> {
        self.get_rows(
            access,
            &format!(
                "/rest/v1/comments?entity_type=eq.{}&entity_id=eq.{}&select=*&order=created_at.asc",
                encode(entity_type),
                entity_id
            ),
        )
        .await
    }

    async fn insert_comment(
        &self,
        access: &str,
        comment: &NewComment,
    ) -> Result<(), ProviderError> {
        self.insert_rows(access, "/rest/v1/comments", json!([comment]), &[])
            .await
    }

    async fn insert_feedback(
        &self,
        access: &str,
        feedback: &NewFeedback,
    ) -> Result<(), ProviderError> {
        self.insert_rows(access, "/rest/v1/feedback_messages", json!([feedback]), &[])
            .await
    }

    async fn list_feedback(&self, access: &str) -> Result<Vec<FeedbackEntry>, ProviderError> {
        self.get_rows(
            Some(access),
            "/rest/v1/feedback_messages?select=*&order=created_at.desc",
        )
        .await
    }
}
