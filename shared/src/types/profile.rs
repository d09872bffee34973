use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated principal as reported by the identity provider.
///
/// Created on first successful authentication and immutable from this
/// system's perspective — we only ever observe it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Identity {
    pub id: Uuid,
    pub email: Option<String>,
}

/// The application-owned record extending an [`Identity`] with a display
/// username.
///
/// Created lazily (without a username) on the first auth callback, or
/// upserted at profile-completion time. Once `username` is non-empty it is
/// globally unique and never changes — enforced by application logic plus
/// the store's uniqueness constraint, not by a schema-level immutability
/// rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub id: Uuid,
    pub username: Option<String>,
    pub email: Option<String>,
}

impl Profile {
    /// True only when the username is present and not blank. A profile with
    /// `""` or whitespace-only username is treated exactly like one with no
    /// username at all.
    pub fn has_username(&self) -> bool {
        self.username
            .as_deref()
            .map(|u| !u.trim().is_empty())
            .unwrap_or(false)
    }
}

/// The opaque session cookie pair owned by the identity provider.
///
/// Refreshed on every intercepted request; the access token can rotate
/// mid-request, in which case both the forwarded request and the outgoing
/// response must carry the new pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}
