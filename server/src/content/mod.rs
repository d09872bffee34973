//! Content access control: the per-query visibility rule.

use crate::AppState;
use crate::auth::admin::get_is_admin;

/// Query scope applied to every content listing.
///
/// Non-admins only see rows with a non-null publish timestamp; admins get
/// the unfiltered set, drafts included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Published,
    All,
}

impl Visibility {
    pub fn for_admin(is_admin: bool) -> Self {
        if is_admin {
            Visibility::All
        } else {
            Visibility::Published
        }
    }
}

/// Resolve the caller's visibility scope, consulting the admin predicate
/// fresh on every call. The predicate is fail-closed, so any provider error
/// lands on `Published`.
pub async fn visibility_for(state: &AppState, access: Option<&str>) -> Visibility {
    Visibility::for_admin(get_is_admin(state, access).await)
}
