//! The fail-closed admin predicate.

use tracing::debug;

use crate::AppState;

/// Ask the store whether the current session belongs to an administrator.
///
/// Fail-closed: no session, a transport failure, a denied RPC — every
/// non-`Ok(true)` outcome means "not an admin". The result is never cached;
/// revocation must take effect on the next request.
pub async fn get_is_admin(state: &AppState, access: Option<&str>) -> bool {
    let Some(access) = access else {
        return false;
    };

    match state.store.is_admin(access).await {
        Ok(is_admin) => is_admin,
        Err(e) => {
            debug!("Admin predicate degraded to false: {}", e);
            false
        }
    }
}
