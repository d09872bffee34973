use tracing::debug;

use shared::types::{Identity, SessionTokens};

use crate::provider::IdentityProvider;

use super::cookies::{ACCESS_COOKIE, CookieReader, CookieWriter, REFRESH_COOKIE};

/// A live session resolved for the current request. Stored in request
/// extensions by the interceptor so handlers don't repeat the provider call.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub identity: Identity,
    pub tokens: SessionTokens,
}

/// Wraps the identity provider's cookie-based session protocol.
///
/// Bound per request to a cookie reader and two writers. The contract for
/// writes: any refreshed cookie is mirrored to BOTH the forwarded request
/// (downstream handlers must see the rotated token) and the outgoing
/// response (the browser must receive it) — the token can rotate
/// mid-request and either copy alone is insufficient.
pub struct SessionClient<'a> {
    provider: &'a dyn IdentityProvider,
}

impl<'a> SessionClient<'a> {
    pub fn new(provider: &'a dyn IdentityProvider) -> Self {
        Self { provider }
    }

    /// Force a session refresh by requesting the current identity.
    ///
    /// Every identity-provider failure degrades to `None` (treated as "no
    /// authenticated identity"); the caller never sees an error.
    pub async fn refresh(
        &self,
        cookies: &dyn CookieReader,
        request_writer: &mut dyn CookieWriter,
        response_writer: &mut dyn CookieWriter,
    ) -> Option<CurrentSession> {
        let access_token = cookies.get(ACCESS_COOKIE)?;
        let refresh_token = cookies.get(REFRESH_COOKIE).unwrap_or_default();

        let tokens = SessionTokens {
            access_token,
            refresh_token,
        };

        match self.provider.user_for_session(&tokens).await {
            Ok(Some(outcome)) => {
                let tokens = match outcome.rotated {
                    Some(rotated) => {
                        request_writer.set(ACCESS_COOKIE, &rotated.access_token);
                        request_writer.set(REFRESH_COOKIE, &rotated.refresh_token);
                        response_writer.set(ACCESS_COOKIE, &rotated.access_token);
                        response_writer.set(REFRESH_COOKIE, &rotated.refresh_token);
                        rotated
                    }
                    None => tokens,
                };
                Some(CurrentSession {
                    identity: outcome.identity,
                    tokens,
                })
            }
            Ok(None) => None,
            Err(e) => {
                debug!("Session refresh degraded to unauthenticated: {}", e);
                None
            }
        }
    }

    /// Install a freshly minted session pair (auth-callback flow).
    pub fn install(tokens: &SessionTokens, response_writer: &mut dyn CookieWriter) {
        response_writer.set(ACCESS_COOKIE, &tokens.access_token);
        response_writer.set(REFRESH_COOKIE, &tokens.refresh_token);
    }

    /// Destroy the session cookies (sign-out flow).
    pub fn clear(response_writer: &mut dyn CookieWriter) {
        response_writer.clear(ACCESS_COOKIE);
        response_writer.clear(REFRESH_COOKIE);
    }
}
