use async_trait::async_trait;
use hyper::{Method, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};
use uuid::Uuid;

use shared::types::{Identity, SessionTokens};

use super::error::ProviderError;
use super::http::ProviderHttp;

/// Result of forcing a session refresh.
///
/// `rotated` is `Some` when the provider minted a new token pair while
/// resolving the identity — the caller must mirror the new cookies onto both
/// the forwarded request and the outgoing response.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub identity: Identity,
    pub rotated: Option<SessionTokens>,
}

/// The external identity provider (email-OTP auth, cookie sessions).
///
/// `Ok(None)` means "no authenticated identity" (expired or invalid
/// session); `Err` is reserved for transport/decode failures, which call
/// sites degrade to the same thing.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Force a session refresh: resolve the identity behind the token pair,
    /// rotating the tokens when the access token has expired.
    async fn user_for_session(
        &self,
        tokens: &SessionTokens,
    ) -> Result<Option<RefreshOutcome>, ProviderError>;

    /// Exchange a one-time auth code (from the emailed magic link) for a
    /// session and its identity.
    async fn exchange_code(&self, code: &str)
    -> Result<(SessionTokens, Identity), ProviderError>;

    /// Dispatch a one-time sign-in link to `email`; the link lands on
    /// `redirect_to` with a `code` parameter.
    async fn send_otp(&self, email: &str, redirect_to: &str) -> Result<(), ProviderError>;

    /// Invalidate the session behind `access_token`.
    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError>;
}

// ---------------------------------------------------------------------------
// HTTP implementation against the provider's auth endpoints
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ProviderUser {
    id: Uuid,
    email: Option<String>,
}

impl From<ProviderUser> for Identity {
    fn from(u: ProviderUser) -> Self {
        Identity {
            id: u.id,
            email: u.email,
        }
    }
}

#[derive(Deserialize)]
struct TokenGrant {
    access_token: String,
    refresh_token: String,
    user: ProviderUser,
}

#[derive(Clone)]
pub struct HttpIdentityProvider {
    http: ProviderHttp,
}

impl HttpIdentityProvider {
    pub fn new(http: ProviderHttp) -> Self {
        Self { http }
    }

    async fn refresh_grant(
        &self,
        refresh_token: &str,
    ) -> Result<Option<TokenGrant>, ProviderError> {
        if refresh_token.is_empty() {
            return Ok(None);
        }

        let (status, body) = self
            .http
            .request(
                Method::POST,
                "/auth/v1/token?grant_type=refresh_token",
                None,
                Some(json!({ "refresh_token": refresh_token })),
                &[],
            )
            .await?;

        if !status.is_success() {
            debug!("Refresh grant rejected with {}", status);
            return Ok(None);
        }

        Ok(Some(ProviderHttp::decode(&body)?))
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn user_for_session(
        &self,
        tokens: &SessionTokens,
    ) -> Result<Option<RefreshOutcome>, ProviderError> {
        let (status, body) = self
            .http
            .request(
                Method::GET,
                "/auth/v1/user",
                Some(&tokens.access_token),
                None,
                &[],
            )
            .await?;

        if status.is_success() {
            let user: ProviderUser = ProviderHttp::decode(&body)?;
            return Ok(Some(RefreshOutcome {
                identity: user.into(),
                rotated: None,
            }));
        }

        if status != StatusCode::UNAUTHORIZED {
            warn!("Identity lookup failed with {}", status);
            return Ok(None);
        }

        // Access token expired — try to rotate via the refresh token.
        match self.refresh_grant(&tokens.refresh_token).await? {
            Some(grant) => Ok(Some(RefreshOutcome {
                identity: grant.user.into(),
                rotated: Some(SessionTokens {
                    access_token: grant.access_token,
                    refresh_token: grant.refresh_token,
                }),
            })),
            None => Ok(None),
        }
    }

    async fn exchange_code(
        &self,
        code: &str,
    ) -> Result<(SessionTokens, Identity), ProviderError> {
        let (status, body) = self
            .http
            .request(
                Method::POST,
                "/auth/v1/token?grant_type=pkce",
                None,
                Some(json!({ "auth_code": code })),
                &[],
            )
            .await?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let grant: TokenGrant = ProviderHttp::decode(&body)?;
        Ok((
            SessionTokens {
                access_token: grant.access_token,
                refresh_token: grant.refresh_token,
            },
            grant.user.into(),
        ))
    }

    async fn send_otp(&self, email: &str, redirect_to: &str) -> Result<(), ProviderError> {
        let redirect: String = form_urlencoded::byte_serialize(redirect_to.as_bytes()).collect();
        let (status, body) = self
            .http
            .request(
                Method::POST,
                &format!("/auth/v1/otp?redirect_to={}", redirect),
                None,
                Some(json!({ "email": email, "create_user": true })),
                &[],
            )
            .await?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        Ok(())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
        let (status, _body) = self
            .http
            .request(Method::POST, "/auth/v1/logout", Some(access_token), None, &[])
            .await?;

        // A dead session is already signed out as far as we care.
        if !status.is_success() && status != StatusCode::UNAUTHORIZED {
            warn!("Sign-out returned {}", status);
        }
        Ok(())
    }
}
