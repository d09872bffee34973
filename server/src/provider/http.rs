use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request, StatusCode};
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::TokioExecutor;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::ProviderError;

/// Thin JSON-over-HTTP helper shared by the identity and store clients.
///
/// Every request carries the public `apikey` header; the `Authorization`
/// bearer defaults to the anon key and is overridden with the session's
/// access token for RLS-scoped calls.
#[derive(Clone)]
pub struct ProviderHttp {
    client: Client<HttpConnector, Full<Bytes>>,
    base: String,
    anon_key: String,
}

impl ProviderHttp {
    pub fn new(base: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let client = Client::builder(TokioExecutor::new()).build_http();
        Self {
            client,
            base: base.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }

    /// Issue a request and return the raw status + body. Non-2xx statuses
    /// are returned as-is; classification is up to the caller because the
    /// identity client treats 401 as a signal, not an error.
    pub async fn request(
        &self,
        method: Method,
        path_and_query: &str,
        bearer: Option<&str>,
        body: Option<serde_json::Value>,
        extra_headers: &[(&str, &str)],
    ) -> Result<(StatusCode, Bytes), ProviderError> {
        let uri = format!("{}{}", self.base, path_and_query);
        debug!("Provider request: {} {}", method, uri);

        let mut builder = Request::builder()
            .method(method)
            .uri(&uri)
            .header("apikey", &self.anon_key)
            .header(
                "authorization",
                format!("Bearer {}", bearer.unwrap_or(&self.anon_key)),
            );

        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }
        for (name, value) in extra_headers {
            builder = builder.header(*name, *value);
        }

        let payload = body.map(|v| v.to_string()).unwrap_or_default();
        let req = builder
            .body(Full::new(Bytes::from(payload)))
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let res = self
            .client
            .request(req)
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = res.status();
        let bytes = res
            .into_body()
            .collect()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?
            .to_bytes();

        debug!("Provider response: {} ({} bytes)", status, bytes.len());
        Ok((status, bytes))
    }

    pub fn decode<T: DeserializeOwned>(bytes: &Bytes) -> Result<T, ProviderError> {
        serde_json::from_slice(bytes).map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

/// Map a non-2xx store response to a typed error, special-casing the
/// unique-constraint violation code the gateway reports as `"23505"`.
pub fn classify_store_error(status: StatusCode, body: &Bytes) -> ProviderError {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        if value.get("code").and_then(|c| c.as_str()) == Some("23505") {
            return ProviderError::UniqueViolation;
        }
    }
    ProviderError::Status {
        status: status.as_u16(),
        message: String::from_utf8_lossy(body).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_code_is_classified() {
        let body = Bytes::from(r#"{"code":"23505","message":"duplicate key value"}"#);
        let err = classify_store_error(StatusCode::CONFLICT, &body);
        assert!(err.is_unique_violation());
    }

    #[test]
    fn other_store_errors_keep_status() {
        let body = Bytes::from(r#"{"code":"42501","message":"permission denied"}"#);
        let err = classify_store_error(StatusCode::FORBIDDEN, &body);
        match err {
            ProviderError::Status { status, .. } => assert_eq!(status, 403),
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn non_json_error_body_keeps_status() {
        let body = Bytes::from("upstream timeout");
        let err = classify_store_error(StatusCode::BAD_GATEWAY, &body);
        assert!(!err.is_unique_violation());
    }
}
