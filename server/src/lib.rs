use std::convert::Infallible;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::combinators::BoxBody;

use shared::config::LiveConfig;

pub mod auth;
pub mod content;
pub mod handlers;
pub mod interceptor;
pub mod provider;
pub mod session;

use provider::{DataStore, IdentityProvider};

/// Request body type used throughout the router and handlers.
///
/// `hyper::body::Incoming` is boxed at the hyper/tower boundary so tests can
/// drive handlers with in-memory bodies.
pub type RequestBody = BoxBody<Bytes, hyper::Error>;

/// Response body type produced by every handler.
pub type ResponseBody = BoxBody<Bytes, Infallible>;

/// Shared per-request application state.
///
/// The identity provider and data store sit behind trait objects so the
/// interceptor and form actions can be exercised against in-memory fakes.
#[derive(Clone)]
pub struct AppState {
    pub config: LiveConfig,
    pub identity: Arc<dyn IdentityProvider>,
    pub store: Arc<dyn DataStore>,
}
