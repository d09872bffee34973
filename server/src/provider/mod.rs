pub mod error;
pub mod http;
pub mod identity;
pub mod store;

pub use error::ProviderError;
pub use http::ProviderHttp;
pub use identity::{HttpIdentityProvider, IdentityProvider, RefreshOutcome};
pub use store::{DataStore, HttpDataStore};
