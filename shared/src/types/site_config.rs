use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: Option<u16>,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Base URL of the managed backend gateway (identity + REST + RPC).
    pub url: String,
    /// Public API key sent with every provider request.
    ///
    /// Prefer loading this via the `SUPABASE_ANON_KEY` environment variable.
    /// This config field is the fallback for deployments that cannot inject
    /// env vars at runtime (e.g. certain container setups).
    pub anon_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    /// Public origin of this site, used to build the magic-link redirect
    /// target (`{public_url}/auth/callback`).
    pub public_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PathsConfig {
    pub web_dir: String,
    pub icons: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub site: SiteConfig,
    pub paths: PathsConfig,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

impl ServerConfig {
    /// Full bind address, e.g. `"0.0.0.0:3000"`
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port.unwrap_or(3000))
    }
}

impl ProviderConfig {
    /// Resolve the anon key with the `SUPABASE_ANON_KEY` env var taking
    /// priority over the config file field.
    ///
    /// Returns `None` when neither source is set (startup treats this as a
    /// hard error).
    pub fn resolved_anon_key(&self) -> Option<String> {
        std::env::var("SUPABASE_ANON_KEY")
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| self.anon_key.clone())
            .filter(|s| !s.is_empty())
    }

    /// Provider base URL with any trailing slash removed.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

// ---------------------------------------------------------------------------
// Serde defaults
// ---------------------------------------------------------------------------

pub fn default_port() -> Option<u16> {
    Some(3000)
}

pub fn default_max_connections() -> usize {
    1000
}
