use std::fs;
use tracing::{debug, error, info};

use crate::types::site_config::{AppConfig, ConfigError};

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    info!("Loading configuration from: {}", path);

    let contents = fs::read_to_string(path)?;
    debug!("Processing file: {}", path);

    if contents.trim().is_empty() {
        error!("Configuration file is empty");
        return Err(ConfigError::InvalidConfig("empty file".into()));
    }

    let config: AppConfig = toml::from_str(&contents)?;

    info!("Configuration loaded successfully");
    debug!("Config: {:?}", config);

    validate_config(&config)?;

    info!("Config validated");

    Ok(config)
}

fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.paths.web_dir.is_empty() {
        return Err(ConfigError::InvalidConfig("web_dir cannot be empty".into()));
    }

    if config.server.max_connections == 0 {
        return Err(ConfigError::InvalidConfig(
            "max_connections must be greater than 0".into(),
        ));
    }

    if config.provider.url.trim().is_empty() {
        return Err(ConfigError::InvalidConfig(
            "provider.url cannot be empty".into(),
        ));
    }

    if config.site.public_url.trim().is_empty() {
        return Err(ConfigError::InvalidConfig(
            "site.public_url cannot be empty".into(),
        ));
    }

    // The anon key must be resolvable (env var or config field). Validated
    // here so a bad config is rejected immediately — including on SIGHUP
    // reloads — rather than failing at the first provider call.
    if config.provider.resolved_anon_key().is_none() {
        return Err(ConfigError::InvalidConfig(
            "anon_key must be set via the SUPABASE_ANON_KEY env var or provider.anon_key config field"
                .into(),
        ));
    }

    Ok(())
}
