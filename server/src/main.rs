use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use http_body_util::BodyExt;
use hyper::server::conn::http1;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use server::AppState;
use server::handlers::routes::{SiteService, build_site_router};
use server::interceptor::InterceptorLayer;
use server::provider::{HttpDataStore, HttpIdentityProvider, ProviderHttp};
use shared::config::{LiveConfig, load_config};

#[derive(Parser, Debug)]
#[command(name = "server", about = "Municipal content site server")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let app_config = load_config(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config))?;

    let anon_key = app_config
        .provider
        .resolved_anon_key()
        .context("Provider anon key missing: set SUPABASE_ANON_KEY or provider.anon_key")?;
    let provider_http = ProviderHttp::new(app_config.provider.base_url(), anon_key);

    let addr = app_config.server.addr();
    let config = LiveConfig::new(app_config);

    let state = AppState {
        config: config.clone(),
        identity: Arc::new(HttpIdentityProvider::new(provider_http.clone())),
        store: Arc::new(HttpDataStore::new(provider_http)),
    };

    // SIGHUP swaps the config in place; every handler sees the new values on
    // its next read.
    spawn_reload_task(config.clone(), args.config.clone());

    let router = Arc::new(build_site_router(None, None));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Accept failed: {}", e);
                continue;
            }
        };
        let io = TokioIo::new(stream);

        let site = SiteService::new(Arc::clone(&router), state.clone());
        let stack = ServiceBuilder::new()
            .layer(CompressionLayer::new())
            .map_request(|req: hyper::Request<hyper::body::Incoming>| req.map(|b| b.boxed()))
            .layer(InterceptorLayer::new(state.clone()))
            .service(site);

        tokio::task::spawn(async move {
            if let Err(err) = http1::Builder::new()
                .timer(TokioTimer::new())
                .serve_connection(io, TowerToHyperService::new(stack))
                .await
            {
                error!("Error serving connection from {}: {:?}", peer, err);
            }
        });
    }
}

fn spawn_reload_task(config: LiveConfig, config_path: String) {
    tokio::spawn(async move {
        let Ok(mut hup) = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::hangup())
        else {
            warn!("SIGHUP handler unavailable; config hot-reload disabled");
            return;
        };

        while hup.recv().await.is_some() {
            match load_config(&config_path) {
                Ok(new_config) => {
                    config.reload(new_config).await;
                    info!("Configuration reloaded from {}", config_path);
                }
                Err(e) => error!("Config reload failed, keeping old config: {}", e),
            }
        }
    });
}
