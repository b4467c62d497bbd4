mod auth;
mod config;
mod errors;
mod models;
mod portfolio;
mod render;
mod routes;
mod session;
mod state;
mod store;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::session::SessionRegistry;
use crate::state::AppState;
use crate::store::{AssetStore, CredentialStore};

const SESSION_SWEEP_INTERVAL: StdDuration = StdDuration::from_secs(300);

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Folio API v{}", env!("CARGO_PKG_VERSION"));

    // Open the flat-file stores
    let data_dir = config.data_dir.clone();
    let credentials = tokio::task::spawn_blocking(move || CredentialStore::open(&data_dir))
        .await
        .context("spawn_blocking failed while opening the credential store")?
        .with_context(|| format!("Cannot open data directory {}", config.data_dir.display()))?;
    let assets = AssetStore::new(&config.data_dir);
    info!(
        "Data directory: {} (validation {}, PDF page size {})",
        config.data_dir.display(),
        if config.enforce_validation { "enforced" } else { "advisory" },
        config.pdf_page_size
    );

    // Sessions
    let sessions = SessionRegistry::new(chrono::Duration::hours(config.session_ttl_hours));
    spawn_session_sweeper(sessions.clone());

    // Build app state
    let state = AppState {
        config: config.clone(),
        credentials: Arc::new(credentials),
        assets: Arc::new(assets),
        sessions,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the editor frontend has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Evicts expired sessions every few minutes.
fn spawn_session_sweeper(sessions: SessionRegistry) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = sessions.purge_expired();
            if removed > 0 {
                debug!(
                    "Evicted {removed} expired sessions ({} active)",
                    sessions.len()
                );
            }
        }
    });
}
