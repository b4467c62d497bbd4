use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppError;
use crate::store::{AssetStore, CredentialStore};
use crate::session::SessionRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Credential index plus the per-user document store it owns.
    pub credentials: Arc<CredentialStore>,
    pub assets: Arc<AssetStore>,
    pub sessions: SessionRegistry,
}

impl AppState {
    /// Runs a synchronous store or render call on the blocking pool.
    pub async fn blocking<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        tokio::task::spawn_blocking(f).await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!("spawn_blocking failed: {e}"))
        })?
    }
}
