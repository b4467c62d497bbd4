use axum::Json;
use serde_json::{json, Value};

use crate::models::catalog::{catalog, Catalog};

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "folio-api"
    }))
}

/// GET /api/v1/catalog
/// Static lists the editor builds its pickers from.
pub async fn catalog_handler() -> Json<Catalog> {
    Json(catalog())
}
