use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use tracing::info;

use crate::auth::SessionContext;
use crate::errors::AppError;
use crate::state::AppState;
use crate::store::AssetCategory;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Relative path to store in the document, e.g. `images/me.png`.
    pub path: String,
}

/// POST /api/v1/assets/:category
///
/// Expects a multipart form with a `file` field. Same-named uploads in one
/// category overwrite each other.
pub async fn handle_upload(
    State(state): State<AppState>,
    Extension(ctx): Extension<SessionContext>,
    Path(category): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let category: AssetCategory = category
        .parse()
        .map_err(|_| AppError::NotFound(format!("Unknown asset category '{category}'")))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read multipart data: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("Uploaded file has no name".to_string()))?;
        if !category.allows(&filename) {
            return Err(AppError::Validation(format!(
                "'{filename}' is not allowed; {category} accepts {}",
                category.allowed_extensions().join(", ")
            )));
        }
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read file bytes: {e}")))?;

        let assets = state.assets.clone();
        let path = state
            .blocking(move || Ok(assets.store(category, &filename, &data)?))
            .await?;
        info!("{} uploaded {path}", ctx.username);
        return Ok((StatusCode::CREATED, Json(UploadResponse { path })));
    }

    Err(AppError::Validation(
        "Multipart form must include a file field".to_string(),
    ))
}
