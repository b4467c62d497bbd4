use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::portfolio::editing::EditError;
use crate::portfolio::validation::ValidationReport;
use crate::render::RenderError;
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A save refused under enforced validation. The report travels in the
    /// response body as structured JSON.
    #[error("Document failed validation ({} issues)", .0.issues.len())]
    ValidationFailed(ValidationReport),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::AlreadyExists => AppError::Conflict(e.to_string()),
            StoreError::NotFound => AppError::NotFound(e.to_string()),
            // Login maps these itself; anywhere else they mean a bad session.
            StoreError::WrongPassword => AppError::InvalidCredentials,
            StoreError::WeakPassword
            | StoreError::InvalidUsername(_)
            | StoreError::InvalidFilename(_)
            | StoreError::InvalidAssetPath(_) => AppError::Validation(e.to_string()),
            StoreError::Io(_) | StoreError::Serialization(_) | StoreError::PasswordHash(_) => {
                AppError::Storage(e.to_string())
            }
        }
    }
}

impl From<EditError> for AppError {
    fn from(e: EditError) -> Self {
        match e {
            EditError::ItemNotFound(..) => AppError::NotFound(e.to_string()),
            EditError::NotAList(_)
            | EditError::NoSectionTitle(_)
            | EditError::NoSectionImage(_)
            | EditError::InvalidItem(..) => AppError::Validation(e.to_string()),
        }
    }
}

impl From<RenderError> for AppError {
    fn from(e: RenderError) -> Self {
        match e {
            RenderError::UnknownFormat(_) => AppError::NotFound(e.to_string()),
            RenderError::Json(_) | RenderError::Pdf(_) => AppError::Internal(e.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::ValidationFailed(report) = &self {
            let body = Json(json!({
                "error": {
                    "code": "VALIDATION_FAILED",
                    "message": self.to_string()
                },
                "validation": report
            }));
            return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
        }

        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::ValidationFailed(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_FAILED",
                self.to_string(),
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication required".to_string(),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                self.to_string(),
            ),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
