use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extraction::ExtractError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every variant renders as `200 OK` with `{"error": "<message>"}`; clients
/// detect failure from the payload, not the status code.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No file part")]
    NoFilePart,

    #[error("No selected file")]
    NoSelectedFile,

    #[error("Invalid file type")]
    InvalidFileType,

    #[error("File exceeds the 10 MiB upload limit")]
    UploadTooLarge,

    #[error("Error reading upload: {0}")]
    Upload(String),

    #[error("Error saving file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error extracting text: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Resume not found")]
    ResumeNotFound,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Io(e) => tracing::error!("Failed to persist upload: {e}"),
            AppError::Extraction(e) => tracing::warn!("Text extraction failed: {e}"),
            AppError::Database(e) => tracing::error!("Database error: {e}"),
            _ => tracing::debug!("Rejected request: {self}"),
        }

        Json(json!({ "error": self.to_string() })).into_response()
    }
}
