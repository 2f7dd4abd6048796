//! Text extraction from uploaded resume documents.
//!
//! Both parsers are synchronous and CPU-bound, so they run on the blocking
//! pool. Extraction is all-or-nothing: any parse failure fails the file.

mod docx;
mod pdf;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::resume::FileType;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid PDF: {0}")]
    Pdf(String),

    #[error("invalid Word document: {0}")]
    Word(String),

    #[error("extraction aborted: {0}")]
    Aborted(String),
}

/// Extracts the plain text of the document at `path`, trimmed of
/// surrounding whitespace.
pub async fn extract_text(path: &Path, file_type: FileType) -> Result<String, ExtractError> {
    let path: PathBuf = path.to_path_buf();

    let text = tokio::task::spawn_blocking(move || match file_type {
        FileType::Pdf => pdf::extract(&path),
        FileType::Doc | FileType::Docx => docx::extract(&path),
    })
    .await
    .map_err(|e| ExtractError::Aborted(e.to_string()))??;

    Ok(text.trim().to_string())
}
