use std::path::{Path, PathBuf};

use unicode_normalization::UnicodeNormalization;

use crate::models::resume::FileType;

/// Rewrites an untrusted filename into one safe to join onto the upload
/// directory. Path separators become word breaks, then `sanitize_filename`
/// drops reserved names and characters no filesystem accepts. What is left is
/// NFKD-folded to ASCII, whitespace runs become `_`, anything outside
/// `[A-Za-z0-9_.-]` is dropped and leading or trailing `.`/`_` stripped.
/// May return an empty string.
pub fn secure_filename(filename: &str) -> String {
    let separated = filename.replace(['/', '\\'], " ");
    let sanitized = sanitize_filename::sanitize(separated);

    let ascii: String = sanitized.nfkd().filter(char::is_ascii).collect();
    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");

    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(['.', '_'])
        .to_string()
}

/// The name the upload is stored under. Keeps the validated extension even
/// when sanitising strips it.
pub fn stored_filename(original: &str, file_type: FileType) -> String {
    let sanitized = secure_filename(original);
    if FileType::from_filename(&sanitized) == Some(file_type) {
        return sanitized;
    }

    let stem = sanitized.trim_end_matches('.');
    let stem = if stem.is_empty() { "resume" } else { stem };
    format!("{stem}.{file_type}")
}

/// Writes the upload into `dir`, creating it if needed, and returns the
/// stored path with its size on disk. An existing file with the same name is
/// overwritten.
pub async fn persist(dir: &Path, filename: &str, data: &[u8]) -> std::io::Result<(PathBuf, u64)> {
    tokio::fs::create_dir_all(dir).await?;

    let path = dir.join(filename);
    tokio::fs::write(&path, data).await?;
    let size = tokio::fs::metadata(&path).await?.len();

    Ok((path, size))
}
