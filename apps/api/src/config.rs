use std::path::PathBuf;

use anyhow::{Context, Result};
use sqlx::postgres::PgConnectOptions;

/// Largest accepted request body (multipart upload included).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Placeholder stored in `position` until position extraction exists.
pub const DEFAULT_POSITION: &str = "To be determined";

/// Application configuration loaded from environment variables.
/// Every variable has a default; only malformed numbers abort startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_host: String,
    pub db_port: u16,
    pub db_user: String,
    pub db_password: String,
    pub db_name: String,
    pub upload_folder: PathBuf,
    pub model_path: PathBuf,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            db_host: var("DB_HOST", "localhost"),
            db_port: var("DB_PORT", "5432")
                .parse::<u16>()
                .context("DB_PORT must be a valid port number")?,
            db_user: var("DB_USER", "your_username"),
            db_password: var("DB_PASSWORD", "your_password"),
            db_name: var("DB_NAME", "your_database"),
            upload_folder: PathBuf::from(var("UPLOAD_FOLDER", "uploads")),
            model_path: PathBuf::from(var("MODEL_PATH", "models/name_extraction_model.json")),
            port: var("PORT", "5000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: var("RUST_LOG", "info"),
        })
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.db_host)
            .port(self.db_port)
            .username(&self.db_user)
            .password(&self.db_password)
            .database(&self.db_name)
    }
}
