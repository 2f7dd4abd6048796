mod config;
mod db;
mod errors;
mod extraction;
mod models;
mod ner;
mod resumes;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::db::create_pool;
use crate::ner::{GazetteerModel, NameExtractor};
use crate::resumes::store::PgResumeStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume intake v{}", env!("CARGO_PKG_VERSION"));

    // Name model: a failed load degrades extraction to a sentinel for the
    // lifetime of the process.
    let names = load_name_model(&config);

    // PostgreSQL pool (connects lazily)
    let db = create_pool(&config);
    let store = Arc::new(PgResumeStore::new(db));

    let state = AppState {
        store,
        names,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn load_name_model(config: &Config) -> NameExtractor {
    match GazetteerModel::load(&config.model_path) {
        Ok(model) => {
            info!(
                "Model loaded successfully from {} (label {})",
                config.model_path.display(),
                model.label()
            );
            NameExtractor::new(Arc::new(model))
        }
        Err(e) => {
            warn!(
                "Error loading model from {}: {e}",
                config.model_path.display()
            );
            NameExtractor::unavailable()
        }
    }
}
