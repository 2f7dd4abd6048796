pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    response::Html,
    routing::{get, post},
    Router,
};

use crate::config::MAX_UPLOAD_BYTES;
use crate::resumes::handlers;
use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// GET /
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health::health_handler))
        .route("/upload", post(handlers::handle_upload))
        .route("/resumes", get(handlers::handle_list_resumes))
        .route("/resume/:id", get(handlers::handle_get_resume))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
