use std::sync::Arc;

use crate::config::Config;
use crate::ner::NameExtractor;
use crate::resumes::store::ResumeStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Resume table access. Default: `PgResumeStore` over the pooled connection.
    pub store: Arc<dyn ResumeStore>,
    /// Name model loaded at startup; read-only afterwards.
    pub names: NameExtractor,
    pub config: Config,
}
