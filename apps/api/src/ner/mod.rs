//! Named-entity recognition used to guess the candidate's name.
//!
//! The model is loaded once at startup and handed to `AppState` wrapped in a
//! `NameExtractor`. A failed load leaves the extractor without a model and
//! every call answers with a sentinel instead of an error.

pub mod gazetteer;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use gazetteer::GazetteerModel;

/// Label the model assigns to person names.
pub const NAME_LABEL: &str = "NAME";

pub const MODEL_NOT_AVAILABLE: &str = "Model not available";
pub const NAME_NOT_FOUND: &str = "Name not found";

/// A labelled span of the input text. `start`/`end` are byte offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub label: String,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed model file: {0}")]
    Format(#[from] serde_json::Error),

    #[error("invalid model: {0}")]
    Invalid(String),

    #[error("input of {len} characters exceeds model limit of {max}")]
    InputTooLarge { len: usize, max: usize },
}

/// A pre-trained entity tagger. Implementations are read-only after load.
pub trait EntityRecognizer: Send + Sync {
    fn recognize(&self, text: &str) -> Result<Vec<Entity>, ModelError>;
}

/// Picks the candidate name out of resume text.
#[derive(Clone)]
pub struct NameExtractor {
    model: Option<Arc<dyn EntityRecognizer>>,
}

impl NameExtractor {
    pub fn new(model: Arc<dyn EntityRecognizer>) -> Self {
        Self { model: Some(model) }
    }

    /// An extractor whose model failed to load.
    pub fn unavailable() -> Self {
        Self { model: None }
    }

    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    /// Returns the first `NAME` entity, or a sentinel string when the model is
    /// missing, finds nothing, or fails.
    pub fn extract(&self, text: &str) -> String {
        let Some(model) = &self.model else {
            return MODEL_NOT_AVAILABLE.to_string();
        };

        match model.recognize(text) {
            Ok(entities) => entities
                .into_iter()
                .find(|e| e.label == NAME_LABEL)
                .map(|e| e.text)
                .unwrap_or_else(|| NAME_NOT_FOUND.to_string()),
            Err(e) => format!("Error extracting name: {e}"),
        }
    }
}
