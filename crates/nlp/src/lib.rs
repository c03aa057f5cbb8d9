#![forbid(unsafe_code)]

mod perceptron;
mod resources;
mod tokenizer;

pub use perceptron::{PerceptronAnnotator, PerceptronTagger};
pub use resources::{DEFAULT_MODEL_URL, MODEL_FILES, ModelPaths, ensure_model};
pub use tokenizer::tokenize;

use concord_core::text::TaggedToken;

#[derive(Debug)]
pub enum NlpError {
    Io(std::io::Error),
    Json(serde_json::Error),
    MissingResource(String),
    Fetch { resource: String, detail: String },
}

impl std::fmt::Display for NlpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Json(err) => write!(f, "model json: {err}"),
            Self::MissingResource(resource) => {
                write!(f, "tagging resource '{resource}' is missing")
            }
            Self::Fetch { resource, detail } => {
                write!(f, "fetch of '{resource}' failed: {detail}")
            }
        }
    }
}

impl std::error::Error for NlpError {}

impl From<std::io::Error> for NlpError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for NlpError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// The tagging capability boundary: verse text in, ordered token/tag pairs
/// out. The pipeline only sees this trait, so any compliant toolkit can be
/// substituted for the built-in perceptron tagger.
pub trait Annotator {
    fn annotate(&self, text: &str) -> Vec<TaggedToken>;
}
