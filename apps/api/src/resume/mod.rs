// Résumé extraction: locate a PDF in object storage, have the language model
// structure its text, store the JSON next to the other extractions.
// Single attempt, all-or-nothing: a failing stage leaves nothing behind.

pub mod envelope;
pub mod handlers;
pub mod pdf;
pub mod pipeline;
pub mod prompts;
pub mod schema;
pub mod trigger;

use thiserror::Error;

use crate::secrets::SecretError;
use crate::storage::StorageError;
use crate::transform::TransformError;

pub use pipeline::{PipelineSettings, ResumePipeline};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    MissingParameter(String),

    #[error(transparent)]
    Secret(#[from] SecretError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Cannot read document: {0}")]
    Decode(String),

    #[error("No content extracted from the resume")]
    EmptyDocument,

    #[error("Failed to extract data from the resume: {0}")]
    Transform(#[from] TransformError),

    #[error("Model output is not valid JSON: {0}")]
    Parse(String),

    #[error("Cannot serialize extraction: {0}")]
    Serialize(#[from] serde_json::Error),
}
