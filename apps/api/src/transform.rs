//! Shared failure type for the opaque transformation services
//! (background-removal model, hosted language model).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Transformation backend unreachable: {0}")]
    Unavailable(String),

    #[error("Transformation backend returned status {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Transformation backend returned unusable output: {0}")]
    InvalidOutput(String),
}

impl From<reqwest::Error> for TransformError {
    fn from(e: reqwest::Error) -> Self {
        TransformError::Unavailable(e.to_string())
    }
}
