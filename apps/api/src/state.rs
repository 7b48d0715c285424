use std::sync::Arc;

use crate::background::BackgroundRemover;
use crate::resume::ResumePipeline;
use crate::studio::SessionRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything here is built once at startup.
#[derive(Clone)]
pub struct AppState {
    /// Background-removal model shared by the API and the studio.
    pub remover: Arc<dyn BackgroundRemover>,
    pub studio: Arc<SessionRegistry>,
    pub resume: Arc<ResumePipeline>,
}
