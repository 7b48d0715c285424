pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::background::handlers as background;
use crate::resume::handlers as resume;
use crate::state::AppState;
use crate::studio::handlers as studio;

pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Background-removal API
        .route("/", get(background::handle_root))
        .route(
            "/remove-background/",
            post(background::handle_remove_background),
        )
        // Interactive studio
        .route("/studio", get(studio::handle_open))
        .route("/studio/:session_id/remove", post(studio::handle_remove))
        .route("/studio/:session_id/result", get(studio::handle_result))
        // Résumé extraction
        .route("/api/v1/resumes/extract", get(resume::handle_extract))
        .route("/api/v1/resumes/invoke", post(resume::handle_invoke))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}
