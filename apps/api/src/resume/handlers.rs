//! Axum route handlers for the résumé pipeline.

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    Json,
};
use bytes::Bytes;
use serde_json::{json, Value};
use tracing::warn;

use crate::resume::envelope::ResponseEnvelope;
use crate::state::AppState;

/// GET /api/v1/resumes/extract?filename=…
///
/// Direct trigger. The envelope is rendered as the HTTP response itself.
pub async fn handle_extract(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ResponseEnvelope {
    let event = json!({ "queryStringParameters": params });
    state.resume.handle(&event).await
}

/// POST /api/v1/resumes/invoke
///
/// Accepts a raw invocation payload of either trigger shape and returns the
/// envelope as a JSON document; the outcome lives in its `statusCode`.
/// A body that is not JSON gets a failure envelope too.
pub async fn handle_invoke(State(state): State<AppState>, body: Bytes) -> Json<ResponseEnvelope> {
    let event: Value = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!("Rejected invocation payload: {e}");
            return Json(ResponseEnvelope::failure(format!(
                "Invalid event payload: {e}"
            )));
        }
    };
    Json(state.resume.handle(&event).await)
}
