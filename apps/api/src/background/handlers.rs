//! Axum route handlers for the background-removal API.

use axum::{
    body::Body,
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde_json::{json, Value};
use tracing::info;

use crate::background::remove_background;
use crate::errors::AppError;
use crate::state::AppState;

/// GET /
pub async fn handle_root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the Background Removal API" }))
}

/// POST /remove-background/
///
/// Takes a multipart `file` field, returns the cutout as `image/png`.
pub async fn handle_remove_background(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let upload = read_file_field(multipart).await?;
    info!("Removing background from {} byte upload", upload.len());

    let asset = remove_background(state.remover.as_ref(), upload).await?;

    Ok((
        [(header::CONTENT_TYPE, asset.content_type())],
        Body::from(asset.bytes),
    )
        .into_response())
}

/// Pulls the bytes of the `file` field out of a multipart body.
async fn read_file_field(mut multipart: Multipart) -> Result<Bytes, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            return field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Cannot read upload: {e}")));
        }
    }
    Err(AppError::Validation("file field is required".to_string()))
}
