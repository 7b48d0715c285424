//! Axum route handlers for the studio.

use askama::Template;
use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::background::BackgroundError;
use crate::errors::AppError;
use crate::state::AppState;
use crate::studio::page::{ErrorPage, ResultPage, UploadPage};
use crate::studio::{is_accepted_filename, ACCEPTED_EXTENSIONS, DOWNLOAD_FILENAME};

fn page(status: StatusCode, template: impl Template) -> Result<Response, AppError> {
    Ok((status, Html(template.render()?)).into_response())
}

fn error_page(
    status: StatusCode,
    session_id: Option<Uuid>,
    message: impl Into<String>,
) -> Result<Response, AppError> {
    page(status, ErrorPage::new(session_id, message))
}

/// GET /studio
pub async fn handle_open(State(state): State<AppState>) -> Result<Response, AppError> {
    let id = state.studio.open().await;
    page(StatusCode::OK, UploadPage::new(id))
}

struct Upload {
    file_name: String,
    bytes: Bytes,
}

async fn read_upload(mut multipart: Multipart) -> Result<Option<Upload>, String> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Malformed upload: {e}"))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| format!("Cannot read upload: {e}"))?;
        return Ok(Some(Upload { file_name, bytes }));
    }
    Ok(None)
}

/// POST /studio/:session_id/remove
///
/// Every failure becomes a message on the page; the session stays open.
pub async fn handle_remove(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let Some(session) = state.studio.get(session_id).await else {
        return error_page(
            StatusCode::NOT_FOUND,
            None,
            "This session has expired. Start a new session.",
        );
    };

    let upload = match read_upload(multipart).await {
        Ok(Some(upload)) if !upload.bytes.is_empty() => upload,
        Ok(_) => {
            return error_page(
                StatusCode::BAD_REQUEST,
                Some(session_id),
                "Choose an image first.",
            )
        }
        Err(msg) => return error_page(StatusCode::BAD_REQUEST, Some(session_id), msg),
    };

    if !is_accepted_filename(&upload.file_name) {
        warn!("Studio rejected upload {:?}", upload.file_name);
        return error_page(
            StatusCode::BAD_REQUEST,
            Some(session_id),
            format!(
                "Unsupported file type. Accepted: {}",
                ACCEPTED_EXTENSIONS.join(", ")
            ),
        );
    }

    let original_mime = image::guess_format(&upload.bytes)
        .map(|f| f.to_mime_type())
        .unwrap_or("application/octet-stream");

    match session
        .process(state.remover.as_ref(), upload.bytes.clone())
        .await
    {
        Ok(processed) => {
            info!(
                "Studio session {session_id} processed {:?} (cache_hit={}, cached={})",
                upload.file_name,
                processed.cache_hit,
                session.cached_entries().await
            );
            page(
                StatusCode::OK,
                ResultPage::new(
                    session_id,
                    &upload.bytes,
                    original_mime,
                    &processed.png,
                    processed.cache_hit,
                ),
            )
        }
        Err(e) => {
            let status = match &e {
                BackgroundError::Decode(_) => StatusCode::UNPROCESSABLE_ENTITY,
                BackgroundError::Transform(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            warn!("Studio session {session_id} failed: {e}");
            error_page(status, Some(session_id), e.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ResultQuery {
    #[serde(default)]
    pub download: bool,
}

/// GET /studio/:session_id/result
///
/// Serves the session's most recent cutout.
pub async fn handle_result(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Query(query): Query<ResultQuery>,
) -> Result<Response, AppError> {
    let latest = match state.studio.get(session_id).await {
        Some(session) => session.latest().await,
        None => None,
    };
    let Some(png) = latest else {
        return error_page(
            StatusCode::NOT_FOUND,
            None,
            "No processed image for this session.",
        );
    };

    let response = if query.download {
        (
            [
                (header::CONTENT_TYPE, "image/png".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{DOWNLOAD_FILENAME}\""),
                ),
            ],
            Body::from(png),
        )
            .into_response()
    } else {
        ([(header::CONTENT_TYPE, "image/png")], Body::from(png)).into_response()
    };
    Ok(response)
}
