//! Server-rendered HTML for the studio.

use askama::Template;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use uuid::Uuid;

use super::{ACCEPTED_EXTENSIONS, DOWNLOAD_FILENAME};

/// Value of the file picker's `accept` attribute, e.g. `.png,.jpg`.
pub fn accept_attr() -> String {
    ACCEPTED_EXTENSIONS
        .iter()
        .map(|ext| format!(".{ext}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

#[derive(Template)]
#[template(path = "studio/upload.html")]
pub struct UploadPage {
    pub session_id: Uuid,
    pub accept: String,
}

impl UploadPage {
    pub fn new(session_id: Uuid) -> Self {
        Self {
            session_id,
            accept: accept_attr(),
        }
    }
}

/// Original and cutout side by side. Both images are inlined so the page
/// always shows the result of its own request.
#[derive(Template)]
#[template(path = "studio/result.html")]
pub struct ResultPage {
    pub session_id: Uuid,
    pub accept: String,
    pub cache_hit: bool,
    pub original_uri: String,
    pub processed_uri: String,
    pub download_name: &'static str,
}

impl ResultPage {
    pub fn new(
        session_id: Uuid,
        original: &[u8],
        original_mime: &str,
        processed_png: &[u8],
        cache_hit: bool,
    ) -> Self {
        Self {
            session_id,
            accept: accept_attr(),
            cache_hit,
            original_uri: data_uri(original_mime, original),
            processed_uri: data_uri("image/png", processed_png),
            download_name: DOWNLOAD_FILENAME,
        }
    }
}

/// Shown when anything goes wrong. The form stays usable when the session
/// is still alive.
#[derive(Template)]
#[template(path = "studio/error.html")]
pub struct ErrorPage {
    pub session: Option<Uuid>,
    pub accept: String,
    pub message: String,
}

impl ErrorPage {
    pub fn new(session: Option<Uuid>, message: impl Into<String>) -> Self {
        Self {
            session,
            accept: accept_attr(),
            message: message.into(),
        }
    }
}
