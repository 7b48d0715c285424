//! Background removal: decode an upload, hand it to the model, re-encode as PNG.
//!
//! Both the HTTP endpoint and the interactive studio go through
//! [`remove_background`], so they share one decode/encode contract.

pub mod handlers;
pub mod rembg;

use std::io::Cursor;

use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, ImageFormat, ImageReader, RgbImage, RgbaImage};
use thiserror::Error;

use crate::errors::AppError;
use crate::transform::TransformError;

pub use rembg::RembgClient;

/// Raw image bytes plus the format they are encoded in.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub bytes: Bytes,
    pub format: ImageFormat,
}

impl ImageAsset {
    pub fn content_type(&self) -> &'static str {
        self.format.to_mime_type()
    }
}

#[derive(Debug, Error)]
pub enum BackgroundError {
    #[error("Cannot decode image: {0}")]
    Decode(String),

    #[error("Background removal failed: {0}")]
    Transform(#[from] TransformError),

    #[error("Cannot encode PNG: {0}")]
    Encode(String),

    #[error("Image task failed: {0}")]
    Task(String),
}

impl From<BackgroundError> for AppError {
    fn from(e: BackgroundError) -> Self {
        match e {
            BackgroundError::Decode(msg) => AppError::UnprocessableEntity(msg),
            BackgroundError::Transform(e) => AppError::Transform(e.to_string()),
            other => AppError::Internal(anyhow::anyhow!(other)),
        }
    }
}

/// The background-removal model. Given an RGB image, returns the same image
/// with background pixels made transparent.
#[async_trait]
pub trait BackgroundRemover: Send + Sync {
    async fn remove(&self, image: RgbImage) -> Result<RgbaImage, TransformError>;
}

/// Decodes raw upload bytes into an RGB image, detecting the format from content.
pub fn decode_rgb(bytes: &[u8]) -> Result<(RgbImage, ImageFormat), BackgroundError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| BackgroundError::Decode(format!("cannot detect image format: {e}")))?;
    let format = reader
        .format()
        .ok_or_else(|| BackgroundError::Decode("unrecognized image format".to_string()))?;
    let image = reader
        .decode()
        .map_err(|e| BackgroundError::Decode(e.to_string()))?;
    Ok((image.to_rgb8(), format))
}

/// Encodes an RGBA image as PNG.
pub fn encode_png(image: RgbaImage) -> Result<Bytes, BackgroundError> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| BackgroundError::Encode(e.to_string()))?;
    Ok(Bytes::from(buf))
}

/// Runs one upload through the full decode → remove → encode pipeline.
/// Never yields partial output: any stage failing fails the whole call.
pub async fn remove_background(
    remover: &dyn BackgroundRemover,
    upload: Bytes,
) -> Result<ImageAsset, BackgroundError> {
    let (rgb, source_format) = tokio::task::spawn_blocking(move || decode_rgb(&upload))
        .await
        .map_err(|e| BackgroundError::Task(e.to_string()))??;

    tracing::debug!(
        "Decoded {:?} upload ({}x{})",
        source_format,
        rgb.width(),
        rgb.height()
    );

    let cutout = remover.remove(rgb).await?;

    let bytes = tokio::task::spawn_blocking(move || encode_png(cutout))
        .await
        .map_err(|e| BackgroundError::Task(e.to_string()))??;

    Ok(ImageAsset {
        bytes,
        format: ImageFormat::Png,
    })
}
