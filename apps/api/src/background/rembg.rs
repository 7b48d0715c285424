use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};
use reqwest::{multipart, Client};
use tracing::{debug, warn};

use super::BackgroundRemover;
use crate::transform::TransformError;

/// Background removal backed by an HTTP model server speaking the rembg
/// contract: multipart `file` in, PNG with alpha out.
#[derive(Clone)]
pub struct RembgClient {
    client: Client,
    endpoint: String,
}

impl RembgClient {
    pub fn new(endpoint: String, timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint,
        })
    }
}

#[async_trait]
impl BackgroundRemover for RembgClient {
    async fn remove(&self, image: RgbImage) -> Result<RgbaImage, TransformError> {
        let mut png = Vec::new();
        DynamicImage::ImageRgb8(image)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| TransformError::InvalidOutput(format!("cannot stage input: {e}")))?;

        let part = multipart::Part::bytes(png)
            .file_name("image.png")
            .mime_str("image/png")?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Background model returned {}: {}", status, body);
            return Err(TransformError::Upstream {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.bytes().await?;
        debug!("Background model returned {} bytes", body.len());

        image::load_from_memory(&body)
            .map(|img| img.to_rgba8())
            .map_err(|e| TransformError::InvalidOutput(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use axum::{extract::Multipart, http::StatusCode, routing::post, Router};
    use image::Rgba;

    use super::*;

    /// Fake model server: echoes the uploaded image back with full transparency.
    async fn fake_model(mut multipart: Multipart) -> Result<Vec<u8>, StatusCode> {
        while let Some(field) = multipart.next_field().await.map_err(|_| StatusCode::BAD_REQUEST)? {
            if field.name() == Some("file") {
                let data = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
                let rgba = image::load_from_memory(&data)
                    .map_err(|_| StatusCode::BAD_REQUEST)?
                    .to_rgba8();
                let cleared = RgbaImage::from_fn(rgba.width(), rgba.height(), |x, y| {
                    let p = rgba.get_pixel(x, y);
                    Rgba([p[0], p[1], p[2], 0])
                });
                let mut out = Vec::new();
                DynamicImage::ImageRgba8(cleared)
                    .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
                    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
                return Ok(out);
            }
        }
        Err(StatusCode::BAD_REQUEST)
    }

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/api/remove")
    }

    #[tokio::test]
    async fn test_rembg_client_round_trips_through_server() {
        let url = spawn(Router::new().route("/api/remove", post(fake_model))).await;
        let client = RembgClient::new(url, Duration::from_secs(5)).unwrap();

        let input = RgbImage::from_pixel(4, 3, image::Rgb([200, 10, 10]));
        let out = client.remove(input).await.unwrap();

        assert_eq!(out.dimensions(), (4, 3));
        assert_eq!(out.get_pixel(1, 1), &Rgba([200, 10, 10, 0]));
    }

    #[tokio::test]
    async fn test_rembg_client_surfaces_upstream_status() {
        let url = spawn(Router::new().route(
            "/api/remove",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "warming up") }),
        ))
        .await;
        let client = RembgClient::new(url, Duration::from_secs(5)).unwrap();

        let err = client
            .remove(RgbImage::new(2, 2))
            .await
            .unwrap_err();
        match err {
            TransformError::Upstream { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "warming up");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_rembg_client_rejects_non_image_reply() {
        let url = spawn(Router::new().route("/api/remove", post(|| async { "not a png" }))).await;
        let client = RembgClient::new(url, Duration::from_secs(5)).unwrap();

        let err = client.remove(RgbImage::new(2, 2)).await.unwrap_err();
        assert!(matches!(err, TransformError::InvalidOutput(_)));
    }
}
