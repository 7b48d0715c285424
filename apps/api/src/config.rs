use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub aws_region: String,
    /// Endpoint override for S3-compatible stores (MinIO).
    pub s3_endpoint: Option<String>,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub resume_upload_bucket: String,
    pub resume_output_bucket: String,
    pub openai_secret_name: String,
    pub openai_base_url: String,
    pub rembg_url: String,
    pub model_timeout: Duration,
    pub max_upload_bytes: usize,
    /// Studio sessions idle for longer than this are dropped.
    pub studio_session_idle: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let or_default =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: or_default("RUST_LOG", "info"),
            aws_region: or_default("AWS_REGION", "us-east-1"),
            s3_endpoint: lookup("S3_ENDPOINT"),
            aws_access_key_id: lookup("AWS_ACCESS_KEY_ID"),
            aws_secret_access_key: lookup("AWS_SECRET_ACCESS_KEY"),
            resume_upload_bucket: or_default("RESUME_UPLOAD_BUCKET", "resume-uploads-bucket"),
            resume_output_bucket: or_default("RESUME_OUTPUT_BUCKET", "resume-extracted-data"),
            openai_secret_name: lookup("OPENAI_SECRET_NAME").with_context(|| {
                "Required environment variable 'OPENAI_SECRET_NAME' is not set".to_string()
            })?,
            openai_base_url: or_default("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            rembg_url: or_default("REMBG_URL", "http://localhost:7000/api/remove"),
            model_timeout: Duration::from_secs(parse_or(&lookup, "MODEL_TIMEOUT_SECS", 120)?),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", 20 * 1024 * 1024)?,
            studio_session_idle: Duration::from_secs(parse_or(
                &lookup,
                "STUDIO_SESSION_IDLE_SECS",
                60 * 60,
            )?),
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
