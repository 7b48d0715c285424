mod background;
mod config;
mod errors;
mod llm_client;
mod resume;
mod routes;
mod secrets;
mod state;
mod storage;
mod studio;
mod transform;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_s3::config::Credentials;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::background::RembgClient;
use crate::config::Config;
use crate::llm_client::OpenAiClient;
use crate::resume::pdf::PdfTextExtractor;
use crate::resume::{PipelineSettings, ResumePipeline};
use crate::routes::build_router;
use crate::secrets::SecretsManagerStore;
use crate::state::AppState;
use crate::storage::S3ObjectStore;
use crate::studio::SessionRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting glue-api v{}", env!("CARGO_PKG_VERSION"));

    // AWS clients are process-wide singletons
    let aws = load_aws_config(&config).await;
    let s3 = build_s3_client(&aws, &config);
    info!("S3 client initialized");
    let secrets = aws_sdk_secretsmanager::Client::new(&aws);
    info!("Secrets Manager client initialized");

    // Model backends
    let remover = RembgClient::new(config.rembg_url.clone(), config.model_timeout)?;
    info!("Background-removal backend: {}", config.rembg_url);
    let llm = OpenAiClient::new(config.openai_base_url.clone(), config.model_timeout)?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let resume = ResumePipeline::new(
        PipelineSettings {
            upload_bucket: config.resume_upload_bucket.clone(),
            output_bucket: config.resume_output_bucket.clone(),
            secret_name: config.openai_secret_name.clone(),
        },
        Arc::new(S3ObjectStore::new(s3)),
        Arc::new(SecretsManagerStore::new(secrets)),
        Arc::new(llm),
        Arc::new(PdfTextExtractor),
    );
    info!(
        "Resume pipeline: {} -> {}",
        config.resume_upload_bucket, config.resume_output_bucket
    );

    // Build app state
    let state = AppState {
        remover: Arc::new(remover),
        studio: Arc::new(SessionRegistry::new(config.studio_session_idle)),
        resume: Arc::new(resume),
    };

    // Build router
    let app = build_router(state, config.max_upload_bytes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Shared AWS configuration. Static credentials are used when both keys are
/// set (MinIO / local); otherwise the default provider chain applies.
async fn load_aws_config(config: &Config) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()));

    if let (Some(id), Some(secret)) = (&config.aws_access_key_id, &config.aws_secret_access_key) {
        loader = loader.credentials_provider(Credentials::new(
            id,
            secret,
            None,
            None,
            "glue-api-static",
        ));
    }

    loader.load().await
}

/// Constructs an S3 client, pointed at MinIO when an endpoint override is set.
fn build_s3_client(aws: &SdkConfig, config: &Config) -> aws_sdk_s3::Client {
    let mut builder = aws_sdk_s3::config::Builder::from(aws);
    if let Some(endpoint) = &config.s3_endpoint {
        builder = builder.endpoint_url(endpoint).force_path_style(true);
    }
    aws_sdk_s3::Client::from_conf(builder.build())
}
