use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{error, info};

use crate::llm_client::LanguageModel;
use crate::resume::envelope::ResponseEnvelope;
use crate::resume::pdf::{extract_document_text, TextExtractor};
use crate::resume::prompts::RESUME_EXTRACTION_SYSTEM;
use crate::resume::schema::{output_key, parse_extraction, strip_code_fences};
use crate::resume::trigger::locate_object;
use crate::resume::PipelineError;
use crate::secrets::{fetch_api_key, SecretStore};
use crate::storage::ObjectStore;

/// Fixed names the pipeline works against.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Bucket searched for direct (`filename`) requests.
    pub upload_bucket: String,
    /// Bucket every extraction is written to.
    pub output_bucket: String,
    /// Secret holding the language-model API key.
    pub secret_name: String,
}

/// A successful run: what was stored and where.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub output_key: String,
    pub parsed_data: Map<String, Value>,
}

/// The résumé pipeline. Built once at startup; every collaborator is shared.
pub struct ResumePipeline {
    settings: PipelineSettings,
    store: Arc<dyn ObjectStore>,
    secrets: Arc<dyn SecretStore>,
    model: Arc<dyn LanguageModel>,
    extractor: Arc<dyn TextExtractor>,
}

impl ResumePipeline {
    pub fn new(
        settings: PipelineSettings,
        store: Arc<dyn ObjectStore>,
        secrets: Arc<dyn SecretStore>,
        model: Arc<dyn LanguageModel>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        Self {
            settings,
            store,
            secrets,
            model,
            extractor,
        }
    }

    /// Runs the pipeline for one invocation payload and converts the outcome
    /// into the response envelope. Never fails: errors become a 500 envelope.
    pub async fn handle(&self, event: &Value) -> ResponseEnvelope {
        match self.run(event).await {
            Ok(extraction) => {
                info!("Resume extraction stored as {}", extraction.output_key);
                ResponseEnvelope::success(extraction.parsed_data)
            }
            Err(e) => {
                error!("Error processing resume: {e}");
                ResponseEnvelope::failure(e)
            }
        }
    }

    pub async fn run(&self, event: &Value) -> Result<Extraction, PipelineError> {
        let location = locate_object(event, &self.settings.upload_bucket)?;
        info!(
            "Processing file {} from bucket {} ({:?})",
            location.key, location.bucket, location.shape
        );

        let api_key = fetch_api_key(self.secrets.as_ref(), &self.settings.secret_name).await?;

        let document = self
            .store
            .get_object(&location.bucket, &location.key)
            .await?;
        let resume_text = extract_document_text(self.extractor.clone(), document).await?;
        info!("Extracted {} characters of resume text", resume_text.len());

        let reply = self
            .model
            .complete(&api_key, RESUME_EXTRACTION_SYSTEM, &resume_text)
            .await?;
        let parsed_data = parse_extraction(&strip_code_fences(&reply))?;

        let key = output_key(&location.key);
        let body = serde_json::to_vec(&parsed_data)?;
        self.store
            .put_object(&self.settings.output_bucket, &key, body, "application/json")
            .await?;
        info!(
            "Extracted data saved to {}/{}",
            self.settings.output_bucket, key
        );

        Ok(Extraction {
            output_key: key,
            parsed_data,
        })
    }
}
