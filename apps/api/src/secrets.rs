//! Secret retrieval. The API key lives in a JSON blob under a fixed field.

use async_trait::async_trait;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use serde_json::Value;
use thiserror::Error;

/// Field of the secret blob that holds the language-model API key.
pub const API_KEY_FIELD: &str = "OPENAI_API_KEY";

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("Error retrieving secret '{name}': {message}")]
    Retrieval { name: String, message: String },

    #[error("Secret '{0}' has no string value")]
    Empty(String),

    #[error("Secret '{name}' is not a JSON object: {message}")]
    Malformed { name: String, message: String },

    #[error("Secret '{name}' has no '{field}' field")]
    MissingField { name: String, field: &'static str },
}

#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Returns the raw string value of the named secret.
    async fn secret_string(&self, name: &str) -> Result<String, SecretError>;
}

#[derive(Clone)]
pub struct SecretsManagerStore {
    client: aws_sdk_secretsmanager::Client,
}

impl SecretsManagerStore {
    pub fn new(client: aws_sdk_secretsmanager::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretStore for SecretsManagerStore {
    async fn secret_string(&self, name: &str) -> Result<String, SecretError> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(name)
            .send()
            .await
            .map_err(|e| SecretError::Retrieval {
                name: name.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        output
            .secret_string()
            .map(str::to_string)
            .ok_or_else(|| SecretError::Empty(name.to_string()))
    }
}

/// Fetches the named secret and pulls the API key out of its JSON blob.
pub async fn fetch_api_key(store: &dyn SecretStore, name: &str) -> Result<String, SecretError> {
    let raw = store.secret_string(name).await?;
    let blob: Value = serde_json::from_str(&raw).map_err(|e| SecretError::Malformed {
        name: name.to_string(),
        message: e.to_string(),
    })?;
    blob.get(API_KEY_FIELD)
        .and_then(Value::as_str)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .ok_or_else(|| SecretError::MissingField {
            name: name.to_string(),
            field: API_KEY_FIELD,
        })
}


#[cfg(test)]
mod tests {
    use super::testing::StaticSecrets;
    use super::*;

    #[tokio::test]
    async fn test_fetch_api_key_reads_fixed_field() {
        let store = StaticSecrets::with_key("sk-live");
        assert_eq!(fetch_api_key(&store, "prod/openai").await.unwrap(), "sk-live");
    }

    #[tokio::test]
    async fn test_fetch_api_key_missing_secret() {
        let err = fetch_api_key(&StaticSecrets::default(), "prod/openai")
            .await
            .unwrap_err();
        assert!(matches!(err, SecretError::Retrieval { .. }));
    }

    #[tokio::test]
    async fn test_fetch_api_key_rejects_non_json() {
        let store = StaticSecrets {
            value: Some("sk-plain-text".to_string()),
            ..Default::default()
        };
        let err = fetch_api_key(&store, "s").await.unwrap_err();
        assert!(matches!(err, SecretError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_fetch_api_key_requires_field() {
        let store = StaticSecrets {
            value: Some(r#"{"ANTHROPIC_API_KEY": "x"}"#.to_string()),
            ..Default::default()
        };
        let err = fetch_api_key(&store, "s").await.unwrap_err();
        assert!(err.to_string().contains(API_KEY_FIELD));
    }
}
