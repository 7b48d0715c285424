//! The uniform response shape of the résumé pipeline.

use std::collections::BTreeMap;

use axum::{
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const SUCCESS_MESSAGE: &str = "Resume processed successfully";
pub const FAILURE_MESSAGE: &str = "Failed to process resume";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsed_data: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `{statusCode, body, headers}`; the CORS headers are always present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub status_code: u16,
    pub body: EnvelopeBody,
    pub headers: BTreeMap<String, String>,
}

fn default_headers() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
        (
            "Access-Control-Allow-Headers".to_string(),
            "Content-Type".to_string(),
        ),
        ("Content-Type".to_string(), "application/json".to_string()),
    ])
}

impl ResponseEnvelope {
    pub fn success(parsed_data: Map<String, Value>) -> Self {
        Self {
            status_code: 200,
            body: EnvelopeBody {
                message: SUCCESS_MESSAGE.to_string(),
                parsed_data: Some(parsed_data),
                error: None,
            },
            headers: default_headers(),
        }
    }

    pub fn failure(error: impl ToString) -> Self {
        Self {
            status_code: 500,
            body: EnvelopeBody {
                message: FAILURE_MESSAGE.to_string(),
                parsed_data: None,
                error: Some(error.to_string()),
            },
            headers: default_headers(),
        }
    }
}

/// Renders the envelope as a real HTTP response: its status, its headers,
/// and its body as JSON.
impl IntoResponse for ResponseEnvelope {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, Json(self.body)).into_response();
        let headers = response.headers_mut();
        for (name, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                headers.insert(name, value);
            }
        }
        response
    }
}
