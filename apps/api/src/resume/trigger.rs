//! Trigger-shape detection: decides where the résumé object lives before any
//! secret, storage, or model call is made.

use serde_json::Value;

use crate::resume::PipelineError;

/// Which invocation shape located the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerShape {
    /// A direct request carrying `queryStringParameters.filename`.
    Direct,
    /// A storage-change notification carrying `Records[0].s3`.
    StorageEvent,
}

/// The bucket/key pair a pipeline run reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
    pub shape: TriggerShape,
}

/// Resolves the input object from an invocation payload.
///
/// A payload carrying `queryStringParameters` at all is a direct request and
/// must name a `filename`; otherwise a non-empty `Records` list is required.
pub fn locate_object(event: &Value, upload_bucket: &str) -> Result<ObjectLocation, PipelineError> {
    if let Some(params) = event.get("queryStringParameters") {
        let filename = params
            .get("filename")
            .and_then(Value::as_str)
            .filter(|f| !f.is_empty())
            .ok_or_else(|| {
                PipelineError::MissingParameter("Filename parameter is required".to_string())
            })?;
        return Ok(ObjectLocation {
            bucket: upload_bucket.to_string(),
            key: filename.to_string(),
            shape: TriggerShape::Direct,
        });
    }

    let record = event
        .get("Records")
        .and_then(Value::as_array)
        .and_then(|records| records.first())
        .ok_or_else(|| PipelineError::MissingParameter("Invalid event source".to_string()))?;

    let s3 = record.get("s3");
    let bucket = s3
        .and_then(|s| s.pointer("/bucket/name"))
        .and_then(Value::as_str)
        .ok_or_else(|| {
            PipelineError::MissingParameter("Storage event is missing bucket name".to_string())
        })?;
    let key = s3
        .and_then(|s| s.pointer("/object/key"))
        .and_then(Value::as_str)
        .ok_or_else(|| {
            PipelineError::MissingParameter("Storage event is missing object key".to_string())
        })?;

    Ok(ObjectLocation {
        bucket: bucket.to_string(),
        key: key.to_string(),
        shape: TriggerShape::StorageEvent,
    })
}
