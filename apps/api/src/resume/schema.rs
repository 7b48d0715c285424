//! Turning model text into an `ExtractionResult`, and naming the stored artifact.

use serde_json::{Map, Value};

use crate::resume::PipelineError;

/// Top-level keys every extraction result carries.
pub const TOP_LEVEL_KEYS: [&str; 5] = [
    "personal_info",
    "online_presence",
    "professional_experience",
    "skills",
    "education",
];

const ONLINE_PRESENCE_KEYS: [&str; 4] = [
    "professional_networks",
    "code_repositories",
    "portfolio",
    "additional_profiles",
];

const SKILLS_KEYS: [&str; 3] = ["technical", "soft", "languages"];

/// Removes markdown fence markers by literal substitution, then trims.
///
/// Every "```json" goes first, then every remaining "```". Nothing else is
/// inspected, so nested or repeated fences are simply flattened.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parses cleaned model output and fills in any schema key the model left out
/// with `null`. Keys outside the schema are kept as-is.
pub fn parse_extraction(cleaned: &str) -> Result<Map<String, Value>, PipelineError> {
    let value: Value =
        serde_json::from_str(cleaned).map_err(|e| PipelineError::Parse(e.to_string()))?;
    let Value::Object(mut result) = value else {
        return Err(PipelineError::Parse(
            "model output is not a JSON object".to_string(),
        ));
    };

    for key in TOP_LEVEL_KEYS {
        result.entry(key).or_insert(Value::Null);
    }
    fill_nested(&mut result, "online_presence", &ONLINE_PRESENCE_KEYS);
    fill_nested(&mut result, "skills", &SKILLS_KEYS);

    Ok(result)
}

fn fill_nested(result: &mut Map<String, Value>, section: &str, keys: &[&str]) {
    if let Some(Value::Object(inner)) = result.get_mut(section) {
        for key in keys {
            inner.entry(*key).or_insert(Value::Null);
        }
    }
}

/// Storage key for the extraction of `object_key`:
/// `extracted_<basename-without-extension>.json`.
pub fn output_key(object_key: &str) -> String {
    let basename = object_key.rsplit('/').next().unwrap_or(object_key);
    let stem = match basename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => basename,
    };
    format!("extracted_{stem}.json")
}
