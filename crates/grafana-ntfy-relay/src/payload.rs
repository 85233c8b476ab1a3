// Numan Thabit 2025
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::RelayError;

const UNKNOWN_STATUS: &str = "unknown";

/// Decoded webhook body. Every field tolerates missing or mistyped input.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AlertBatchPayload {
    #[serde(default = "unknown_status", deserialize_with = "lenient_status")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_alerts")]
    pub alerts_firing: Vec<AlertRecord>,
    #[serde(default, deserialize_with = "lenient_alerts")]
    pub alerts_resolved: Vec<AlertRecord>,
}

impl Default for AlertBatchPayload {
    fn default() -> Self {
        Self {
            status: unknown_status(),
            alerts_firing: Vec::new(),
            alerts_resolved: Vec::new(),
        }
    }
}

/// One alert of a batch. Labels and annotations stay KV-encoded until selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AlertRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub labels: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub annotations: Option<String>,
    #[serde(default, deserialize_with = "lenient_url")]
    pub dashboard_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_url")]
    pub silence_url: Option<String>,
}

/// Undo Grafana's over-escaped parentheses (`\(` and `\)`), which are not
/// valid JSON escapes. Nothing else is touched.
pub fn sanitize(raw: &str) -> String {
    raw.replace("\\(", "(").replace("\\)", ")")
}

/// Strictly decode a sanitized body. Valid JSON that is not an object yields
/// the empty payload.
pub fn parse(sanitized: &str) -> Result<AlertBatchPayload, RelayError> {
    let value: Value = serde_json::from_str(sanitized)?;
    if !value.is_object() {
        return Ok(AlertBatchPayload::default());
    }
    Ok(serde_json::from_value(value)?)
}

fn unknown_status() -> String {
    UNKNOWN_STATUS.to_string()
}

fn lenient_status<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => s,
        _ => unknown_status(),
    })
}

fn lenient_alerts<'de, D>(deserializer: D) -> Result<Vec<AlertRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    // Non-object entries still count toward a non-empty batch.
    Ok(items
        .into_iter()
        .map(|item| match item {
            Value::Object(_) => serde_json::from_value(item).unwrap_or_default(),
            _ => AlertRecord::default(),
        })
        .collect())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_url<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_string(deserializer)?.filter(|url| !url.is_empty()))
}
