//! Chat API payload: typed view over the loosely-shaped JSON the agent store returns.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::core::agent::{AgentSummary, scalar_string, string_field};

/// Epoch values above this are treated as milliseconds.
const EPOCH_MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// Errors reading a payload from disk or stdin.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("Failed to read {source_name}: {source}")]
    Io {
        source_name: String,
        #[source]
        source: io::Error,
    },
    #[error("{0} is empty")]
    Empty(String),
}

/// Agent suggested by the trend analysis.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SuggestedAgent {
    pub solution_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend_reference: Option<String>,
}

/// Entry of `filtered_agents`: a bare id or a full agent object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilteredAgent {
    Id(String),
    Record(AgentSummary),
}

/// Everything the pipeline reads from one chat API response.
#[derive(Clone, Debug, Default)]
pub struct ChatPayload {
    /// The payload as received; the answer is located by shape detection.
    pub raw: Value,
    pub mega_trends: Option<String>,
    pub suggested_agents: Vec<SuggestedAgent>,
    pub filtered_agents: Vec<FilteredAgent>,
    pub gathered_info: Option<Value>,
    pub lets_build: bool,
    pub brd_download_url: Option<String>,
    pub brd_status: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatPayload {
    /// Parse payload text. Anything that is not a JSON object or string is treated as a
    /// bare markdown answer.
    pub fn parse(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(value @ (Value::Object(_) | Value::String(_))) => Self::from_value(value),
            Ok(_) | Err(_) => {
                log::debug!("Payload is not a JSON object; treating it as markdown");
                Self::from_value(Value::String(text.to_string()))
            }
        }
    }

    /// Read the payload fields, preferring `data.*` over top-level keys.
    pub fn from_value(raw: Value) -> Self {
        let mut payload = Self {
            mega_trends: field(&raw, "mega_trends")
                .and_then(scalar_string)
                .filter(|s| !s.trim().is_empty()),
            suggested_agents: field(&raw, "suggested_agents")
                .and_then(Value::as_array)
                .map(|items| items.iter().filter_map(suggested_from_value).collect())
                .unwrap_or_default(),
            filtered_agents: filtered_from_payload(&raw),
            gathered_info: field(&raw, "gathered_info").cloned(),
            lets_build: field(&raw, "lets_build").is_some_and(truthy),
            brd_download_url: field(&raw, "brd_download_url")
                .and_then(scalar_string)
                .filter(|s| !s.trim().is_empty()),
            brd_status: field(&raw, "brd_status")
                .and_then(scalar_string)
                .filter(|s| !s.trim().is_empty()),
            timestamp: field(&raw, "timestamp").and_then(parse_timestamp),
            raw: Value::Null,
        };
        payload.raw = raw;
        payload
    }
}

/// Read payload text from a file, or from stdin when `path` is `None` or `-`.
pub fn read_input(path: Option<&Path>) -> Result<String, PayloadError> {
    let (name, text) = match path {
        Some(p) if p.as_os_str() != "-" => {
            let name = p.display().to_string();
            let text = fs::read_to_string(p).map_err(|source| PayloadError::Io {
                source_name: name.clone(),
                source,
            })?;
            (name, text)
        }
        _ => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|source| PayloadError::Io {
                    source_name: "stdin".to_string(),
                    source,
                })?;
            ("stdin".to_string(), text)
        }
    };
    if text.trim().is_empty() {
        return Err(PayloadError::Empty(name));
    }
    Ok(text)
}

/// `data.key` when present and non-null, else top-level `key`.
fn field<'a>(raw: &'a Value, key: &str) -> Option<&'a Value> {
    raw.get("data")
        .and_then(|d| d.get(key))
        .filter(|v| !v.is_null())
        .or_else(|| raw.get(key).filter(|v| !v.is_null()))
}

fn suggested_from_value(value: &Value) -> Option<SuggestedAgent> {
    let map = value.as_object()?;
    let solution_name = string_field(map, &["solution_name", "agent_name", "name"])?;
    Some(SuggestedAgent {
        solution_name: solution_name.trim().to_string(),
        description: string_field(map, &["description"]),
        segment: string_field(map, &["segment"]),
        trend_reference: string_field(map, &["trend_reference"]),
    })
}

/// `filtered_agents_full` wins when it has entries; otherwise `filtered_agents`.
fn filtered_from_payload(raw: &Value) -> Vec<FilteredAgent> {
    let items = ["filtered_agents_full", "filtered_agents"]
        .iter()
        .filter_map(|k| field(raw, k))
        .filter_map(Value::as_array)
        .find(|items| !items.is_empty());
    let Some(items) = items else {
        return Vec::new();
    };
    items
        .iter()
        .enumerate()
        .filter_map(|(i, v)| match v {
            Value::Object(_) => AgentSummary::from_value(v, i + 1).map(FilteredAgent::Record),
            other => scalar_string(other)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .map(FilteredAgent::Id),
        })
        .collect()
}

/// Boolean-ish flag: `true`, non-zero numbers, or "true" / "yes" / "1".
fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("yes") || s == "1"
        }
        _ => false,
    }
}

/// RFC 3339 strings, or epoch seconds / milliseconds as numbers or numeric strings.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let epoch = match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            s.parse::<f64>().ok()?
        }
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    let epoch = epoch as i64;
    if epoch.abs() >= EPOCH_MILLIS_THRESHOLD {
        Utc.timestamp_millis_opt(epoch).single()
    } else {
        Utc.timestamp_opt(epoch, 0).single()
    }
}
