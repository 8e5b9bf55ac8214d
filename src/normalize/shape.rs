//! Response shape detection: decide whether a chat payload is structured or freeform markdown.
//!
//! The chat API nests its answer in `data.response`, `response`, `data` or the top level,
//! and that answer is either a markdown string or an object with `intro` / `agents` /
//! `response_markdown`. [`classify`] folds all of these into one [`RawPayload`].

use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::agent::AgentSummary;

/// Keys that hold an agent list, in precedence order. `response.agents` is handled separately.
const AGENT_LIST_KEYS: &[&str] = &["agents", "response_agents"];

/// A payload after shape detection.
#[derive(Clone, Debug, PartialEq)]
pub enum RawPayload {
    /// Freeform markdown answer.
    Markdown(String),
    /// Answer already segmented into intro / agents / cta.
    Structured(StructuredResponse),
    /// Nothing recognisable.
    Unknown(Value),
}

/// Canonical structured answer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StructuredResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cta: Option<String>,
    pub agents: Vec<AgentSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_markdown: Option<String>,
}

impl StructuredResponse {
    fn from_map(map: &Map<String, Value>) -> Self {
        let agents = canonical_agent_list(map)
            .map(|items| {
                items
                    .iter()
                    .enumerate()
                    .filter_map(|(i, v)| AgentSummary::from_value(v, i + 1))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            intro: non_empty_str(map.get("intro")),
            cta: non_empty_str(map.get("cta")),
            agents,
            response_markdown: non_empty_str(map.get("response_markdown")),
        }
    }
}

/// Classify any payload. Strings are markdown; objects are structured when they carry
/// structured fields, markdown when a markdown string can be found, unknown otherwise.
pub fn classify(input: &Value) -> RawPayload {
    match input {
        Value::String(s) => RawPayload::Markdown(s.clone()),
        Value::Object(_) => {
            if let Some(structured) = detect(input) {
                RawPayload::Structured(structured)
            } else if let Some(markdown) = find_markdown(input) {
                RawPayload::Markdown(markdown)
            } else {
                RawPayload::Unknown(input.clone())
            }
        }
        other => RawPayload::Unknown(other.clone()),
    }
}

/// Resolve the answer object (`data.response`, then `response`, then `data`, then the input)
/// and return it when it has structured fields. Never panics on odd shapes.
pub fn detect(input: &Value) -> Option<StructuredResponse> {
    input.as_object()?;
    let resolved = resolve_answer(input);
    let map = resolved.as_object()?;
    if !is_structured(map) {
        return None;
    }
    Some(StructuredResponse::from_map(map))
}

/// First present (non-null) answer location.
fn resolve_answer(input: &Value) -> &Value {
    [
        input.pointer("/data/response"),
        input.get("response"),
        input.get("data"),
    ]
    .into_iter()
    .flatten()
    .find(|v| !v.is_null())
    .unwrap_or(input)
}

fn is_structured(map: &Map<String, Value>) -> bool {
    map.get("intro").is_some_and(Value::is_string)
        || AGENT_LIST_KEYS
            .iter()
            .any(|k| map.get(*k).is_some_and(Value::is_array))
        || map
            .get("response")
            .and_then(|r| r.get("agents"))
            .is_some_and(Value::is_array)
        || map.get("response_markdown").is_some_and(Value::is_string)
}

/// The one agent list used: first non-empty of `agents`, `response_agents`, `response.agents`.
fn canonical_agent_list(map: &Map<String, Value>) -> Option<&Vec<Value>> {
    AGENT_LIST_KEYS
        .iter()
        .filter_map(|k| map.get(*k))
        .chain(map.get("response").and_then(|r| r.get("agents")))
        .filter_map(Value::as_array)
        .find(|items| !items.is_empty())
}

/// Find a markdown answer: the value itself when it is a string, else `response_markdown`,
/// else recursively under `response` and `data`.
pub fn find_markdown(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Object(map) => non_empty_str(map.get("response_markdown")).or_else(|| {
            ["response", "data"]
                .iter()
                .filter_map(|k| map.get(*k))
                .find_map(find_markdown)
        }),
        _ => None,
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}
