//! Agent records decoded leniently from chat API JSON.
//!
//! Upstream payloads mix key names (`agent_name` / `name` / `title`), value types (numbers
//! where strings are expected) and feature shapes. Everything funnels into [`AgentSummary`].

use serde::Serialize;
use serde_json::{Map, Value};

use crate::normalize::title::parse_title;

/// One entry of a `key_features` or `features` array. Keys are kept apart so each
/// feature shape can apply its own key precedence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FeatureEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FeatureEntry {
    /// Entry with only a title (bare strings inside feature arrays).
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self {
                title: string_field(map, &["title"]),
                name: string_field(map, &["name"]),
                detail: string_field(map, &["detail"]),
                description: string_field(map, &["description"]),
            }),
            other => scalar_string(other).map(Self::titled),
        }
    }
}

/// The `features` field: either a delimited string or a list of entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Features {
    Text(String),
    Items(Vec<FeatureEntry>),
}

/// An agent as described by a chat response or the catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AgentSummary {
    pub agent_id: String,
    pub agent_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_proposition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_features: Option<Vec<FeatureEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Features>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<String>,
    /// Set when `agent_id` was made up from the list position.
    #[serde(skip)]
    pub id_synthesized: bool,
}

impl AgentSummary {
    /// Decode an agent-like value. `position` is 1-based and only used to synthesize
    /// an id when neither an id field nor an `(ID: ...)` title suffix is present.
    /// Bare strings become name-only agents; other non-objects yield `None`.
    pub fn from_value(value: &Value, position: usize) -> Option<Self> {
        let map = match value {
            Value::Object(map) => map,
            Value::String(s) if !s.trim().is_empty() => {
                return Some(Self::named(s, None, position));
            }
            _ => return None,
        };
        let raw_name = string_field(map, &["agent_name", "name", "title", "solution_name"])
            .unwrap_or_default();
        let explicit_id = string_field(map, &["agent_id", "id"]);
        let mut agent = Self::named(&raw_name, explicit_id, position);
        agent.description = string_field(map, &["description"]);
        agent.value_proposition = string_field(map, &["value_proposition"]);
        agent.key_features = map.get("key_features").and_then(entries_from_value);
        agent.features = map.get("features").and_then(|v| match v {
            Value::String(s) => Some(Features::Text(s.clone())),
            Value::Array(_) => entries_from_value(v).map(Features::Items),
            _ => None,
        });
        agent.service_provider = string_field(map, &["service_provider"]);
        agent.asset_type = string_field(map, &["asset_type"]);
        Some(agent)
    }

    /// Agent with a name parsed through the title rules and an id resolved from
    /// `explicit_id`, the title suffix, or `agent_{position}`.
    pub fn named(raw_name: &str, explicit_id: Option<String>, position: usize) -> Self {
        let parsed = parse_title(raw_name.trim().trim_matches('*'));
        let agent_name = parsed
            .name
            .trim_matches(|c: char| c == '*' || c.is_whitespace())
            .to_string();
        let (agent_id, id_synthesized) = match explicit_id.or(parsed.id_from_title) {
            Some(id) => (id, false),
            None => (format!("agent_{}", position), true),
        };
        Self {
            agent_id,
            agent_name,
            id_synthesized,
            ..Default::default()
        }
    }
}

/// Decode every array element that looks like a feature entry. Non-arrays yield `None`.
fn entries_from_value(value: &Value) -> Option<Vec<FeatureEntry>> {
    let items = value.as_array()?;
    Some(items.iter().filter_map(FeatureEntry::from_value).collect())
}

/// First key whose value is a non-empty scalar, as a string.
pub(crate) fn string_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| map.get(*k))
        .filter_map(scalar_string)
        .find(|s| !s.trim().is_empty())
}

/// Strings as-is, numbers and booleans stringified, everything else `None`.
pub(crate) fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
