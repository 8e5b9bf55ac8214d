//! Agent catalog: load the store's agent list, keep approved entries, search and resolve ids.

use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::core::agent::{AgentSummary, string_field};
use crate::core::payload::FilteredAgent;
use crate::core::util::{contains_ci, filter_by_query};

/// Errors loading the catalog file.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Catalog must be a JSON array of agents (or an object with an \"agents\" array)")]
    NotAnArray,
}

/// One catalog entry. Missing fields are empty strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub agent_id: String,
    pub agent_name: String,
    pub description: String,
    pub by_capability: String,
    pub by_persona: String,
    pub by_value: String,
    pub service_provider: String,
    pub asset_type: String,
    pub admin_approved: String,
}

impl CatalogEntry {
    fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        let get = |keys: &[&str]| {
            string_field(map, keys)
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };
        Some(Self {
            agent_id: get(&["agent_id", "id"]),
            agent_name: get(&["agent_name", "name"]),
            description: get(&["description"]),
            by_capability: get(&["by_capability"]),
            by_persona: get(&["by_persona"]),
            by_value: get(&["by_value"]),
            service_provider: get(&["service_provider"]),
            asset_type: get(&["asset_type"]),
            admin_approved: get(&["admin_approved"]),
        })
    }

    /// Only entries approved by an admin may be shown or linked.
    pub fn is_approved(&self) -> bool {
        self.admin_approved.eq_ignore_ascii_case("yes")
    }

    pub fn to_summary(&self) -> AgentSummary {
        let non_empty = |s: &str| Some(s.to_string()).filter(|s| !s.is_empty());
        AgentSummary {
            agent_id: self.agent_id.clone(),
            agent_name: self.agent_name.clone(),
            description: non_empty(&self.description),
            service_provider: non_empty(&self.service_provider),
            asset_type: non_empty(&self.asset_type),
            ..Default::default()
        }
    }
}

/// Catalog browse filters. Blank fields match everything.
#[derive(Clone, Debug, Default)]
pub struct CatalogFilter {
    pub query: String,
    pub capability: String,
    pub persona: String,
    pub value: String,
    pub include_unapproved: bool,
}

/// The agent catalog.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&content)?;
        let catalog = Self::from_value(&value)?;
        log::info!(
            "Loaded {} catalog entries ({} approved) from {}",
            catalog.entries.len(),
            catalog.approved().count(),
            path.display()
        );
        Ok(catalog)
    }

    /// Build from an array of agents, or an object wrapping one under `agents` / `data`.
    pub fn from_value(value: &Value) -> Result<Self, CatalogError> {
        let items = value
            .as_array()
            .or_else(|| value.get("agents").and_then(Value::as_array))
            .or_else(|| value.get("data").and_then(Value::as_array))
            .ok_or(CatalogError::NotAnArray)?;
        let entries = items
            .iter()
            .filter_map(CatalogEntry::from_value)
            .filter(|e| {
                if e.agent_id.is_empty() || e.agent_name.is_empty() {
                    log::warn!("Skipping catalog entry without id or name: {:?}", e.agent_name);
                    false
                } else {
                    true
                }
            })
            .collect();
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Approved entries in catalog order.
    pub fn approved(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(|e| e.is_approved())
    }

    /// Approved entries as agent summaries, ready for mention linking.
    pub fn approved_summaries(&self) -> Vec<AgentSummary> {
        self.approved().map(CatalogEntry::to_summary).collect()
    }

    /// Approved entry with this id.
    pub fn find_by_id(&self, agent_id: &str) -> Option<&CatalogEntry> {
        let id = agent_id.trim();
        self.approved().find(|e| e.agent_id == id)
    }

    /// Approved entry with this name, ignoring case and surrounding whitespace.
    pub fn find_by_name(&self, name: &str) -> Option<&CatalogEntry> {
        let name = name.trim();
        self.approved().find(|e| e.agent_name.eq_ignore_ascii_case(name))
    }

    /// Browse: query over name and description, then substring filters on the facets.
    pub fn search(&self, filter: &CatalogFilter) -> Vec<&CatalogEntry> {
        let pool: Vec<&CatalogEntry> = if filter.include_unapproved {
            self.entries.iter().collect()
        } else {
            self.approved().collect()
        };
        let facets: [(String, fn(&CatalogEntry) -> &str); 3] = [
            (filter.capability.trim().to_lowercase(), |e| e.by_capability.as_str()),
            (filter.persona.trim().to_lowercase(), |e| e.by_persona.as_str()),
            (filter.value.trim().to_lowercase(), |e| e.by_value.as_str()),
        ];
        filter_by_query(pool, &filter.query, |e| [e.agent_name.as_str(), e.description.as_str()])
            .into_iter()
            .filter(|e| {
                facets
                    .iter()
                    .all(|(needle, field)| needle.is_empty() || contains_ci(field(*e), needle))
            })
            .collect()
    }

    /// Resolve `filtered_agents` entries: ids through the approved catalog, records as given.
    /// Unknown ids are dropped.
    pub fn resolve_filtered(&self, filtered: &[FilteredAgent]) -> Vec<AgentSummary> {
        filtered
            .iter()
            .filter_map(|f| match f {
                FilteredAgent::Record(agent) => Some(agent.clone()),
                FilteredAgent::Id(id) => {
                    let found = self.find_by_id(id).map(CatalogEntry::to_summary);
                    if found.is_none() {
                        log::debug!("Filtered agent {} not in approved catalog", id);
                    }
                    found
                }
            })
            .collect()
    }
}
