//! Response normalization: turn one chat API payload into a display-ready [`Digest`].
//!
//! Flow: shape detection, then either the structured agent list or intro splitting plus
//! section parsing, then label stripping and feature normalization per agent, mention
//! linking of the prose, and trend parsing of `mega_trends`. Every step degrades to empty
//! output; nothing here returns an error.

pub mod features;
pub mod intro;
pub mod labels;
pub mod mentions;
pub mod sections;
pub mod shape;
pub mod title;
pub mod trends;

use serde::Serialize;

use crate::core::agent::AgentSummary;
use crate::core::catalog::{Catalog, CatalogEntry};
use crate::core::config::Config;
use crate::core::payload::{ChatPayload, SuggestedAgent};

use features::{FeatureSource, normalize_with_source};
use intro::{split_markdown, split_response, synthesize_agent_markdown};
use labels::{LabelStripper, clean_text};
use mentions::MentionLinker;
use sections::parse_agent_sections;
use shape::{RawPayload, StructuredResponse, classify};
use trends::{TrendDocument, parse_trend_document};

/// How the answer arrived.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseShape {
    Structured,
    Markdown,
    Empty,
}

/// One agent ready for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AgentCard {
    pub agent_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_proposition: Option<String>,
    pub features: Vec<String>,
    pub feature_source: FeatureSource,
    pub href: String,
    /// The agent resolved to an approved catalog entry.
    pub in_catalog: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<String>,
}

impl AgentCard {
    fn link_target(&self) -> AgentSummary {
        AgentSummary {
            agent_id: self.agent_id.clone(),
            agent_name: self.name.clone(),
            ..Default::default()
        }
    }
}

/// Suggested agent with its detail route when the catalog knows it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SuggestedCard {
    #[serde(flatten)]
    pub agent: SuggestedAgent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

/// Business requirements document status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Brd {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Everything a chat view renders for one payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Digest {
    pub shape: ResponseShape,
    pub intro: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cta: Option<String>,
    pub agents: Vec<AgentCard>,
    pub agent_markdown: String,
    pub trends: TrendDocument,
    pub suggested_agents: Vec<SuggestedCard>,
    pub filtered_agents: Vec<AgentCard>,
    pub lets_build: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brd: Option<Brd>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Answer text and agents before per-agent cleanup.
struct Answer {
    shape: ResponseShape,
    intro: String,
    cta: Option<String>,
    agents: Vec<AgentSummary>,
    agent_markdown: String,
}

/// Label table and link routes, compiled once and reused across payloads.
#[derive(Debug, Default)]
pub struct Normalizer {
    labels: LabelStripper,
    linker: MentionLinker,
}

impl Normalizer {
    pub fn new(labels: LabelStripper, linker: MentionLinker) -> Self {
        Self { labels, linker }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.stripper(), config.linker())
    }

    /// Run the whole pipeline on one payload.
    pub fn digest(&self, payload: &ChatPayload, catalog: &Catalog) -> Digest {
        let answer = self.answer(&payload.raw);

        let agents: Vec<AgentCard> = answer
            .agents
            .iter()
            .map(|a| self.card(a, catalog))
            .collect();
        let filtered_agents: Vec<AgentCard> = catalog
            .resolve_filtered(&payload.filtered_agents)
            .iter()
            .map(|a| self.card(a, catalog))
            .collect();

        // Only approved catalog agents are linked.
        let mut targets: Vec<AgentSummary> = agents
            .iter()
            .filter(|card| card.in_catalog)
            .map(AgentCard::link_target)
            .collect();
        targets.extend(catalog.approved_summaries());

        let intro = self.linker.link(&self.labels.strip(&answer.intro), &targets);
        let cta = answer
            .cta
            .map(|c| self.linker.link(&self.labels.strip(&c), &targets))
            .filter(|c| !c.is_empty());

        let mut trends = payload
            .mega_trends
            .as_deref()
            .map(parse_trend_document)
            .unwrap_or_default();
        for section in &mut trends.sections {
            section.content = self.linker.link(&section.content, &targets);
        }
        log::debug!(
            "Digest: {:?}, {} agents, {} trend sections",
            answer.shape,
            agents.len(),
            trends.sections.len()
        );

        let has_brd = payload.brd_download_url.is_some() || payload.brd_status.is_some();
        Digest {
            shape: answer.shape,
            intro,
            cta,
            agents,
            agent_markdown: self.labels.strip(&answer.agent_markdown),
            trends,
            suggested_agents: payload
                .suggested_agents
                .iter()
                .map(|s| SuggestedCard {
                    agent: s.clone(),
                    href: catalog
                        .find_by_name(&s.solution_name)
                        .map(|e| self.linker.href(&e.agent_id)),
                })
                .collect(),
            filtered_agents,
            lets_build: payload.lets_build,
            brd: has_brd.then(|| Brd {
                download_url: payload.brd_download_url.clone(),
                status: payload.brd_status.clone(),
            }),
            timestamp: payload.timestamp.map(|t| t.to_rfc3339()),
        }
    }

    fn answer(&self, raw: &serde_json::Value) -> Answer {
        match classify(raw) {
            RawPayload::Structured(s) => self.structured_answer(s),
            RawPayload::Markdown(md) => {
                self.markdown_answer(&md, None, None, ResponseShape::Markdown)
            }
            RawPayload::Unknown(value) => match answer_field(&value) {
                Some(answer) => {
                    log::debug!("Unrecognised answer; reading it as plain text");
                    let split = split_response(answer);
                    Answer {
                        shape: ResponseShape::Markdown,
                        intro: split.intro_text,
                        cta: None,
                        agents: parse_agent_sections(&split.agent_markdown, &self.labels),
                        agent_markdown: split.agent_markdown,
                    }
                }
                None => Answer {
                    shape: ResponseShape::Empty,
                    intro: String::new(),
                    cta: None,
                    agents: Vec::new(),
                    agent_markdown: String::new(),
                },
            },
        }
    }

    fn structured_answer(&self, s: StructuredResponse) -> Answer {
        if s.agents.is_empty()
            && let Some(md) = s.response_markdown.as_deref()
        {
            return self.markdown_answer(md, s.intro, s.cta, ResponseShape::Structured);
        }
        Answer {
            shape: ResponseShape::Structured,
            agent_markdown: synthesize_agent_markdown(&s),
            intro: s.intro.unwrap_or_default(),
            cta: s.cta,
            agents: s.agents,
        }
    }

    /// Split freeform markdown and parse its agent sections. An explicit intro wins over
    /// the split one.
    fn markdown_answer(
        &self,
        markdown: &str,
        intro: Option<String>,
        cta: Option<String>,
        shape: ResponseShape,
    ) -> Answer {
        let split = split_markdown(markdown);
        Answer {
            shape,
            intro: intro.unwrap_or(split.intro_text),
            cta,
            agents: parse_agent_sections(&split.agent_markdown, &self.labels),
            agent_markdown: split.agent_markdown,
        }
    }

    /// Clean one agent and resolve it against the approved catalog. A synthesized id is
    /// replaced by the catalog id when the name matches an approved entry.
    fn card(&self, agent: &AgentSummary, catalog: &Catalog) -> AgentCard {
        let synthetic = agent.id_synthesized;
        let entry: Option<&CatalogEntry> = catalog.find_by_id(&agent.agent_id).or_else(|| {
            synthetic
                .then(|| catalog.find_by_name(&agent.agent_name))
                .flatten()
        });
        let agent_id = match entry {
            Some(e) if synthetic => e.agent_id.clone(),
            _ => agent.agent_id.clone(),
        };

        let (feature_source, features) = normalize_with_source(agent);
        let features = features
            .iter()
            .map(|f| self.labels.strip(f))
            .filter(|f| !f.is_empty())
            .collect();
        let strip =
            |text: Option<&str>| text.map(|t| self.labels.strip(t)).filter(|t| !t.is_empty());
        let catalog_field = |get: fn(&CatalogEntry) -> &str| {
            entry.map(get).filter(|s| !s.is_empty()).map(str::to_string)
        };

        AgentCard {
            href: self.linker.href(&agent_id),
            agent_id,
            name: clean_text(&agent.agent_name),
            description: strip(agent.description.as_deref())
                .or_else(|| catalog_field(|e| e.description.as_str())),
            value_proposition: strip(agent.value_proposition.as_deref()),
            features,
            feature_source,
            in_catalog: entry.is_some(),
            service_provider: agent
                .service_provider
                .clone()
                .or_else(|| catalog_field(|e| e.service_provider.as_str())),
            asset_type: agent
                .asset_type
                .clone()
                .or_else(|| catalog_field(|e| e.asset_type.as_str())),
        }
    }
}

/// The answer slot of an envelope (`data.response` or `response`) when it holds something
/// other than null; non-object payloads are their own answer. Envelopes without an
/// answer slot carry no answer at all.
fn answer_field(raw: &serde_json::Value) -> Option<&serde_json::Value> {
    if !raw.is_object() {
        return Some(raw).filter(|v| !v.is_null());
    }
    [raw.pointer("/data/response"), raw.get("response")]
        .into_iter()
        .flatten()
        .find(|v| !v.is_null())
}

/// Run the pipeline with a normalizer built from `config`.
pub fn digest(payload: &ChatPayload, catalog: &Catalog, config: &Config) -> Digest {
    Normalizer::from_config(config).digest(payload, catalog)
}

#[cfg(test)]
mod tests;
