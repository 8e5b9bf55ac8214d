//! Agent section parsing: turn freeform agent markdown into [`AgentSummary`] records.
//!
//! Each level-3 heading opens a section. Labelled list items (`- **Description**: ...`)
//! fill the matching field; items nested under a features label become feature entries.

use std::sync::LazyLock;

use regex::Regex;

use super::labels::LabelStripper;
use crate::core::agent::{AgentSummary, FeatureEntry, Features};

static SECTION_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]{0,3}###[ \t]*([^#\n][^\n]*)?$").expect("section pattern must compile")
});

static ORDINAL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[.)][ \t]*").expect("ordinal pattern must compile"));

static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t]*(?:[-*+•]|\d+[.)])[ \t]+(.*)$").expect("list item pattern must compile")
});

/// `**Label**: value`, `**Label:** value` or `Label: value`.
static LABELLED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\*\*|__)?([^*_:\n]+?)(?:\*\*|__)?[ \t]*:(?:\*\*|__)?[ \t]*(.*)$")
        .expect("labelled pattern must compile")
});

/// Field a label writes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SectionField {
    Title,
    Description,
    ValueProposition,
    Features,
}

fn field_for(label: &str) -> SectionField {
    match label.to_ascii_lowercase().as_str() {
        "title" => SectionField::Title,
        "value proposition" => SectionField::ValueProposition,
        "key features" | "features" | "capabilities" | "benefits" | "use cases" => {
            SectionField::Features
        }
        _ => SectionField::Description,
    }
}

#[derive(Default)]
struct SectionBuilder {
    name: String,
    description: Vec<String>,
    value_proposition: Vec<String>,
    features: Vec<String>,
}

impl SectionBuilder {
    fn push(&mut self, field: SectionField, value: &str) {
        let value = value.replace("**", "").trim().to_string();
        if value.is_empty() {
            return;
        }
        match field {
            SectionField::Title if self.name.is_empty() => self.name = value,
            SectionField::Title | SectionField::Description => self.description.push(value),
            SectionField::ValueProposition => self.value_proposition.push(value),
            SectionField::Features => self.features.push(value),
        }
    }

    fn build(self, position: usize) -> AgentSummary {
        let mut agent = AgentSummary::named(&self.name, None, position);
        agent.description = join_non_empty(&self.description);
        agent.value_proposition = join_non_empty(&self.value_proposition);
        if !self.features.is_empty() {
            agent.features = Some(Features::Items(
                self.features.into_iter().map(FeatureEntry::titled).collect(),
            ));
        }
        agent
    }
}

fn join_non_empty(parts: &[String]) -> Option<String> {
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

/// Parse one record per level-3 section. Text before the first heading is ignored;
/// `labels` decides which `Label:` prefixes are treated as fields.
pub fn parse_agent_sections(agent_markdown: &str, labels: &LabelStripper) -> Vec<AgentSummary> {
    let headings: Vec<(usize, usize, String)> = SECTION_HEADING
        .captures_iter(agent_markdown)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let title = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            Some((whole.start(), whole.end(), heading_title(title)))
        })
        .collect();

    let mut agents = Vec::with_capacity(headings.len());
    for (i, (_, body_start, title)) in headings.iter().enumerate() {
        let body_end = headings
            .get(i + 1)
            .map(|(start, _, _)| *start)
            .unwrap_or(agent_markdown.len());
        let body = &agent_markdown[*body_start..body_end];
        let builder = parse_section_body(title, body, labels);
        if builder.name.is_empty()
            && builder.description.is_empty()
            && builder.features.is_empty()
        {
            log::debug!("Skipping empty agent section {}", i + 1);
            continue;
        }
        agents.push(builder.build(agents.len() + 1));
    }
    agents
}

/// Heading text without its ordinal and emphasis markers.
fn heading_title(raw: &str) -> String {
    let t = raw.trim();
    let t = ORDINAL_PREFIX.replace(t, "");
    t.replace("**", "").replace("__", "").trim().to_string()
}

fn parse_section_body(title: &str, body: &str, labels: &LabelStripper) -> SectionBuilder {
    let mut builder = SectionBuilder {
        name: title.to_string(),
        ..Default::default()
    };
    let mut current = SectionField::Description;
    for line in body.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.chars().all(|c| c == '-' || c == '*') {
            continue;
        }
        let item = LIST_ITEM
            .captures(line)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim());
        let content = item.unwrap_or(trimmed);

        if let Some(caps) = LABELLED.captures(content)
            && let Some(label) = labels.match_label(&caps[1])
        {
            current = field_for(label);
            builder.push(current, &caps[2]);
            continue;
        }

        match (current, item.is_some()) {
            (SectionField::Features, true) => builder.push(SectionField::Features, content),
            (SectionField::Features, false) => {
                current = SectionField::Description;
                builder.push(current, content);
            }
            (field, _) => builder.push(field, content),
        }
    }
    builder
}
