//! Intro splitting: separate the leading prose of an answer from its agent section.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use super::features::{FeatureSource, normalize_with_source};
use super::shape::{self, StructuredResponse};

/// First level-3 heading at the start of a line (`###` but not `####`).
static LEVEL3_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]{0,3}###(?:[^#]|$)").expect("heading pattern must compile")
});

/// Leading prose and the agent markdown that follows it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IntroSplit {
    pub intro_text: String,
    pub agent_markdown: String,
}

/// Split a markdown answer at its first level-3 heading. Without a heading the whole
/// text is agent markdown and the intro is empty.
pub fn split_markdown(markdown: &str) -> IntroSplit {
    match LEVEL3_HEADING.find(markdown) {
        Some(m) => IntroSplit {
            intro_text: markdown[..m.start()].trim().to_string(),
            agent_markdown: markdown[m.start()..].trim().to_string(),
        },
        None => IntroSplit {
            intro_text: String::new(),
            agent_markdown: markdown.trim().to_string(),
        },
    }
}

/// Split any answer value: markdown strings directly, objects via their markdown field,
/// structured objects by synthesizing agent markdown, anything else via its JSON text.
pub fn split_response(input: &Value) -> IntroSplit {
    match input {
        Value::Null => IntroSplit::default(),
        Value::String(s) => split_markdown(s),
        Value::Object(_) => {
            if let Some(markdown) = shape::find_markdown(input) {
                return split_markdown(&markdown);
            }
            if let Some(structured) = shape::detect(input) {
                return IntroSplit {
                    intro_text: structured.intro.as_deref().unwrap_or("").trim().to_string(),
                    agent_markdown: synthesize_agent_markdown(&structured),
                };
            }
            log::debug!("Answer object has no markdown or structured fields; using its JSON text");
            split_markdown(&input.to_string())
        }
        other => split_markdown(&other.to_string()),
    }
}

/// Render structured agents as the markdown the freeform answers use, with the call to
/// action appended.
pub fn synthesize_agent_markdown(response: &StructuredResponse) -> String {
    let mut blocks: Vec<String> = response
        .agents
        .iter()
        .enumerate()
        .map(|(i, agent)| {
            let mut lines = vec![format!("### {}. **{}**", i + 1, agent.agent_name)];
            let description = agent.description.as_deref().map(str::trim).filter(|d| !d.is_empty());
            if let Some(desc) = description {
                lines.push(format!("- **Description**: {}", desc));
            }
            if let Some(vp) = agent
                .value_proposition
                .as_deref()
                .map(str::trim)
                .filter(|vp| !vp.is_empty() && Some(*vp) != description)
            {
                lines.push(format!("- **Value Proposition**: {}", vp));
            }
            let (source, features) = normalize_with_source(agent);
            if source != FeatureSource::Description && !features.is_empty() {
                lines.push("- **Key Features**:".to_string());
                lines.extend(features.iter().map(|f| format!("  - {}", f)));
            }
            lines.join("\n")
        })
        .collect();
    if let Some(cta) = response.cta.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        blocks.push(cta.to_string());
    }
    blocks.join("\n\n")
}
