//! Plain-text rendering of digests and trend documents for terminal output.

use std::fmt::Write;

use crate::normalize::features::FeatureSource;
use crate::normalize::trends::{TrendDocument, TrendSection};
use crate::normalize::{AgentCard, Digest};

/// Column width for wrapped prose.
pub const WRAP_WIDTH: usize = 80;

/// Wrap each paragraph line to `width`, keeping blank lines and list indentation.
pub fn wrap_block(text: &str, width: usize) -> String {
    let mut out = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            out.push(String::new());
            continue;
        }
        let indent: String = line.chars().take_while(|c| c.is_whitespace()).collect();
        let options = textwrap::Options::new(width.max(20))
            .initial_indent(&indent)
            .subsequent_indent(&indent);
        out.extend(
            textwrap::wrap(line.trim_start(), options)
                .into_iter()
                .map(|l| l.into_owned()),
        );
    }
    out.join("\n")
}

fn render_card(out: &mut String, n: usize, card: &AgentCard) {
    let _ = writeln!(out, "{}. {}  [{}]", n, card.name, card.href);
    if let Some(desc) = &card.description {
        let _ = writeln!(out, "{}", wrap_block(&format!("   {}", desc), WRAP_WIDTH));
    }
    if let Some(vp) = &card.value_proposition {
        let _ = writeln!(out, "{}", wrap_block(&format!("   Value: {}", vp), WRAP_WIDTH));
    }
    if card.feature_source != FeatureSource::Description {
        for f in &card.features {
            let _ = writeln!(out, "{}", wrap_block(&format!("   - {}", f), WRAP_WIDTH));
        }
    }
}

fn render_section(out: &mut String, section: &TrendSection) {
    let _ = writeln!(out, "[{}] {}", section.index, section.title);
    if !section.content.is_empty() {
        let _ = writeln!(out, "{}", wrap_block(&section.content, WRAP_WIDTH));
    }
    out.push('\n');
}

/// Trend document as numbered tabs.
pub fn render_trends(doc: &TrendDocument) -> String {
    let mut out = String::new();
    if !doc.preamble.is_empty() {
        let _ = writeln!(out, "{}\n", wrap_block(&doc.preamble, WRAP_WIDTH));
    }
    for section in &doc.sections {
        render_section(&mut out, section);
    }
    out.trim_end().to_string()
}

/// Full digest: intro, agents, call to action, trends, and build status.
pub fn render_digest(digest: &Digest) -> String {
    let mut out = String::new();
    if !digest.intro.is_empty() {
        let _ = writeln!(out, "{}\n", wrap_block(&digest.intro, WRAP_WIDTH));
    }
    if !digest.agents.is_empty() {
        let _ = writeln!(out, "Agents ({}):", digest.agents.len());
        for (i, card) in digest.agents.iter().enumerate() {
            render_card(&mut out, i + 1, card);
        }
        out.push('\n');
    } else if !digest.agent_markdown.is_empty() {
        let _ = writeln!(out, "{}\n", wrap_block(&digest.agent_markdown, WRAP_WIDTH));
    }
    if let Some(cta) = &digest.cta {
        let _ = writeln!(out, "{}\n", wrap_block(cta, WRAP_WIDTH));
    }
    if !digest.trends.sections.is_empty() {
        let _ = writeln!(out, "Mega trends:\n{}\n", render_trends(&digest.trends));
    }
    if !digest.suggested_agents.is_empty() {
        let _ = writeln!(out, "Suggested agents:");
        for s in &digest.suggested_agents {
            match &s.href {
                Some(href) => {
                    let _ = writeln!(out, "  - {} [{}]", s.agent.solution_name, href);
                }
                None => {
                    let _ = writeln!(out, "  - {}", s.agent.solution_name);
                }
            }
        }
        out.push('\n');
    }
    if !digest.filtered_agents.is_empty() {
        let _ = writeln!(out, "Matching catalog agents ({}):", digest.filtered_agents.len());
        for (i, card) in digest.filtered_agents.iter().enumerate() {
            render_card(&mut out, i + 1, card);
        }
        out.push('\n');
    }
    if digest.lets_build {
        let _ = writeln!(out, "Ready to build.");
    }
    if let Some(brd) = &digest.brd {
        let status = brd.status.as_deref().unwrap_or("unknown");
        match &brd.download_url {
            Some(url) => {
                let _ = writeln!(out, "BRD: {} ({})", status, url);
            }
            None => {
                let _ = writeln!(out, "BRD: {}", status);
            }
        }
    }
    out.trim_end().to_string()
}
