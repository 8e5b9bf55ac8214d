//! Agent mention linking: rewrite plain-text agent names into `[Name](/agents/{id})` links.
//!
//! Names are matched longest first so "Refund Bot Pro" is linked before "Refund Bot" can
//! match inside it. Text already inside a markdown link is never touched.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::core::agent::AgentSummary;

/// Route prefix for agent detail pages.
pub const DEFAULT_ROUTE_PREFIX: &str = "/agents";

/// Existing `[text](url)` links.
static MARKDOWN_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[[^\]\n]*\]\([^)\n]*\)").expect("link pattern must compile")
});

/// Characters allowed right after a linked name.
const TRAILING_BOUNDARY: &[char] = &[',', '.', ':', ';'];

/// The two mention forms, tried in order. A pass that rewrites anything ends the agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MentionPass {
    /// `3. Name` or `3) Name`.
    Numbered,
    /// `Name` at line start or after whitespace.
    Bare,
}

impl MentionPass {
    const ALL: [MentionPass; 2] = [MentionPass::Numbered, MentionPass::Bare];

    fn pattern(self, escaped_name: &str) -> String {
        match self {
            MentionPass::Numbered => {
                format!(r"(?m)(?:^|\s)\d+[.)][ \t]+(?P<name>{})", escaped_name)
            }
            MentionPass::Bare => format!(r"(?m)(?:^|\s)(?P<name>{})", escaped_name),
        }
    }
}

/// Links agent mentions to their detail route.
#[derive(Clone, Debug)]
pub struct MentionLinker {
    route_prefix: String,
}

impl Default for MentionLinker {
    fn default() -> Self {
        Self::new(DEFAULT_ROUTE_PREFIX)
    }
}

impl MentionLinker {
    pub fn new(route_prefix: impl Into<String>) -> Self {
        let prefix: String = route_prefix.into();
        let trimmed = prefix.trim().trim_end_matches('/');
        Self {
            route_prefix: trimmed.to_string(),
        }
    }

    /// Detail route for an agent id.
    pub fn href(&self, agent_id: &str) -> String {
        format!("{}/{}", self.route_prefix, agent_id)
    }

    /// Rewrite mentions of `agents` in `text`. Each agent is linked by at most one pass.
    pub fn link(&self, text: &str, agents: &[AgentSummary]) -> String {
        let mut ordered: Vec<&AgentSummary> = agents
            .iter()
            .filter(|a| !a.agent_name.trim().is_empty() && !a.agent_id.trim().is_empty())
            .collect();
        ordered.sort_by(|a, b| {
            b.agent_name
                .trim()
                .chars()
                .count()
                .cmp(&a.agent_name.trim().chars().count())
        });

        let mut processed: HashSet<String> = HashSet::new();
        let mut out = text.to_string();
        for agent in ordered {
            let name = agent.agent_name.trim();
            if !processed.insert(name.to_lowercase()) {
                continue;
            }
            let href = self.href(agent.agent_id.trim());
            let escaped = regex::escape(name);
            for pass in MentionPass::ALL {
                let re = match Regex::new(&pass.pattern(&escaped)) {
                    Ok(re) => re,
                    Err(e) => {
                        log::warn!("Cannot build mention pattern for '{}': {}", name, e);
                        break;
                    }
                };
                if let Some(rewritten) = rewrite_pass(&out, &re, &href) {
                    log::debug!("Linked '{}' ({:?})", name, pass);
                    out = rewritten;
                    break;
                }
            }
        }
        out
    }
}

/// Apply one pass. Returns `None` when nothing was rewritten.
fn rewrite_pass(text: &str, re: &Regex, href: &str) -> Option<String> {
    let links: Vec<(usize, usize)> = MARKDOWN_LINK
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect();

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut count = 0;
    for caps in re.captures_iter(text) {
        let Some(name) = caps.name("name") else {
            continue;
        };
        if !ends_at_boundary(text, name.end()) {
            continue;
        }
        if links
            .iter()
            .any(|(start, end)| name.start() < *end && *start < name.end())
        {
            continue;
        }
        out.push_str(&text[last..name.start()]);
        out.push('[');
        out.push_str(name.as_str());
        out.push_str("](");
        out.push_str(href);
        out.push(')');
        last = name.end();
        count += 1;
    }
    if count == 0 {
        return None;
    }
    out.push_str(&text[last..]);
    Some(out)
}

fn ends_at_boundary(text: &str, end: usize) -> bool {
    match text[end..].chars().next() {
        None => true,
        Some(c) => c.is_whitespace() || TRAILING_BOUNDARY.contains(&c),
    }
}

/// Link mentions using the default `/agents` route.
pub fn link_mentions(text: &str, agents: &[AgentSummary]) -> String {
    MentionLinker::default().link(text, agents)
}
