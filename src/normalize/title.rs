//! Title parsing: split "Name (ID: agent_xyz)" into display name and identifier.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static TITLE_WITH_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^(.*?)\s*\(\s*id\s*:\s*([^()]+?)\s*\)\s*$")
        .expect("title id pattern must compile")
});

/// Display name plus the identifier found in a trailing `(ID: ...)` suffix.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ParsedTitle {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_from_title: Option<String>,
}

/// Parse a raw title. Empty input yields an empty name; no suffix yields the trimmed title.
pub fn parse_title(raw: &str) -> ParsedTitle {
    if raw.trim().is_empty() {
        return ParsedTitle::default();
    }
    if let Some(caps) = TITLE_WITH_ID.captures(raw) {
        let id = caps[2].trim();
        if !id.is_empty() {
            return ParsedTitle {
                name: caps[1].trim().to_string(),
                id_from_title: Some(id.to_string()),
            };
        }
    }
    ParsedTitle {
        name: raw.trim().to_string(),
        id_from_title: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_and_id() {
        let parsed = parse_title("CXO Concierge (ID: agent_004)");
        assert_eq!(parsed.name, "CXO Concierge");
        assert_eq!(parsed.id_from_title.as_deref(), Some("agent_004"));
    }

    #[test]
    fn id_token_is_case_insensitive() {
        let parsed = parse_title("Refund Bot (id:agent_9 )");
        assert_eq!(parsed.name, "Refund Bot");
        assert_eq!(parsed.id_from_title.as_deref(), Some("agent_9"));
    }

    #[test]
    fn no_suffix_returns_trimmed_title() {
        let parsed = parse_title("  Plain Name  ");
        assert_eq!(parsed.name, "Plain Name");
        assert_eq!(parsed.id_from_title, None);
    }

    #[test]
    fn empty_input_returns_empty_name() {
        assert_eq!(parse_title(""), ParsedTitle::default());
        assert_eq!(parse_title("   \n"), ParsedTitle::default());
    }

    #[test]
    fn parenthesised_text_that_is_not_an_id_is_kept() {
        let parsed = parse_title("Ops Agent (beta)");
        assert_eq!(parsed.name, "Ops Agent (beta)");
        assert_eq!(parsed.id_from_title, None);
    }

    #[test]
    fn empty_id_is_ignored() {
        let parsed = parse_title("Ops Agent (ID: )");
        assert_eq!(parsed.name, "Ops Agent (ID: )");
        assert_eq!(parsed.id_from_title, None);
    }
}
