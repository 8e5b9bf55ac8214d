//! Feature normalisation: reduce the many feature shapes an agent can carry to one ordered list.
//!
//! Shapes are tried in [`SHAPES`] order. The first shape that applies and yields at least one
//! entry wins. `value_proposition` never feeds the list; it is shown as its own section.

use serde::Serialize;

use crate::core::agent::{AgentSummary, FeatureEntry, Features};

/// Which agent field produced the feature list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSource {
    KeyFeatures,
    FeatureItems,
    FeatureText,
    Description,
    None,
}

/// A shape predicate paired with its extractor.
struct ShapeMatcher {
    source: FeatureSource,
    applies: fn(&AgentSummary) -> bool,
    extract: fn(&AgentSummary) -> Vec<String>,
}

const SHAPES: &[ShapeMatcher] = &[
    ShapeMatcher {
        source: FeatureSource::KeyFeatures,
        applies: |a| a.key_features.as_ref().is_some_and(|k| !k.is_empty()),
        extract: |a| {
            format_entries(a.key_features.as_deref().unwrap_or_default(), |e| {
                (
                    e.title.as_deref().or(e.name.as_deref()),
                    e.detail.as_deref().or(e.description.as_deref()),
                )
            })
        },
    },
    ShapeMatcher {
        source: FeatureSource::FeatureItems,
        applies: |a| matches!(&a.features, Some(Features::Items(items)) if !items.is_empty()),
        extract: |a| match &a.features {
            Some(Features::Items(items)) => format_entries(items, |e| {
                (
                    e.name.as_deref().or(e.title.as_deref()),
                    e.detail.as_deref().or(e.description.as_deref()),
                )
            }),
            _ => Vec::new(),
        },
    },
    ShapeMatcher {
        source: FeatureSource::FeatureText,
        applies: |a| matches!(&a.features, Some(Features::Text(t)) if !is_not_available(t)),
        extract: |a| match &a.features {
            Some(Features::Text(t)) => split_feature_text(t),
            _ => Vec::new(),
        },
    },
    ShapeMatcher {
        source: FeatureSource::Description,
        applies: |a| a.description.as_deref().is_some_and(|d| !d.trim().is_empty()),
        extract: |a| {
            a.description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(|d| vec![d.to_string()])
                .unwrap_or_default()
        },
    },
];

/// Ordered, human-readable feature strings for `agent`. Never contains empty or
/// placeholder entries.
pub fn normalize_features(agent: &AgentSummary) -> Vec<String> {
    normalize_with_source(agent).1
}

/// Like [`normalize_features`], also reporting which field the list came from.
pub fn normalize_with_source(agent: &AgentSummary) -> (FeatureSource, Vec<String>) {
    for shape in SHAPES {
        if !(shape.applies)(agent) {
            continue;
        }
        let items: Vec<String> = (shape.extract)(agent)
            .into_iter()
            .filter(|f| !is_placeholder(f))
            .collect();
        if !items.is_empty() {
            log::debug!(
                "Features for {} from {:?} ({} items)",
                agent.agent_id,
                shape.source,
                items.len()
            );
            return (shape.source, items);
        }
    }
    (FeatureSource::None, Vec::new())
}

/// Map entries to "title: detail" (or the title alone), dropping empty titles and
/// placeholder titles without detail.
fn format_entries<F>(entries: &[FeatureEntry], parts: F) -> Vec<String>
where
    F: Fn(&FeatureEntry) -> (Option<&str>, Option<&str>),
{
    entries
        .iter()
        .filter_map(|e| {
            let (title, detail) = parts(e);
            format_entry(title, detail)
        })
        .collect()
}

fn format_entry(title: Option<&str>, detail: Option<&str>) -> Option<String> {
    let title = title.map(tidy).unwrap_or_default();
    let detail = detail.map(tidy).filter(|d| !d.is_empty());
    if title.is_empty() || (detail.is_none() && is_placeholder(&title)) {
        return None;
    }
    Some(match detail {
        Some(d) => format!("{}: {}", title, d),
        None => title,
    })
}

/// Split a delimited feature string on `;` or newlines.
fn split_feature_text(text: &str) -> Vec<String> {
    text.split([';', '\n'])
        .map(|seg| seg.trim_matches(|c: char| c == ',' || c == '-' || c.is_whitespace()))
        .filter(|seg| !seg.is_empty())
        .map(str::to_string)
        .collect()
}

fn tidy(s: &str) -> String {
    s.trim()
        .trim_matches(|c: char| c == '*' || c.is_whitespace())
        .trim_end_matches(':')
        .trim()
        .to_string()
}

fn is_not_available(text: &str) -> bool {
    let t = text.trim();
    t.is_empty() || t.eq_ignore_ascii_case("na") || t.eq_ignore_ascii_case("n/a")
}

/// Empty strings, dash runs and a bare "features" heading.
fn is_placeholder(s: &str) -> bool {
    let t = s.trim().trim_end_matches(':').trim();
    t.is_empty() || t.chars().all(|c| c == '-') || t.eq_ignore_ascii_case("features")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str, detail: &str) -> FeatureEntry {
        FeatureEntry {
            title: Some(title.to_string()).filter(|s| !s.is_empty()),
            detail: Some(detail.to_string()).filter(|s| !s.is_empty()),
            ..Default::default()
        }
    }

    #[test]
    fn key_features_take_precedence() {
        let agent = AgentSummary {
            key_features: Some(vec![entry("Speed", "Sub-second response")]),
            features: Some(Features::Text("ignored".to_string())),
            ..Default::default()
        };
        assert_eq!(normalize_features(&agent), ["Speed: Sub-second response"]);
        assert_eq!(normalize_with_source(&agent).0, FeatureSource::KeyFeatures);
    }

    #[test]
    fn placeholder_entries_are_dropped() {
        let agent = AgentSummary {
            key_features: Some(vec![
                entry("Features", ""),
                entry("--", ""),
                entry("-", ""),
                entry("", "orphan detail"),
                entry("Accuracy", ""),
                entry("--", "Detail only"),
                entry("Features", "Fast"),
            ]),
            ..Default::default()
        };
        assert_eq!(
            normalize_features(&agent),
            ["Accuracy", "--: Detail only", "Features: Fast"]
        );
    }

    #[test]
    fn key_features_fall_back_to_name_and_description_keys() {
        let agent = AgentSummary {
            key_features: Some(vec![FeatureEntry {
                name: Some("Recall".to_string()),
                description: Some("Remembers context".to_string()),
                ..Default::default()
            }]),
            ..Default::default()
        };
        assert_eq!(normalize_features(&agent), ["Recall: Remembers context"]);
    }

    #[test]
    fn feature_items_prefer_name_over_title() {
        let agent = AgentSummary {
            features: Some(Features::Items(vec![FeatureEntry {
                name: Some("Name".to_string()),
                title: Some("Title".to_string()),
                detail: Some("**Detail**".to_string()),
                ..Default::default()
            }])),
            ..Default::default()
        };
        assert_eq!(normalize_features(&agent), ["Name: Detail"]);
        assert_eq!(normalize_with_source(&agent).0, FeatureSource::FeatureItems);
    }

    #[test]
    fn feature_text_is_split_and_trimmed() {
        let agent = AgentSummary {
            features: Some(Features::Text(
                "- Fast,; Accurate\n\n, Real-time alerts -;".to_string(),
            )),
            ..Default::default()
        };
        assert_eq!(
            normalize_features(&agent),
            ["Fast", "Accurate", "Real-time alerts"]
        );
    }

    #[test]
    fn na_text_falls_through_to_description() {
        let agent = AgentSummary {
            features: Some(Features::Text("NA".to_string())),
            description: Some(" Handles refunds ".to_string()),
            value_proposition: Some("Never listed".to_string()),
            ..Default::default()
        };
        assert_eq!(normalize_features(&agent), ["Handles refunds"]);
        assert_eq!(normalize_with_source(&agent).0, FeatureSource::Description);
    }

    #[test]
    fn all_placeholder_key_features_fall_through() {
        let agent = AgentSummary {
            key_features: Some(vec![entry("--", "")]),
            features: Some(Features::Text("One; Two".to_string())),
            ..Default::default()
        };
        assert_eq!(normalize_features(&agent), ["One", "Two"]);
    }

    #[test]
    fn value_proposition_alone_yields_nothing() {
        let agent = AgentSummary {
            value_proposition: Some("Saves money".to_string()),
            ..Default::default()
        };
        let (source, items) = normalize_with_source(&agent);
        assert_eq!(source, FeatureSource::None);
        assert!(items.is_empty());
    }
}
