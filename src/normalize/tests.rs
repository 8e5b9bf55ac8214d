use proptest::prelude::*;
use regex::Regex;
use serde_json::json;

use super::features::{FeatureSource, normalize_features};
use super::intro::split_markdown;
use super::labels::clean_text;
use super::mentions::link_mentions;
use super::{Normalizer, ResponseShape};
use crate::core::agent::{AgentSummary, Features};
use crate::core::catalog::Catalog;
use crate::core::payload::ChatPayload;

fn catalog() -> Catalog {
    Catalog::from_value(&json!([
        {"agent_id": "cat_7", "agent_name": "Helper", "description": "Catalog helper",
         "service_provider": "Acme", "admin_approved": "yes"},
        {"agent_id": "agent_12", "agent_name": "Refund Bot", "admin_approved": "yes"},
        {"agent_id": "d", "agent_name": "Draft Agent", "admin_approved": "no"}
    ]))
    .unwrap()
}

const MARKDOWN_ANSWER: &str = "\
Here are agents for Refund Bot fans.
### 1. **Refund Bot (ID: agent_12)**
- **Description**: Handles refunds.
- **Key Features**:
  - Speed

### 2. **Helper**
- **Description**: Triage.";

#[test]
fn markdown_answer_is_split_parsed_and_linked() {
    let payload = ChatPayload::from_value(json!({"data": {
        "response": MARKDOWN_ANSWER,
        "mega_trends": "### MEGA TREND 1\nHelper adoption grows.",
        "lets_build": true,
        "timestamp": 1_700_000_000
    }}));
    let digest = Normalizer::default().digest(&payload, &catalog());

    assert_eq!(digest.shape, ResponseShape::Markdown);
    assert_eq!(
        digest.intro,
        "Here are agents for [Refund Bot](/agents/agent_12) fans."
    );
    assert_eq!(digest.agents.len(), 2);

    let refund = &digest.agents[0];
    assert_eq!(refund.agent_id, "agent_12");
    assert_eq!(refund.name, "Refund Bot");
    assert_eq!(refund.features, ["Speed"]);
    assert_eq!(refund.feature_source, FeatureSource::FeatureItems);
    assert!(refund.in_catalog);

    let helper = &digest.agents[1];
    assert_eq!(helper.agent_id, "cat_7");
    assert_eq!(helper.href, "/agents/cat_7");
    assert_eq!(helper.description.as_deref(), Some("Triage."));
    assert_eq!(helper.feature_source, FeatureSource::Description);
    assert_eq!(helper.service_provider.as_deref(), Some("Acme"));

    assert_eq!(digest.trends.sections.len(), 1);
    assert_eq!(
        digest.trends.sections[0].content,
        "[Helper](/agents/cat_7) adoption grows."
    );
    assert!(digest.lets_build);
    assert_eq!(
        digest.timestamp.as_deref(),
        Some("2023-11-14T22:13:20+00:00")
    );
}

#[test]
fn structured_answer_keeps_agent_list() {
    let payload = ChatPayload::from_value(json!({"response": {
        "intro": "Description: Top picks",
        "agents": [{
            "agent_id": "x1",
            "agent_name": "Churn Watch",
            "description": "Watches churn",
            "key_features": [{"title": "Alerts", "detail": "real-time"}]
        }],
        "cta": "Ask about Churn Watch."
    }}));
    let digest = Normalizer::default().digest(&payload, &Catalog::default());

    assert_eq!(digest.shape, ResponseShape::Structured);
    assert_eq!(digest.intro, "Top picks");
    assert_eq!(digest.cta.as_deref(), Some("Ask about Churn Watch."));
    let card = &digest.agents[0];
    assert_eq!(card.features, ["Alerts: real-time"]);
    assert_eq!(card.feature_source, FeatureSource::KeyFeatures);
    assert!(!card.in_catalog);
    assert!(digest.agent_markdown.starts_with("### 1. **Churn Watch**"));
    assert!(digest.agent_markdown.contains("- Watches churn"));
}

#[test]
fn structured_markdown_without_agents_is_section_parsed() {
    let payload = ChatPayload::from_value(json!({"data": {"response": {
        "intro": "Hi",
        "response_markdown": "Ignored intro\n### Helper\nDoes triage."
    }}}));
    let digest = Normalizer::default().digest(&payload, &Catalog::default());
    assert_eq!(digest.shape, ResponseShape::Structured);
    assert_eq!(digest.intro, "Hi");
    assert_eq!(digest.agents.len(), 1);
    assert_eq!(digest.agents[0].description.as_deref(), Some("Does triage."));
}

#[test]
fn payload_without_answer_is_empty() {
    let payload = ChatPayload::from_value(json!({"data": {"mega_trends": "Just analysis."}}));
    let digest = Normalizer::default().digest(&payload, &Catalog::default());
    assert_eq!(digest.shape, ResponseShape::Empty);
    assert!(digest.intro.is_empty());
    assert!(digest.agents.is_empty());
    assert_eq!(digest.trends.sections.len(), 1);
    assert_eq!(digest.trends.sections[0].title, "Mega Trends");
}

#[test]
fn unapproved_catalog_names_are_not_linked() {
    let payload = ChatPayload::parse("Try Draft Agent or Helper.");
    let digest = Normalizer::default().digest(&payload, &catalog());
    assert_eq!(digest.intro, "");
    assert_eq!(digest.agent_markdown, "Try Draft Agent or Helper.");
    let payload =
        ChatPayload::from_value(json!({"response": {"intro": "Try Draft Agent or Helper."}}));
    let digest = Normalizer::default().digest(&payload, &catalog());
    assert_eq!(digest.intro, "Try Draft Agent or [Helper](/agents/cat_7).");
}

#[test]
fn response_agents_outside_the_approved_catalog_are_not_linked() {
    let payload = ChatPayload::from_value(json!({"response": {
        "intro": "Try Draft Agent, Churn Watch or Helper today.",
        "agents": [
            {"agent_id": "d", "agent_name": "Draft Agent"},
            {"agent_id": "x1", "agent_name": "Churn Watch"},
            {"agent_id": "cat_7", "agent_name": "Helper"}
        ]
    }}));
    let digest = Normalizer::default().digest(&payload, &catalog());
    assert_eq!(
        digest.intro,
        "Try Draft Agent, Churn Watch or [Helper](/agents/cat_7) today."
    );
    let in_catalog: Vec<bool> = digest.agents.iter().map(|a| a.in_catalog).collect();
    assert_eq!(in_catalog, [false, false, true]);
}

#[test]
fn synthesized_ids_resolve_by_name_after_skipped_entries() {
    let payload = ChatPayload::from_value(json!({"response": {
        "intro": "Picks",
        "agents": [null, {"agent_name": "Helper"}]
    }}));
    let digest = Normalizer::default().digest(&payload, &catalog());
    assert_eq!(digest.agents.len(), 1);
    assert_eq!(digest.agents[0].agent_id, "cat_7");
    assert!(digest.agents[0].in_catalog);
}

#[test]
fn explicit_ids_are_never_replaced_by_name_matches() {
    let payload = ChatPayload::from_value(json!({"response": {
        "intro": "Picks",
        "agents": [{"agent_id": "agent_1", "agent_name": "Helper"}]
    }}));
    let digest = Normalizer::default().digest(&payload, &catalog());
    assert_eq!(digest.agents[0].agent_id, "agent_1");
    assert_eq!(digest.agents[0].href, "/agents/agent_1");
    assert!(!digest.agents[0].in_catalog);
}

#[test]
fn unrecognised_answer_is_read_as_text() {
    let payload = ChatPayload::from_value(json!({"data": {"response": 42}}));
    let digest = Normalizer::default().digest(&payload, &Catalog::default());
    assert_eq!(digest.shape, ResponseShape::Markdown);
    assert_eq!(digest.agent_markdown, "42");

    let payload = ChatPayload::from_value(json!({"response": {"status": "ok"}}));
    let digest = Normalizer::default().digest(&payload, &Catalog::default());
    assert_eq!(digest.shape, ResponseShape::Markdown);
    assert_eq!(digest.agent_markdown, r#"{"status":"ok"}"#);
}

#[test]
fn suggested_filtered_and_brd_fields() {
    let payload = ChatPayload::from_value(json!({"data": {
        "response": "Hello",
        "suggested_agents": [
            {"solution_name": "Helper"},
            {"solution_name": "Brand New Idea"}
        ],
        "filtered_agents": ["agent_12", "missing"],
        "brd_status": "generating"
    }}));
    let digest = Normalizer::default().digest(&payload, &catalog());
    assert_eq!(digest.suggested_agents[0].href.as_deref(), Some("/agents/cat_7"));
    assert_eq!(digest.suggested_agents[1].href, None);
    assert_eq!(digest.filtered_agents.len(), 1);
    assert_eq!(digest.filtered_agents[0].name, "Refund Bot");
    assert!(digest.filtered_agents[0].in_catalog);
    let brd = digest.brd.unwrap();
    assert_eq!(brd.status.as_deref(), Some("generating"));
    assert_eq!(brd.download_url, None);
}

#[test]
fn digest_serializes_with_snake_case_enums() {
    let payload = ChatPayload::parse(MARKDOWN_ANSWER);
    let digest = Normalizer::default().digest(&payload, &Catalog::default());
    let value = serde_json::to_value(&digest).unwrap();
    assert_eq!(value["shape"], "markdown");
    assert_eq!(value["agents"][0]["feature_source"], "feature_items");
    assert!(value.get("brd").is_none());
}

fn unlink(text: &str) -> String {
    let link = Regex::new(r"\[([^\]]*)\]\(/agents/[^)]*\)").unwrap();
    link.replace_all(text, "$1").into_owned()
}

fn non_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

fn agent(id: &str, name: &str) -> AgentSummary {
    AgentSummary {
        agent_id: id.to_string(),
        agent_name: name.to_string(),
        ..Default::default()
    }
}

proptest! {
    #[test]
    fn proptest_clean_text_is_idempotent(text in "\\PC{0,40}") {
        let once = clean_text(&text);
        prop_assert_eq!(clean_text(&once), once);
    }

    #[test]
    fn proptest_split_keeps_every_character(md in "[a-z #\n*]{0,80}") {
        let split = split_markdown(&md);
        prop_assert_eq!(
            non_whitespace(&split.intro_text) + &non_whitespace(&split.agent_markdown),
            non_whitespace(&md)
        );
    }

    #[test]
    fn proptest_features_have_no_placeholders(text in "[a-zA-Z ;:\n-]{0,60}") {
        let agent = AgentSummary {
            features: Some(Features::Text(text)),
            ..Default::default()
        };
        for f in normalize_features(&agent) {
            let t = f.trim().trim_end_matches(':').trim();
            prop_assert!(!t.is_empty());
            prop_assert!(!t.chars().all(|c| c == '-'));
            prop_assert!(!t.eq_ignore_ascii_case("features"));
        }
    }

    #[test]
    fn proptest_linking_only_wraps_names(
        words in proptest::collection::vec(
            proptest::sample::select(vec![
                "Helper", "Refund", "Bot", "and", "1.", "2)", ",", ".", "\n", "Helpers",
            ]),
            0..30,
        )
    ) {
        let text = words.join(" ");
        let agents = [agent("a1", "Refund Bot"), agent("a2", "Helper")];
        let linked = link_mentions(&text, &agents);
        prop_assert_eq!(unlink(&linked), text);
    }
}
