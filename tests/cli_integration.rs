//! Integration tests that run the CLI binary.

use std::fs;
use std::path::PathBuf;

fn bin() -> std::process::Command {
    // CARGO_BIN_EXE_<name> uses the binary target name; hyphens require concat! for env!()
    let bin = env!(concat!("CARGO_BIN_EXE_agent", "-", "store", "-", "digest"));
    let mut cmd = std::process::Command::new(bin);
    cmd.env_remove("AGENT_STORE_CATALOG")
        .env_remove("AGENT_STORE_ROUTE_PREFIX")
        .env_remove("AGENT_STORE_LABELS")
        .env_remove("RUST_LOG");
    cmd
}

const CATALOG: &str = r#"[
  {"agent_id": "agent_12", "agent_name": "Refund Bot", "description": "Handles refunds",
   "by_capability": "Automation", "admin_approved": "yes"},
  {"agent_id": "cat_7", "agent_name": "Helper", "description": "General triage",
   "by_persona": "Support Lead", "admin_approved": "yes"},
  {"agent_id": "d1", "agent_name": "Draft Agent", "admin_approved": "no"}
]"#;

const PAYLOAD: &str = r####"{
  "data": {
    "response": "Here are options for Refund Bot fans.\n### 1. **Refund Bot (ID: agent_12)**\n- **Description**: Handles refunds.\n- **Key Features**:\n  - Speed\n\n### 2. **Helper**\n- **Description**: Triage.",
    "mega_trends": "## MEGA TREND 1\nHelper adoption.\n## MEGA TREND 2\nAutomation.",
    "lets_build": "yes"
  }
}"####;

/// Write `content` to `name` inside a fresh temp dir. The dir is returned to keep it alive.
fn fixture(name: &str, content: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::TempDir::new().expect("temp dir");
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write fixture");
    (dir, path)
}

fn stdout_of(output: &std::process::Output) -> String {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn cli_help_succeeds_and_outputs_usage() {
    let output = bin()
        .arg("--help")
        .output()
        .expect("binary not found - run cargo build first");
    let stdout = stdout_of(&output);
    assert!(stdout.contains("digest"));
    assert!(stdout.contains("EXAMPLES"));
}

#[test]
fn cli_version_succeeds() {
    let output = bin()
        .arg("--version")
        .output()
        .expect("binary not found - run cargo build first");
    assert!(stdout_of(&output).contains("agent-store-digest"));
}

#[test]
fn digest_json_normalizes_payload() {
    let (dir, payload) = fixture("reply.json", PAYLOAD);
    let catalog = dir.path().join("agents.json");
    fs::write(&catalog, CATALOG).unwrap();

    let output = bin()
        .current_dir(dir.path())
        .args(["digest", "--json", "--catalog"])
        .arg(&catalog)
        .arg(&payload)
        .output()
        .expect("binary not found - run cargo build first");
    let digest: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();

    assert_eq!(digest["shape"], "markdown");
    assert_eq!(
        digest["intro"],
        "Here are options for [Refund Bot](/agents/agent_12) fans."
    );
    assert_eq!(digest["agents"].as_array().map(Vec::len), Some(2));
    assert_eq!(digest["agents"][1]["agent_id"], "cat_7");
    assert_eq!(digest["trends"]["sections"].as_array().map(Vec::len), Some(2));
    assert_eq!(digest["lets_build"], true);
}

#[test]
fn digest_text_output_lists_agents() {
    let (dir, payload) = fixture("reply.json", PAYLOAD);
    let output = bin()
        .current_dir(dir.path())
        .arg("digest")
        .arg(&payload)
        .output()
        .expect("binary not found - run cargo build first");
    let stdout = stdout_of(&output);
    assert!(stdout.contains("Agents (2):"), "{}", stdout);
    assert!(stdout.contains("1. Refund Bot  [/agents/agent_12]"), "{}", stdout);
    assert!(stdout.contains("[2] MEGA TREND 2"), "{}", stdout);
}

#[test]
fn trends_reads_raw_markdown() {
    let (dir, input) = fixture("trends.md", "Overview\nTHEME: A\nx\nTHE SHIFT\ny");
    let output = bin()
        .current_dir(dir.path())
        .args(["trends", "--json"])
        .arg(&input)
        .output()
        .expect("binary not found - run cargo build first");
    let doc: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(doc["preamble"], "Overview");
    assert_eq!(doc["sections"][1]["title"], "THE SHIFT");
}

#[test]
fn link_uses_route_prefix_from_env() {
    let (dir, input) = fixture("notes.md", "Ask Helper or Draft Agent.");
    let catalog = dir.path().join("agents.json");
    fs::write(&catalog, CATALOG).unwrap();
    let output = bin()
        .current_dir(dir.path())
        .env("AGENT_STORE_ROUTE_PREFIX", "/store/agents")
        .env("AGENT_STORE_CATALOG", &catalog)
        .arg("link")
        .arg(&input)
        .output()
        .expect("binary not found - run cargo build first");
    assert_eq!(
        stdout_of(&output).trim(),
        "Ask [Helper](/store/agents/cat_7) or Draft Agent."
    );
}

#[test]
fn link_without_catalog_exits_with_error() {
    let (dir, input) = fixture("notes.md", "Ask Helper.");
    let output = bin()
        .current_dir(dir.path())
        .arg("link")
        .arg(&input)
        .output()
        .expect("binary not found - run cargo build first");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("AGENT_STORE_CATALOG"), "got: {}", stderr);
}

#[test]
fn strip_accepts_extra_labels() {
    let (dir, input) = fixture("answer.md", "**Pricing**: Free\n- **Description**: Fast");
    let output = bin()
        .current_dir(dir.path())
        .args(["strip", "--label", "Pricing"])
        .arg(&input)
        .output()
        .expect("binary not found - run cargo build first");
    assert_eq!(stdout_of(&output).trim(), "Free\n- Fast");
}

#[test]
fn catalog_filters_approved_agents() {
    let (dir, catalog) = fixture("agents.json", CATALOG);
    let output = bin()
        .current_dir(dir.path())
        .args(["catalog", "--persona", "support", "--catalog"])
        .arg(&catalog)
        .output()
        .expect("binary not found - run cargo build first");
    let stdout = stdout_of(&output);
    assert!(stdout.contains("Helper"));
    assert!(!stdout.contains("Refund Bot"));
    assert!(stdout.contains("1 agent(s) listed"));
}

#[test]
fn missing_payload_file_exits_with_error() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let output = bin()
        .current_dir(tmp.path())
        .args(["digest", "does-not-exist.json"])
        .output()
        .expect("binary not found - run cargo build first");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("does-not-exist.json"), "got: {}", stderr);
}

#[test]
fn completions_generate_script() {
    let output = bin()
        .args(["completions", "bash"])
        .output()
        .expect("binary not found - run cargo build first");
    assert!(stdout_of(&output).contains("agent-store-digest"));
}
