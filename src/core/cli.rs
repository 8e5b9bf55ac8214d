//! Subcommand implementations. Each reads its input, runs one pipeline stage or the whole
//! digest, and prints plain text or JSON to stdout.

use std::fmt::Display;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::core::app;
use crate::core::catalog::{Catalog, CatalogFilter};
use crate::core::config::{CATALOG_ENV, Config};
use crate::core::payload::{self, ChatPayload};
use crate::core::report;
use crate::normalize;
use crate::normalize::trends::parse_trend_document;

fn exit_with(e: impl Display) -> ! {
    eprintln!("Error: {}", e);
    std::process::exit(1);
}

fn read_or_exit(input: Option<&Path>) -> String {
    payload::read_input(input).unwrap_or_else(|e| exit_with(e))
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => exit_with(e),
    }
}

/// Load the catalog from `--catalog` or the configured path. Empty when neither is set.
fn load_catalog(flag: Option<&Path>, config: &Config) -> Option<Catalog> {
    let path = flag.or(config.catalog_path.as_deref())?;
    Some(Catalog::load(path).unwrap_or_else(|e| exit_with(format!("{}: {}", path.display(), e))))
}

fn require_catalog(flag: Option<&Path>, config: &Config) -> Catalog {
    load_catalog(flag, config).unwrap_or_else(|| {
        exit_with(format!(
            "no catalog given; pass --catalog or set {}",
            CATALOG_ENV
        ))
    })
}

/// Run the `digest` command: full pipeline on one payload.
pub fn run_digest(input: Option<&Path>, catalog: Option<&Path>, json: bool, config: &Config) {
    let text = read_or_exit(input);
    let payload = ChatPayload::parse(&text);
    let catalog = load_catalog(catalog, config).unwrap_or_default();
    let digest = normalize::digest(&payload, &catalog, config);
    if json {
        print_json(&digest);
    } else {
        println!("{}", report::render_digest(&digest));
    }
}

/// Run the `trends` command: parse `mega_trends` from a payload, or the input as raw text.
pub fn run_trends(input: Option<&Path>, json: bool) {
    let text = read_or_exit(input);
    let payload = ChatPayload::parse(&text);
    let source = match (payload.mega_trends, &payload.raw) {
        (Some(trends), _) => trends,
        (None, Value::String(s)) => s.clone(),
        (None, _) => {
            log::warn!("Payload has no mega_trends field");
            String::new()
        }
    };
    let doc = parse_trend_document(&source);
    if json {
        print_json(&doc);
    } else if doc.sections.is_empty() {
        println!("No trends found.");
    } else {
        println!("{}", report::render_trends(&doc));
    }
}

/// Run the `link` command: link approved catalog agents mentioned in raw text.
pub fn run_link(input: Option<&Path>, catalog: Option<&Path>, config: &Config) {
    let text = read_or_exit(input);
    let catalog = require_catalog(catalog, config);
    let linked = config.linker().link(&text, &catalog.approved_summaries());
    println!("{}", linked);
}

/// Run the `strip` command: remove label prefixes from raw markdown.
pub fn run_strip(input: Option<&Path>, extra_labels: &[String], config: &Config) {
    let text = read_or_exit(input);
    let mut config = config.clone();
    config.extend_labels(extra_labels);
    println!("{}", config.stripper().strip(&text));
}

/// Run the `catalog` command: list approved agents matching the filters.
pub fn run_catalog(catalog: Option<&Path>, filter: &CatalogFilter, json: bool, config: &Config) {
    let catalog = require_catalog(catalog, config);
    if catalog.is_empty() {
        log::warn!("Catalog has no usable entries");
    }
    let found = catalog.search(filter);
    if json {
        print_json(&found);
        return;
    }
    if found.is_empty() {
        println!("No agents found.");
        return;
    }

    let id_w = found.iter().map(|e| e.agent_id.len()).max().unwrap_or(10).max(10);
    let name_w = found.iter().map(|e| e.agent_name.len()).max().unwrap_or(24).max(24);

    println!("{:<id_w$}  {:<name_w$}  Route", "ID", "Name");
    println!("{}  {}  -----", "-".repeat(id_w), "-".repeat(name_w));
    let linker = config.linker();
    for e in &found {
        println!(
            "{:<id_w$}  {:<name_w$}  {}",
            e.agent_id,
            e.agent_name,
            linker.href(&e.agent_id)
        );
    }
    println!("\n{} agent(s) listed", found.len());
}

/// Run the `config` command: show config paths and the active label table.
pub fn run_config(config: &Config) {
    let labels_path = config
        .labels_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "-".to_string());
    let catalog = config
        .catalog_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| format!("not set ({})", CATALOG_ENV));

    println!("Version:      {} {}", app::NAME, app::VERSION);
    println!("Labels file:  {}", labels_path);
    println!("Catalog:      {}", catalog);
    println!("Route prefix: {}", config.route_prefix);
    println!("Labels:       {}", config.labels.join(", "));
    if let Some(warning) = &config.labels_warning {
        println!("Warning:      {}", warning);
    }
}
