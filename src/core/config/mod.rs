//! Configuration: environment, `.env`, and the optional `labels.json` in the config directory.

mod validation;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::paths;
use crate::normalize::labels::{DEFAULT_LABELS, LabelStripper};
use crate::normalize::mentions::{DEFAULT_ROUTE_PREFIX, MentionLinker};

pub const CATALOG_ENV: &str = "AGENT_STORE_CATALOG";
pub const ROUTE_PREFIX_ENV: &str = "AGENT_STORE_ROUTE_PREFIX";
pub const LABELS_ENV: &str = "AGENT_STORE_LABELS";

const LABELS_FILE: &str = "labels.json";

/// Error loading the label file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read labels file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

impl ConfigError {
    fn detail(&self) -> String {
        match self {
            ConfigError::Io(_) => "could not read file".to_string(),
            ConfigError::Json(_) => "invalid JSON".to_string(),
            ConfigError::Validation(msg) => msg.clone(),
        }
    }

    /// User-facing message when falling back to the built-in label table.
    pub fn safe_mode_message(&self) -> String {
        format!("labels.json: {}; using built-in labels only", self.detail())
    }
}

/// Resolved runtime configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Active label table in load order (built-ins, file, environment).
    pub labels: Vec<String>,
    pub route_prefix: String,
    pub catalog_path: Option<PathBuf>,
    /// Where `labels.json` is looked up, when a config directory exists.
    pub labels_path: Option<PathBuf>,
    /// Set when `labels.json` was rejected and the built-ins were used instead.
    pub labels_warning: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            labels: DEFAULT_LABELS.iter().map(|l| l.to_string()).collect(),
            route_prefix: DEFAULT_ROUTE_PREFIX.to_string(),
            catalog_path: None,
            labels_path: None,
            labels_warning: None,
        }
    }
}

impl Config {
    /// Label stripper for the active table.
    pub fn stripper(&self) -> LabelStripper {
        LabelStripper::new(&self.labels)
    }

    pub fn linker(&self) -> MentionLinker {
        MentionLinker::new(self.route_prefix.as_str())
    }

    /// Add labels on top of the active table, skipping invalid and duplicate ones.
    pub fn extend_labels<I, S>(&mut self, extra: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for raw in extra {
            match validation::validate_label(raw.as_ref()) {
                Ok(label) => {
                    if !self.labels.iter().any(|l| l.eq_ignore_ascii_case(&label)) {
                        self.labels.push(label);
                    }
                }
                Err(e) => log::warn!("Ignoring label {:?}: {}", raw.as_ref(), e),
            }
        }
    }
}

/// Load configuration from the process environment and the platform config directory.
pub fn load() -> Config {
    load_from(|key| env::var(key).ok(), paths::config_dir().as_deref())
}

/// Load configuration from `lookup` (environment) and `config_dir`. Never fails: a bad
/// `labels.json` falls back to the built-in table and records a warning.
pub fn load_from(lookup: impl Fn(&str) -> Option<String>, config_dir: Option<&Path>) -> Config {
    let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let mut config = Config {
        route_prefix: var(ROUTE_PREFIX_ENV).unwrap_or_else(|| DEFAULT_ROUTE_PREFIX.to_string()),
        catalog_path: var(CATALOG_ENV).map(PathBuf::from),
        labels_path: config_dir.map(|d| d.join(LABELS_FILE)),
        ..Default::default()
    };

    if let Some(path) = &config.labels_path {
        match load_labels_file(path) {
            Ok(Some((labels, replace_defaults))) => {
                log::info!("Loaded {} labels from {}", labels.len(), path.display());
                if replace_defaults {
                    config.labels.clear();
                }
                config.extend_labels(labels);
            }
            Ok(None) => {}
            Err(e) => {
                let msg = e.safe_mode_message();
                log::warn!("{}", msg);
                config.labels_warning = Some(msg);
            }
        }
    }

    if let Some(extra) = var(LABELS_ENV) {
        config.extend_labels(extra.split(','));
    }
    config
}

/// Read and validate `labels.json`. `Ok(None)` when the file is absent.
fn load_labels_file(path: &Path) -> Result<Option<(Vec<String>, bool)>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let file: validation::LabelsFile = serde_json::from_str(&content)?;
    let labels = validation::validate_labels(&file)?;
    Ok(Some((labels, file.replace_defaults)))
}
