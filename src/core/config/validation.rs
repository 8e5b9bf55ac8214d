//! Label file validation: disk format and conversion to the active label list.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// JSON structure on disk.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct LabelsFile {
    pub(super) labels: Vec<String>,
    /// Use only the file's labels instead of extending the built-in table.
    #[serde(default)]
    pub(super) replace_defaults: bool,
}

/// Check one label: letters, digits, spaces, hyphens, ampersands and slashes.
pub(crate) fn validate_label(label: &str) -> Result<String, ConfigError> {
    let label = label.trim();
    if label.is_empty() {
        return Err(ConfigError::Validation("label cannot be empty".to_string()));
    }
    if !label
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '&' | '/'))
    {
        return Err(ConfigError::Validation(format!(
            "label '{}' must contain only letters, numbers, spaces, hyphens, '&' and '/'",
            label
        )));
    }
    Ok(label.to_string())
}

/// Validate file entries. Duplicates (case-insensitive) are rejected.
pub(crate) fn validate_labels(file: &LabelsFile) -> Result<Vec<String>, ConfigError> {
    if file.labels.is_empty() {
        return Err(ConfigError::Validation("labels list cannot be empty".to_string()));
    }
    let mut seen = HashSet::new();
    let mut result = Vec::with_capacity(file.labels.len());
    for (i, raw) in file.labels.iter().enumerate() {
        let label = validate_label(raw)
            .map_err(|e| ConfigError::Validation(format!("label at index {}: {}", i, e.detail())))?;
        if !seen.insert(label.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "Duplicate label '{}'",
                label
            )));
        }
        result.push(label);
    }
    Ok(result)
}
