//! Processing configuration
//!
//! Settings can be loaded from a JSON file. Any field left out keeps its default.

use crate::error::ComputeError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default workbook name suffix: `{subject}-{experiment}-{suffix}.xlsx`
pub const DEFAULT_WORKBOOK_SUFFIX: &str = "KPM-trial_stats";

/// Dataset names inside each trial group of the input file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetKeys {
    pub centroid: String,
    pub heading: String,
    pub latent_state: String,
    pub syllable: String,
}

impl Default for DatasetKeys {
    fn default() -> Self {
        Self {
            centroid: "centroid".to_string(),
            heading: "heading".to_string(),
            latent_state: "latent_state".to_string(),
            syllable: "syllable".to_string(),
        }
    }
}

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// One xlsx workbook per experiment, one sheet per trial
    Xlsx,
    /// Compact JSON report per experiment
    Json,
    /// Pretty-printed JSON report per experiment
    JsonPretty,
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    pub dataset_keys: DatasetKeys,
    pub workbook_suffix: String,
    /// Compute trials on the rayon pool when the `parallel` feature is enabled
    pub parallel: bool,
    pub output_format: OutputFormat,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            dataset_keys: DatasetKeys::default(),
            workbook_suffix: DEFAULT_WORKBOOK_SUFFIX.to_string(),
            parallel: false,
            output_format: OutputFormat::Xlsx,
        }
    }
}

impl StatsConfig {
    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        serde_json::from_str(json)
            .map_err(|e| ComputeError::ParseError(format!("Failed to parse config: {}", e)))
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ComputeError> {
        if !path.is_file() {
            return Err(ComputeError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String, ComputeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
