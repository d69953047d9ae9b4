//! JSON trial adapter
//!
//! Reads a JSON mirror of the MoSeq results layout: a top-level object of trial key
//! to an object of dataset name to array.

use crate::config::DatasetKeys;
use crate::error::ComputeError;
use crate::types::TrialRecord;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use super::{ensure_file, labels_from_raw, TrialSource};

/// JSON trial file adapter
pub struct JsonTrialSource;

impl JsonTrialSource {
    /// Parse trials from an in-memory JSON document
    pub fn parse(
        &self,
        json: &str,
        keys: &DatasetKeys,
    ) -> Result<BTreeMap<String, TrialRecord>, ComputeError> {
        let raw: BTreeMap<String, Map<String, Value>> = serde_json::from_str(json)
            .map_err(|e| ComputeError::ParseError(format!("Failed to parse trial file: {}", e)))?;

        let mut trials = BTreeMap::new();
        for (trial, datasets) in raw {
            let record = parse_trial(&trial, &datasets, keys)?;
            debug!(trial = %trial, frames = record.num_frames(), "loaded trial");
            trials.insert(trial, record);
        }

        Ok(trials)
    }
}

impl TrialSource for JsonTrialSource {
    fn load(
        &self,
        path: &Path,
        keys: &DatasetKeys,
    ) -> Result<BTreeMap<String, TrialRecord>, ComputeError> {
        ensure_file(path)?;
        debug!(path = %path.display(), "reading trial file");
        let content = std::fs::read_to_string(path)?;
        self.parse(&content, keys)
    }
}

fn parse_trial(
    trial: &str,
    datasets: &Map<String, Value>,
    keys: &DatasetKeys,
) -> Result<TrialRecord, ComputeError> {
    let raw_labels = datasets
        .get(&keys.syllable)
        .ok_or_else(|| ComputeError::MissingDataset {
            trial: trial.to_string(),
            dataset: keys.syllable.clone(),
        })?;
    let raw_labels: Vec<i64> = column(trial, &keys.syllable, raw_labels)?;

    let record = TrialRecord {
        syllable: labels_from_raw(trial, raw_labels)?,
        centroid: optional_column(trial, datasets, &keys.centroid)?,
        heading: optional_column(trial, datasets, &keys.heading)?,
        latent_state: optional_column(trial, datasets, &keys.latent_state)?,
    };
    record.validate(trial)?;

    Ok(record)
}

fn optional_column<T: DeserializeOwned>(
    trial: &str,
    datasets: &Map<String, Value>,
    name: &str,
) -> Result<Vec<T>, ComputeError> {
    match datasets.get(name) {
        Some(value) => column(trial, name, value),
        None => Ok(Vec::new()),
    }
}

fn column<T: DeserializeOwned>(
    trial: &str,
    name: &str,
    value: &Value,
) -> Result<Vec<T>, ComputeError> {
    Vec::<T>::deserialize(value).map_err(|e| {
        ComputeError::ParseError(format!("Trial {}: dataset '{}': {}", trial, name, e))
    })
}
