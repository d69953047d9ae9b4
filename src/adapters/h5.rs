//! HDF5 trial adapter
//!
//! Reads MoSeq `results.h5` files: one group per trial, each holding `centroid`,
//! `heading`, `latent_state` and `syllable` datasets.

use crate::config::DatasetKeys;
use crate::error::ComputeError;
use crate::types::TrialRecord;
use hdf5::{File, Group};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use super::{ensure_file, labels_from_raw, TrialSource};

/// HDF5 trial file adapter
pub struct Hdf5TrialSource;

impl TrialSource for Hdf5TrialSource {
    fn load(
        &self,
        path: &Path,
        keys: &DatasetKeys,
    ) -> Result<BTreeMap<String, TrialRecord>, ComputeError> {
        ensure_file(path)?;
        debug!(path = %path.display(), "reading trial file");

        let file = File::open(path)?;
        let mut trials = BTreeMap::new();

        for trial in file.member_names()? {
            let group = file.group(&trial)?;
            let record = read_trial(&trial, &group, keys)?;
            debug!(trial = %trial, frames = record.num_frames(), "loaded trial");
            trials.insert(trial, record);
        }

        Ok(trials)
    }
}

fn read_trial(trial: &str, group: &Group, keys: &DatasetKeys) -> Result<TrialRecord, ComputeError> {
    if !group.link_exists(&keys.syllable) {
        return Err(ComputeError::MissingDataset {
            trial: trial.to_string(),
            dataset: keys.syllable.clone(),
        });
    }
    let raw_labels: Vec<i64> = group.dataset(&keys.syllable)?.read_raw()?;

    let centroid = read_rows(group, &keys.centroid)?
        .into_iter()
        .map(|row| match row.as_slice() {
            [x, y, ..] => Ok([*x, *y]),
            _ => Err(ComputeError::ParseError(format!(
                "Trial {}: dataset '{}' rows must have two columns",
                trial, keys.centroid
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let heading = if group.link_exists(&keys.heading) {
        group.dataset(&keys.heading)?.read_raw::<f64>()?
    } else {
        Vec::new()
    };

    let record = TrialRecord {
        syllable: labels_from_raw(trial, raw_labels)?,
        centroid,
        heading,
        latent_state: read_rows(group, &keys.latent_state)?,
    };
    record.validate(trial)?;

    Ok(record)
}

/// Read a 2-D dataset as one vector per frame; absent datasets read as empty
fn read_rows(group: &Group, name: &str) -> Result<Vec<Vec<f64>>, ComputeError> {
    if !group.link_exists(name) {
        return Ok(Vec::new());
    }

    let dataset = group.dataset(name)?;
    let shape = dataset.shape();
    let values: Vec<f64> = dataset.read_raw()?;
    let width = shape.iter().skip(1).product::<usize>().max(1);

    Ok(values.chunks(width).map(<[f64]>::to_vec).collect())
}
