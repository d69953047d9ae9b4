//! Trial file adapters
//!
//! This module provides adapters that read a per-trial dataset file and map each
//! top-level trial entry to a [`TrialRecord`].

mod json;
#[cfg(feature = "hdf5")]
mod h5;

#[cfg(feature = "hdf5")]
pub use h5::Hdf5TrialSource;
pub use json::JsonTrialSource;

use crate::config::DatasetKeys;
use crate::error::ComputeError;
use crate::types::{Syllable, TrialRecord};
use std::collections::BTreeMap;
use std::path::Path;

/// Trait for trial file adapters
pub trait TrialSource {
    /// Read every trial in the file, keyed by its raw trial key
    fn load(
        &self,
        path: &Path,
        keys: &DatasetKeys,
    ) -> Result<BTreeMap<String, TrialRecord>, ComputeError>;
}

/// Pick an adapter from the file extension.
///
/// A missing file is reported as `FileNotFound` before the extension is looked at.
pub fn source_for_path(path: &Path) -> Result<Box<dyn TrialSource>, ComputeError> {
    ensure_file(path)?;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "json" => Ok(Box::new(JsonTrialSource)),
        #[cfg(feature = "hdf5")]
        "h5" | "hdf5" => Ok(Box::new(Hdf5TrialSource)),
        #[cfg(not(feature = "hdf5"))]
        "h5" | "hdf5" => Err(ComputeError::ParseError(format!(
            "{}: HDF5 input requires the `hdf5` feature",
            path.display()
        ))),
        other => Err(ComputeError::ParseError(format!(
            "{}: unsupported input extension '{}'",
            path.display(),
            other
        ))),
    }
}

/// Fail with `FileNotFound` unless `path` is an existing regular file
pub(crate) fn ensure_file(path: &Path) -> Result<(), ComputeError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ComputeError::FileNotFound(path.to_path_buf()))
    }
}

/// Convert raw integer labels to syllable ids, rejecting negative values
pub(crate) fn labels_from_raw(trial: &str, raw: Vec<i64>) -> Result<Vec<Syllable>, ComputeError> {
    raw.into_iter()
        .map(|value| {
            Syllable::try_from(value).map_err(|_| ComputeError::InvalidLabel {
                trial: trial.to_string(),
                value,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_from_raw() {
        assert_eq!(labels_from_raw("t", vec![0, 3, 99]).unwrap(), vec![0, 3, 99]);
    }

    #[test]
    fn test_negative_label_rejected() {
        let err = labels_from_raw("t", vec![1, -1]).unwrap_err();
        assert!(matches!(err, ComputeError::InvalidLabel { value: -1, .. }));
    }

    fn touch(dir: &tempfile::TempDir, name: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, "{}").unwrap();
        path
    }

    #[test]
    fn test_source_for_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();

        let err = source_for_path(&touch(&dir, "trials.csv")).err().unwrap();
        assert!(matches!(err, ComputeError::ParseError(_)));
        assert!(source_for_path(&touch(&dir, "trials.JSON")).is_ok());
    }

    #[test]
    fn test_missing_file_is_not_found_for_any_extension() {
        for name in ["results.h5", "results.hdf5", "results.csv", "results.json"] {
            let err = source_for_path(Path::new("/nonexistent").join(name).as_path())
                .err()
                .unwrap();
            assert!(matches!(err, ComputeError::FileNotFound(_)), "{name}: {err}");
        }
    }

    #[cfg(not(feature = "hdf5"))]
    #[test]
    fn test_hdf5_requires_feature() {
        let dir = tempfile::tempdir().unwrap();

        let err = source_for_path(&touch(&dir, "results.h5")).err().unwrap();
        assert!(err.to_string().contains("hdf5"));
    }
}
