//! Error types for moseq-stats

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading trials, computing statistics or writing reports
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Failed to parse trial name: {0}")]
    TrialNameParse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Trial {trial}: dataset '{dataset}' is missing")]
    MissingDataset { trial: String, dataset: String },

    #[error("Trial {trial}: column '{column}' has {actual} rows, expected {expected}")]
    ColumnLength {
        trial: String,
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Trial {trial}: syllable label {value} is not a valid non-negative id")]
    InvalidLabel { trial: String, value: i64 },

    #[error("Duplicate trial {trial} for {subject}-{experiment}")]
    DuplicateTrial {
        subject: String,
        experiment: String,
        trial: u32,
    },

    #[error("Save directory does not exist: {}", .0.display())]
    OutputDirNotFound(PathBuf),

    #[error("Failed to parse input file: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    #[cfg(feature = "hdf5")]
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),
}
