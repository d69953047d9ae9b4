//! Core types for the moseq-stats pipeline
//!
//! This module defines the data structures that flow through each stage:
//! loaded trial records, runs, per-syllable statistics and per-trial tables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ComputeError;

/// Discrete syllable id assigned to a frame upstream
pub type Syllable = u32;

/// A maximal contiguous block of frames sharing one syllable label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub label: Syllable,
    /// Number of frames in the run (always >= 1)
    pub length: usize,
}

/// One trial's loaded tracking columns, one row per frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    /// Animal position (x, y)
    #[serde(default)]
    pub centroid: Vec<[f64; 2]>,
    /// Heading angle (radians)
    #[serde(default)]
    pub heading: Vec<f64>,
    /// Latent pose state vector
    #[serde(default)]
    pub latent_state: Vec<Vec<f64>>,
    /// Syllable label per frame
    pub syllable: Vec<Syllable>,
}

impl TrialRecord {
    /// Build a record holding only the syllable column
    pub fn from_syllables(syllable: Vec<Syllable>) -> Self {
        Self {
            syllable,
            ..Self::default()
        }
    }

    /// Number of frames in the trial
    pub fn num_frames(&self) -> usize {
        self.syllable.len()
    }

    /// Check that every non-empty auxiliary column has one row per frame
    pub fn validate(&self, trial: &str) -> Result<(), ComputeError> {
        let expected = self.num_frames();
        let columns = [
            ("centroid", self.centroid.len()),
            ("heading", self.heading.len()),
            ("latent_state", self.latent_state.len()),
        ];

        for (column, actual) in columns {
            if actual != 0 && actual != expected {
                return Err(ComputeError::ColumnLength {
                    trial: trial.to_string(),
                    column: column.to_string(),
                    expected,
                    actual,
                });
            }
        }

        Ok(())
    }
}

/// Summary statistics for one syllable within one trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyllableStats {
    /// Number of runs of this syllable
    pub occurrences: usize,
    /// Run lengths in frames, in the order the runs occur
    pub occurrence_lengths: Vec<usize>,
    /// Median run length (frames)
    pub median_length: f64,
    /// Mean run length (frames)
    pub mean_length: f64,
    /// Median run length as a fraction of the trial's frames
    pub median_percentage: f64,
    /// Mean run length as a fraction of the trial's frames
    pub mean_percentage: f64,
}

/// Per-trial statistics table, ordered by ascending syllable label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialStats {
    /// Frames in the source trial
    pub total_frames: usize,
    pub syllables: BTreeMap<Syllable, SyllableStats>,
}

impl TrialStats {
    /// Number of rows (distinct syllables observed)
    pub fn len(&self) -> usize {
        self.syllables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.syllables.is_empty()
    }

    pub fn get(&self, label: Syllable) -> Option<&SyllableStats> {
        self.syllables.get(&label)
    }

    /// Rows in ascending label order
    pub fn rows(&self) -> impl Iterator<Item = (Syllable, &SyllableStats)> {
        self.syllables.iter().map(|(label, stats)| (*label, stats))
    }
}

/// Trials of one subject in one experiment, keyed by trial number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    pub subject: String,
    pub experiment: String,
    pub trials: BTreeMap<u32, TrialRecord>,
}

/// Statistics for a batch of trials
///
/// A trial appears in exactly one of `trials` or `failures`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentStats<K: Ord> {
    pub trials: BTreeMap<K, TrialStats>,
    /// Error message for every trial that could not be processed
    pub failures: BTreeMap<K, String>,
}

impl<K: Ord> Default for ExperimentStats<K> {
    fn default() -> Self {
        Self {
            trials: BTreeMap::new(),
            failures: BTreeMap::new(),
        }
    }
}

impl<K: Ord> ExperimentStats<K> {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Processed statistics for one experiment, ready for a report writer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentReport {
    pub subject: String,
    pub experiment: String,
    /// Input file the trials were read from
    pub source: Option<String>,
    pub stats: ExperimentStats<u32>,
}

/// Report producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Report provenance information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProvenance {
    pub source_file: Option<String>,
    pub computed_at_utc: String,
}

/// One row of a trial table as written to reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyllableRow {
    pub syllable: Syllable,
    #[serde(flatten)]
    pub stats: SyllableStats,
}

/// One trial in a report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportTrial {
    pub trial: u32,
    pub total_frames: usize,
    pub rows: Vec<SyllableRow>,
}

/// Report failure entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportFailure {
    pub trial: u32,
    pub error: String,
}

/// Complete JSON report payload for one experiment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsPayload {
    pub report_version: String,
    pub producer: ReportProducer,
    pub provenance: ReportProvenance,
    pub subject: String,
    pub experiment: String,
    pub trials: Vec<ReportTrial>,
    pub failures: Vec<ReportFailure>,
}
