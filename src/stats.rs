//! Syllable statistics
//!
//! Computes per-syllable occurrence counts, run-length distributions and
//! durations normalized by trial length.

use crate::error::ComputeError;
use crate::runs::group_run_lengths;
use crate::types::{Syllable, SyllableStats, TrialStats};
use std::collections::BTreeMap;
use tracing::debug;

impl SyllableStats {
    /// Compute statistics from one syllable's run lengths.
    ///
    /// `occurrence_lengths` is kept in the order given. Fails when `total_frames`
    /// is zero or no runs are supplied, since both would produce NaN.
    pub fn compute(
        occurrence_lengths: Vec<usize>,
        total_frames: usize,
    ) -> Result<Self, ComputeError> {
        if total_frames == 0 {
            return Err(ComputeError::InvalidInput(
                "trial has zero frames; percentages are undefined".to_string(),
            ));
        }
        if occurrence_lengths.is_empty() {
            return Err(ComputeError::InvalidInput(
                "syllable has no runs".to_string(),
            ));
        }

        let median_length = median(&occurrence_lengths);
        let mean_length = mean(&occurrence_lengths);
        let frames = total_frames as f64;

        Ok(Self {
            occurrences: occurrence_lengths.len(),
            median_percentage: median_length / frames,
            mean_percentage: mean_length / frames,
            median_length,
            mean_length,
            occurrence_lengths,
        })
    }
}

/// Build the statistics table for one trial's label sequence.
///
/// Rows are keyed by syllable and iterate in ascending label order. Labels that
/// never occur are absent. An empty sequence is rejected.
pub fn compute_trial_stats(labels: &[Syllable]) -> Result<TrialStats, ComputeError> {
    let total_frames = labels.len();
    if total_frames == 0 {
        return Err(ComputeError::InvalidInput(
            "trial contains no frames".to_string(),
        ));
    }

    let mut syllables = BTreeMap::new();
    for (label, lengths) in group_run_lengths(labels) {
        syllables.insert(label, SyllableStats::compute(lengths, total_frames)?);
    }

    debug!(
        frames = total_frames,
        syllables = syllables.len(),
        "computed trial statistics"
    );

    Ok(TrialStats {
        total_frames,
        syllables,
    })
}

/// Midpoint of the sorted values; mean of the two middle values for even counts
fn median(values: &[usize]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) as f64 / 2.0
    } else {
        sorted[mid] as f64
    }
}

fn mean(values: &[usize]) -> f64 {
    values.iter().sum::<usize>() as f64 / values.len() as f64
}
