//! Property-based tests for run extraction and syllable statistics
//!
//! - Runs partition the label sequence
//! - Statistics are finite, ordered and consistent with the runs
//! - Parallel and sequential batch processing agree

use moseq_stats::{
    compute_trial_stats, extract_runs, group_run_lengths, ExperimentProcessor, StatsConfig,
    Syllable,
};
use proptest::prelude::*;
use std::collections::BTreeMap;

// ============================================================================
// Strategies
// ============================================================================

/// Label sequences with a small alphabet so runs are common
fn arb_labels(max_len: usize) -> impl Strategy<Value = Vec<Syllable>> {
    proptest::collection::vec(0u32..6, 0..max_len)
}

/// Explicit (label, length) blocks; neighbours may repeat a label
fn arb_blocks() -> impl Strategy<Value = Vec<(Syllable, usize)>> {
    proptest::collection::vec((0u32..50, 1usize..20), 1..30)
}

/// Count maximal blocks of `label` by direct comparison with the previous frame
fn count_blocks(labels: &[Syllable], label: Syllable) -> usize {
    labels
        .iter()
        .enumerate()
        .filter(|(i, l)| **l == label && (*i == 0 || labels[*i - 1] != label))
        .count()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: run lengths sum to the sequence length
    #[test]
    fn prop_runs_partition_sequence(labels in arb_labels(200)) {
        let total: usize = group_run_lengths(&labels).values().flatten().sum();
        prop_assert_eq!(total, labels.len());
    }

    /// Property: every run is non-empty and adjacent runs differ
    #[test]
    fn prop_runs_are_maximal(labels in arb_labels(200)) {
        let runs = extract_runs(&labels);

        prop_assert!(runs.iter().all(|r| r.length >= 1));
        prop_assert!(runs.windows(2).all(|pair| pair[0].label != pair[1].label));
    }

    /// Property: runs expand back to the original sequence
    #[test]
    fn prop_runs_reconstruct_sequence(labels in arb_labels(200)) {
        let rebuilt: Vec<Syllable> = extract_runs(&labels)
            .iter()
            .flat_map(|r| std::iter::repeat(r.label).take(r.length))
            .collect();
        prop_assert_eq!(rebuilt, labels);
    }

    /// Property: occurrences equal the number of maximal blocks of each label
    #[test]
    fn prop_run_count_matches_blocks(labels in arb_labels(200)) {
        for (label, lengths) in group_run_lengths(&labels) {
            prop_assert_eq!(lengths.len(), count_blocks(&labels, label));
        }
    }

    /// Property: explicit blocks come back in order, after merging equal neighbours
    #[test]
    fn prop_block_order_preserved(blocks in arb_blocks()) {
        let mut merged: Vec<(Syllable, usize)> = Vec::new();
        for (label, len) in blocks {
            if let Some((last, total)) = merged.last_mut() {
                if *last == label {
                    *total += len;
                    continue;
                }
            }
            merged.push((label, len));
        }

        let labels: Vec<Syllable> = merged
            .iter()
            .flat_map(|(label, len)| std::iter::repeat(*label).take(*len))
            .collect();

        let mut expected: BTreeMap<Syllable, Vec<usize>> = BTreeMap::new();
        for (label, len) in &merged {
            expected.entry(*label).or_default().push(*len);
        }

        prop_assert_eq!(group_run_lengths(&labels), expected);
    }

    /// Property: one row per distinct label, ascending, with finite values
    #[test]
    fn prop_trial_stats_rows(labels in arb_labels(200).prop_filter("non-empty", |l| !l.is_empty())) {
        let stats = compute_trial_stats(&labels).unwrap();

        let mut distinct = labels.clone();
        distinct.sort_unstable();
        distinct.dedup();
        let rows: Vec<Syllable> = stats.rows().map(|(label, _)| label).collect();
        prop_assert_eq!(rows, distinct);

        for (_, row) in stats.rows() {
            let min = *row.occurrence_lengths.iter().min().unwrap() as f64;
            let max = *row.occurrence_lengths.iter().max().unwrap() as f64;

            prop_assert_eq!(row.occurrences, row.occurrence_lengths.len());
            prop_assert!(row.median_length >= min && row.median_length <= max);
            prop_assert!(row.mean_length >= min && row.mean_length <= max);
            prop_assert!(row.median_percentage > 0.0 && row.median_percentage <= 1.0);
            prop_assert!(row.mean_percentage > 0.0 && row.mean_percentage <= 1.0);
            prop_assert!((row.mean_percentage * labels.len() as f64 - row.mean_length).abs() < 1e-9);
        }
    }

    /// Property: batch results do not depend on execution strategy
    #[test]
    fn prop_parallel_matches_sequential(
        trials in proptest::collection::btree_map(0u32..40, arb_labels(60), 0..12)
    ) {
        let sequential = ExperimentProcessor::default().process_trials(&trials);
        let parallel = ExperimentProcessor::new(StatsConfig {
            parallel: true,
            ..StatsConfig::default()
        })
        .process_trials(&trials);

        prop_assert_eq!(&sequential, &parallel);
        prop_assert_eq!(sequential.trials.len() + sequential.failures.len(), trials.len());
    }
}
