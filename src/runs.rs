//! Run extraction
//!
//! Segments a per-frame syllable sequence into maximal runs of identical labels.
//! Grouping only looks at equality of adjacent frames, never at label ordering.

use crate::types::{Run, Syllable};
use std::collections::BTreeMap;

/// Split a label sequence into its runs, in sequence order.
///
/// Run lengths sum to `labels.len()` and adjacent runs never share a label.
pub fn extract_runs(labels: &[Syllable]) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut iter = labels.iter().copied();

    let Some(first) = iter.next() else {
        return runs;
    };

    let mut current = first;
    let mut length = 1usize;

    for label in iter {
        if label == current {
            length += 1;
        } else {
            runs.push(Run {
                label: current,
                length,
            });
            current = label;
            length = 1;
        }
    }

    runs.push(Run {
        label: current,
        length,
    });
    runs
}

/// Map each distinct label to the lengths of its runs, first occurrence first
pub fn group_run_lengths(labels: &[Syllable]) -> BTreeMap<Syllable, Vec<usize>> {
    let mut groups: BTreeMap<Syllable, Vec<usize>> = BTreeMap::new();

    for run in extract_runs(labels) {
        groups.entry(run.label).or_default().push(run.length);
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_sequence() {
        assert!(extract_runs(&[]).is_empty());
        assert!(group_run_lengths(&[]).is_empty());
    }

    #[test]
    fn test_single_frame() {
        assert_eq!(extract_runs(&[7]), vec![Run { label: 7, length: 1 }]);
    }

    #[test]
    fn test_constant_sequence() {
        let labels = vec![4; 25];
        let groups = group_run_lengths(&labels);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[&4], vec![25]);
    }

    #[test]
    fn test_order_preservation() {
        let groups = group_run_lengths(&[1, 1, 2, 2, 2, 1, 1, 1]);

        assert_eq!(groups[&1], vec![2, 3]);
        assert_eq!(groups[&2], vec![3]);
    }

    #[test]
    fn test_runs_partition_sequence() {
        let labels = [0, 0, 5, 5, 5, 0, 3, 3, 0, 0, 0, 0];
        let runs = extract_runs(&labels);

        assert_eq!(
            runs,
            vec![
                Run { label: 0, length: 2 },
                Run { label: 5, length: 3 },
                Run { label: 0, length: 1 },
                Run { label: 3, length: 2 },
                Run { label: 0, length: 4 },
            ]
        );
        assert_eq!(runs.iter().map(|r| r.length).sum::<usize>(), labels.len());
        assert!(runs.windows(2).all(|pair| pair[0].label != pair[1].label));
    }

    #[test]
    fn test_alternating_labels() {
        let groups = group_run_lengths(&[9, 2, 9, 2, 9]);

        assert_eq!(groups[&9], vec![1, 1, 1]);
        assert_eq!(groups[&2], vec![1, 1]);
    }

    #[test]
    fn test_grouping_ignores_numeric_order() {
        // Descending and ascending label values group identically
        let descending = extract_runs(&[10, 10, 3, 3, 3]);
        let ascending = extract_runs(&[3, 3, 10, 10, 10]);

        assert_eq!(descending.len(), 2);
        assert_eq!(ascending.len(), 2);
        assert_eq!(descending[0].length, 2);
        assert_eq!(ascending[1].length, 3);
    }
}
