//! Pipeline orchestration
//!
//! This module provides the public API for moseq-stats. It loads a trial file,
//! groups trials into experiments by their decoded names, and computes a
//! statistics table for every trial.
//!
//! Trials are independent. A trial that cannot be processed is recorded in
//! [`ExperimentStats::failures`] and the rest of the batch continues. The same
//! holds when reports are written: [`write_reports`] skips an experiment with no
//! successful trial and writes the others.

use crate::adapters::source_for_path;
use crate::config::{OutputFormat, StatsConfig};
use crate::encoder::StatsEncoder;
use crate::error::ComputeError;
use crate::stats::compute_trial_stats;
use crate::trial_name::TrialName;
use crate::types::{
    Experiment, ExperimentReport, ExperimentStats, Syllable, TrialRecord, TrialStats,
};
use crate::workbook::WorkbookWriter;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Compute statistics for a batch of label sequences (stateless, sequential).
///
/// # Example
/// ```
/// use std::collections::BTreeMap;
///
/// let mut trials = BTreeMap::new();
/// trials.insert(1u32, vec![1u32, 1, 2, 2, 2, 1, 1, 1]);
/// trials.insert(2u32, Vec::<u32>::new());
///
/// let stats = moseq_stats::process_experiment(&trials);
/// assert_eq!(stats.trials[&1].get(1).unwrap().occurrence_lengths, vec![2, 3]);
/// assert!(stats.failures.contains_key(&2));
/// ```
pub fn process_experiment<K, L>(trials: &BTreeMap<K, L>) -> ExperimentStats<K>
where
    K: Ord + Clone + fmt::Display + Send + Sync,
    L: AsRef<[Syllable]> + Sync,
{
    ExperimentProcessor::default().process_trials(trials)
}

/// Processor carrying configuration across loading, grouping and computation
#[derive(Debug, Clone, Default)]
pub struct ExperimentProcessor {
    config: StatsConfig,
}

impl ExperimentProcessor {
    pub fn new(config: StatsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    /// Read every trial from `path`, keyed by raw trial key
    pub fn load_trials(&self, path: &Path) -> Result<BTreeMap<String, TrialRecord>, ComputeError> {
        let source = source_for_path(path)?;
        let trials = source.load(path, &self.config.dataset_keys)?;
        info!(path = %path.display(), trials = trials.len(), "loaded trial file");
        Ok(trials)
    }

    /// Group raw trials into experiments by decoded subject and experiment name.
    ///
    /// Fails on the first key that cannot be decoded, or when two keys decode to the
    /// same trial number within one experiment.
    pub fn group_experiments(
        &self,
        trials: BTreeMap<String, TrialRecord>,
    ) -> Result<Vec<Experiment>, ComputeError> {
        let mut grouped: BTreeMap<(String, String), BTreeMap<u32, TrialRecord>> =
            BTreeMap::new();

        for (key, record) in trials {
            let name = TrialName::parse(&key)?;
            let entry = grouped.entry(name.experiment_key()).or_default();

            if entry.insert(name.trial_number, record).is_some() {
                return Err(ComputeError::DuplicateTrial {
                    subject: name.subject,
                    experiment: name.experiment,
                    trial: name.trial_number,
                });
            }
        }

        Ok(grouped
            .into_iter()
            .map(|((subject, experiment), trials)| Experiment {
                subject,
                experiment,
                trials,
            })
            .collect())
    }

    /// Compute a statistics table for each trial independently
    pub fn process_trials<K, L>(&self, trials: &BTreeMap<K, L>) -> ExperimentStats<K>
    where
        K: Ord + Clone + fmt::Display + Send + Sync,
        L: AsRef<[Syllable]> + Sync,
    {
        let results = self.compute_all(trials);
        let mut stats = ExperimentStats::default();

        for (key, result) in results {
            match result {
                Ok(table) => {
                    stats.trials.insert(key, table);
                }
                Err(message) => {
                    warn!(trial = %key, error = %message, "skipping trial");
                    stats.failures.insert(key, message);
                }
            }
        }

        info!(
            processed = stats.trials.len(),
            failed = stats.failures.len(),
            "processed trials"
        );
        stats
    }

    /// Compute statistics for every trial of a decoded experiment
    pub fn process_experiment(&self, experiment: &Experiment) -> ExperimentStats<u32> {
        debug!(
            subject = %experiment.subject,
            experiment = %experiment.experiment,
            trials = experiment.trials.len(),
            "processing experiment"
        );

        let labels: BTreeMap<u32, &[Syllable]> = experiment
            .trials
            .iter()
            .map(|(number, record)| (*number, record.syllable.as_slice()))
            .collect();

        self.process_trials(&labels)
    }

    /// Load a trial file and produce one report per experiment it contains
    pub fn process_file(&self, path: &Path) -> Result<Vec<ExperimentReport>, ComputeError> {
        let trials = self.load_trials(path)?;
        let experiments = self.group_experiments(trials)?;
        let source = Some(path.display().to_string());

        Ok(experiments
            .iter()
            .map(|experiment| ExperimentReport {
                subject: experiment.subject.clone(),
                experiment: experiment.experiment.clone(),
                source: source.clone(),
                stats: self.process_experiment(experiment),
            })
            .collect())
    }

    fn compute_all<K, L>(&self, trials: &BTreeMap<K, L>) -> Vec<(K, Result<TrialStats, String>)>
    where
        K: Ord + Clone + Send + Sync,
        L: AsRef<[Syllable]> + Sync,
    {
        #[cfg(feature = "parallel")]
        {
            if self.config.parallel {
                use rayon::prelude::*;

                return trials
                    .par_iter()
                    .map(|(key, labels)| (key.clone(), compute_one(labels.as_ref())))
                    .collect();
            }
        }

        trials
            .iter()
            .map(|(key, labels)| (key.clone(), compute_one(labels.as_ref())))
            .collect()
    }
}

/// Outcome of [`write_reports`]
#[derive(Debug, Default)]
pub struct WriteSummary {
    /// Report files in the order they were written
    pub written: Vec<PathBuf>,
    /// `(subject, experiment)` pairs with no successful trial
    pub skipped: Vec<(String, String)>,
    pub failed_trials: usize,
}

/// Write one report per experiment in the configured format.
///
/// An experiment without a single successful trial is skipped with a warning and
/// the remaining experiments are still written. Only a missing output directory or
/// a write error stops the batch.
pub fn write_reports(
    reports: &[ExperimentReport],
    output_dir: &Path,
    config: &StatsConfig,
) -> Result<WriteSummary, ComputeError> {
    if !output_dir.is_dir() {
        return Err(ComputeError::OutputDirNotFound(output_dir.to_path_buf()));
    }

    let encoder = StatsEncoder::new();
    let writer = WorkbookWriter::new(&config.workbook_suffix);
    let mut summary = WriteSummary::default();

    for report in reports {
        summary.failed_trials += report.stats.failures.len();

        if report.stats.trials.is_empty() {
            warn!(
                subject = %report.subject,
                experiment = %report.experiment,
                failed = report.stats.failures.len(),
                "no trial statistics, skipping report"
            );
            summary
                .skipped
                .push((report.subject.clone(), report.experiment.clone()));
            continue;
        }

        let suffix = &config.workbook_suffix;
        let path = match config.output_format {
            OutputFormat::Xlsx => writer.write(report, output_dir)?,
            OutputFormat::Json => encoder.write(report, output_dir, suffix, false)?,
            OutputFormat::JsonPretty => encoder.write(report, output_dir, suffix, true)?,
        };
        summary.written.push(path);
    }

    info!(
        written = summary.written.len(),
        skipped = summary.skipped.len(),
        failed_trials = summary.failed_trials,
        "wrote reports"
    );
    Ok(summary)
}

fn compute_one(labels: &[Syllable]) -> Result<TrialStats, String> {
    compute_trial_stats(labels).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(labels: &[Syllable]) -> TrialRecord {
        TrialRecord::from_syllables(labels.to_vec())
    }

    fn sample_raw_trials() -> BTreeMap<String, TrialRecord> {
        let mut trials = BTreeMap::new();
        trials.insert("ANM1-odor-trial-2DLC_model".to_string(), record(&[3, 3, 1]));
        trials.insert("ANM1-odor-trial-1DLC_model".to_string(), record(&[0, 0, 0]));
        trials.insert("ANM2-odor-trial-1DLC_model".to_string(), record(&[5, 6]));
        trials
    }

    #[test]
    fn test_group_experiments_by_subject() {
        let processor = ExperimentProcessor::default();
        let experiments = processor.group_experiments(sample_raw_trials()).unwrap();

        assert_eq!(experiments.len(), 2);
        assert_eq!(experiments[0].subject, "ANM1");
        assert_eq!(experiments[0].experiment, "odor");
        assert_eq!(experiments[0].trials.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(experiments[1].subject, "ANM2");
    }

    #[test]
    fn test_group_experiments_rejects_bad_name() {
        let mut trials = sample_raw_trials();
        trials.insert("garbage".to_string(), record(&[1]));

        let result = ExperimentProcessor::default().group_experiments(trials);
        assert!(matches!(result, Err(ComputeError::TrialNameParse(_))));
    }

    #[test]
    fn test_group_experiments_rejects_duplicate_trial() {
        let mut trials = BTreeMap::new();
        trials.insert("A-b-trial-1DLC_x".to_string(), record(&[1]));
        trials.insert("A-b-trial-1DLC_y".to_string(), record(&[2]));

        let result = ExperimentProcessor::default().group_experiments(trials);
        assert!(matches!(
            result,
            Err(ComputeError::DuplicateTrial { trial: 1, .. })
        ));
    }

    #[test]
    fn test_empty_trial_recorded_as_failure() {
        let mut trials: BTreeMap<&str, Vec<Syllable>> = BTreeMap::new();
        trials.insert("good", vec![1, 1, 2]);
        trials.insert("empty", Vec::new());
        trials.insert("also-good", vec![4]);

        let stats = process_experiment(&trials);

        assert_eq!(stats.trials.len(), 2);
        assert!(stats.trials.contains_key("good"));
        assert!(stats.trials.contains_key("also-good"));
        assert_eq!(stats.failures.len(), 1);
        assert!(stats.failures["empty"].contains("no frames"));
        assert!(stats.has_failures());
    }

    #[test]
    fn test_process_experiment_keys_by_trial_number() {
        let processor = ExperimentProcessor::default();
        let experiments = processor.group_experiments(sample_raw_trials()).unwrap();
        let stats = processor.process_experiment(&experiments[0]);

        assert_eq!(stats.trials.len(), 2);
        assert_eq!(stats.trials[&1].get(0).unwrap().occurrence_lengths, vec![3]);
        assert_eq!(stats.trials[&2].get(3).unwrap().occurrence_lengths, vec![2]);
        assert!(!stats.has_failures());
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let mut trials: BTreeMap<u32, Vec<Syllable>> = BTreeMap::new();
        for n in 0..32u32 {
            let labels = (0..(n * 7 + 3)).map(|i| (i / (n % 4 + 1)) % 5).collect();
            trials.insert(n, labels);
        }
        trials.insert(99, Vec::new());

        let sequential = ExperimentProcessor::default().process_trials(&trials);
        let parallel = ExperimentProcessor::new(StatsConfig {
            parallel: true,
            ..StatsConfig::default()
        })
        .process_trials(&trials);

        assert_eq!(sequential, parallel);
        assert_eq!(parallel.failures.len(), 1);
    }
}
