//! moseq-stats - Syllable run-length statistics for MoSeq behavioral recordings
//!
//! Reads per-trial syllable label sequences from a MoSeq results file and computes
//! per-syllable statistics for each trial through a deterministic pipeline:
//! trial loading → name decoding → run extraction → statistics → report writing.
//!
//! ## Modules
//!
//! - **Engine**: [`runs`] splits a label sequence into runs, [`stats`] turns runs into
//!   per-syllable statistics tables
//! - **Plumbing**: [`adapters`] load trial files, [`trial_name`] decodes trial keys,
//!   [`workbook`] and [`encoder`] write reports

pub mod adapters;
pub mod config;
pub mod encoder;
pub mod error;
pub mod pipeline;
pub mod runs;
pub mod stats;
pub mod trial_name;
pub mod types;
pub mod workbook;

pub use config::{DatasetKeys, OutputFormat, StatsConfig};
pub use error::ComputeError;
pub use pipeline::{process_experiment, write_reports, ExperimentProcessor, WriteSummary};
pub use runs::{extract_runs, group_run_lengths};
pub use stats::compute_trial_stats;
pub use trial_name::TrialName;
pub use types::{
    Experiment, ExperimentReport, ExperimentStats, Run, Syllable, SyllableStats, TrialRecord,
    TrialStats,
};
pub use workbook::WorkbookWriter;

/// Crate version embedded in all reports
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "moseq-stats";
