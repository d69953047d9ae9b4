//! JSON report encoder
//!
//! Encodes experiment statistics into a JSON report with producer and provenance
//! metadata.

use crate::error::ComputeError;
use crate::types::{
    ExperimentReport, ReportFailure, ReportProducer, ReportProvenance, ReportTrial, StatsPayload,
    SyllableRow,
};
use crate::{PRODUCER_NAME, VERSION};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// JSON report encoder
pub struct StatsEncoder {
    instance_id: String,
}

impl Default for StatsEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Encode an experiment report into a payload
    pub fn encode(&self, report: &ExperimentReport) -> StatsPayload {
        let producer = ReportProducer {
            name: PRODUCER_NAME.to_string(),
            version: VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let provenance = ReportProvenance {
            source_file: report.source.clone(),
            computed_at_utc: Utc::now().to_rfc3339(),
        };

        let trials = report
            .stats
            .trials
            .iter()
            .map(|(trial, table)| ReportTrial {
                trial: *trial,
                total_frames: table.total_frames,
                rows: table
                    .rows()
                    .map(|(syllable, stats)| SyllableRow {
                        syllable,
                        stats: stats.clone(),
                    })
                    .collect(),
            })
            .collect();

        let failures = report
            .stats
            .failures
            .iter()
            .map(|(trial, error)| ReportFailure {
                trial: *trial,
                error: error.clone(),
            })
            .collect();

        StatsPayload {
            report_version: REPORT_VERSION.to_string(),
            producer,
            provenance,
            subject: report.subject.clone(),
            experiment: report.experiment.clone(),
            trials,
            failures,
        }
    }

    /// Encode to a JSON string
    pub fn encode_to_json(
        &self,
        report: &ExperimentReport,
        pretty: bool,
    ) -> Result<String, ComputeError> {
        let payload = self.encode(report);
        let json = if pretty {
            serde_json::to_string_pretty(&payload)?
        } else {
            serde_json::to_string(&payload)?
        };
        Ok(json)
    }

    /// Write `{subject}-{experiment}-{suffix}.json` into `output_dir`
    pub fn write(
        &self,
        report: &ExperimentReport,
        output_dir: &Path,
        suffix: &str,
        pretty: bool,
    ) -> Result<PathBuf, ComputeError> {
        if !output_dir.is_dir() {
            return Err(ComputeError::OutputDirNotFound(output_dir.to_path_buf()));
        }

        let path = output_dir.join(format!(
            "{}-{}-{}.json",
            report.subject, report.experiment, suffix
        ));
        std::fs::write(&path, self.encode_to_json(report, pretty)?)?;
        info!(path = %path.display(), "wrote JSON report");

        Ok(path)
    }
}
