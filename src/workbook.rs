//! Spreadsheet report writer
//!
//! Writes one xlsx workbook per experiment with one sheet per trial. Sheets are
//! named by trial number and indexed by syllable label. Trials that could not be
//! processed are listed on a trailing `failures` sheet.

use crate::config::DEFAULT_WORKBOOK_SUFFIX;
use crate::error::ComputeError;
use crate::types::{ExperimentReport, TrialStats};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Column headers after the syllable index column
pub const STAT_COLUMNS: [&str; 6] = [
    "occurrences",
    "occurrence_lengths",
    "median_length",
    "mean_length",
    "median_percentage",
    "mean_percentage",
];

/// Index column header
const INDEX_COLUMN: &str = "syllable";

/// Sheet listing failed trials
pub const FAILURES_SHEET: &str = "failures";

/// xlsx report writer
pub struct WorkbookWriter {
    suffix: String,
}

impl Default for WorkbookWriter {
    fn default() -> Self {
        Self::new(DEFAULT_WORKBOOK_SUFFIX)
    }
}

impl WorkbookWriter {
    pub fn new(suffix: &str) -> Self {
        Self {
            suffix: suffix.to_string(),
        }
    }

    /// Workbook file name for a report: `{subject}-{experiment}-{suffix}.xlsx`
    pub fn file_name(&self, report: &ExperimentReport) -> String {
        format!("{}-{}-{}.xlsx", report.subject, report.experiment, self.suffix)
    }

    /// Write the report into `output_dir` and return the workbook path.
    ///
    /// The directory is checked before any sheet is built. Failed trials have no
    /// sheet of their own and are listed on the [`FAILURES_SHEET`].
    pub fn write(
        &self,
        report: &ExperimentReport,
        output_dir: &Path,
    ) -> Result<PathBuf, ComputeError> {
        if !output_dir.is_dir() {
            return Err(ComputeError::OutputDirNotFound(output_dir.to_path_buf()));
        }
        if report.stats.trials.is_empty() {
            return Err(ComputeError::InvalidInput(format!(
                "{}-{}: no trial statistics to write",
                report.subject, report.experiment
            )));
        }

        let mut workbook = Workbook::new();
        let header = Format::new().set_bold();

        for (trial, stats) in &report.stats.trials {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(trial.to_string())?;
            write_trial_sheet(worksheet, stats, &header)?;
            debug!(trial = *trial, rows = stats.len(), "wrote trial sheet");
        }

        if !report.stats.failures.is_empty() {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(FAILURES_SHEET)?;
            write_failures_sheet(worksheet, &report.stats.failures, &header)?;
            for (trial, error) in &report.stats.failures {
                info!(trial = *trial, error = %error, "trial has no sheet");
            }
        }

        let path = output_dir.join(self.file_name(report));
        workbook.save(&path)?;
        info!(
            path = %path.display(),
            sheets = report.stats.trials.len(),
            "wrote workbook"
        );

        Ok(path)
    }
}

fn write_trial_sheet(
    worksheet: &mut Worksheet,
    stats: &TrialStats,
    header: &Format,
) -> Result<(), ComputeError> {
    worksheet.write_string_with_format(0, 0, INDEX_COLUMN, header)?;
    for (col, name) in STAT_COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16 + 1, *name, header)?;
    }

    for (row, (label, record)) in stats.rows().enumerate() {
        let row = row as u32 + 1;
        worksheet.write_number(row, 0, label)?;
        worksheet.write_number(row, 1, record.occurrences as f64)?;
        worksheet.write_string(row, 2, format_lengths(&record.occurrence_lengths))?;
        worksheet.write_number(row, 3, record.median_length)?;
        worksheet.write_number(row, 4, record.mean_length)?;
        worksheet.write_number(row, 5, record.median_percentage)?;
        worksheet.write_number(row, 6, record.mean_percentage)?;
    }

    Ok(())
}

fn write_failures_sheet(
    worksheet: &mut Worksheet,
    failures: &BTreeMap<u32, String>,
    header: &Format,
) -> Result<(), ComputeError> {
    worksheet.write_string_with_format(0, 0, "trial", header)?;
    worksheet.write_string_with_format(0, 1, "error", header)?;

    for (row, (trial, error)) in failures.iter().enumerate() {
        let row = row as u32 + 1;
        worksheet.write_number(row, 0, *trial)?;
        worksheet.write_string(row, 1, error)?;
    }

    Ok(())
}

/// Render run lengths as a list literal, e.g. `[2, 3]`
pub fn format_lengths(lengths: &[usize]) -> String {
    let items: Vec<String> = lengths.iter().map(|l| l.to_string()).collect();
    format!("[{}]", items.join(", "))
}
