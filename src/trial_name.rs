//! Trial name decoding
//!
//! Trial keys have the form `{subject}-{experiment}-trial-{number}{suffix}`, where the
//! suffix usually carries DeepLabCut model information starting with `DLC`.

use crate::error::ComputeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Marker that starts the pose-model suffix in trial keys
const MODEL_SUFFIX_MARKER: &str = "DLC";

/// Decoded parts of a trial key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialName {
    pub subject: String,
    pub experiment: String,
    pub trial_number: u32,
    /// Everything after the trial number, including any model suffix
    pub suffix: String,
}

impl TrialName {
    /// Decode a trial key
    pub fn parse(key: &str) -> Result<Self, ComputeError> {
        let parse_error = |reason: &str| ComputeError::TrialNameParse(format!("{key}: {reason}"));

        let (head, model) = match key.find(MODEL_SUFFIX_MARKER) {
            Some(idx) => key.split_at(idx),
            None => (key, ""),
        };

        let pieces: Vec<&str> = head.split('-').collect();
        if pieces.len() < 4 {
            return Err(parse_error(
                "expected {subject}-{experiment}-trial-{number}",
            ));
        }

        let (subject, experiment) = (pieces[0].trim(), pieces[1].trim());
        if subject.is_empty() || experiment.is_empty() {
            return Err(parse_error("subject and experiment must be non-empty"));
        }
        if !pieces[2].eq_ignore_ascii_case("trial") {
            return Err(parse_error("missing 'trial' marker"));
        }

        let number_field = pieces[3];
        let digits_end = number_field
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(number_field.len());
        if digits_end == 0 {
            return Err(parse_error("trial number is not an integer"));
        }

        let trial_number = number_field[..digits_end]
            .parse::<u32>()
            .map_err(|e| parse_error(&e.to_string()))?;

        // Keep the rest of the key (remaining dashes included) as the suffix
        let rest_offset = pieces[..3].iter().map(|p| p.len() + 1).sum::<usize>() + digits_end;
        let suffix = format!("{}{}", &head[rest_offset..], model);

        Ok(Self {
            subject: subject.to_string(),
            experiment: experiment.to_string(),
            trial_number,
            suffix,
        })
    }

    /// Key identifying the experiment this trial belongs to
    pub fn experiment_key(&self) -> (String, String) {
        (self.subject.clone(), self.experiment.clone())
    }
}

impl FromStr for TrialName {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TrialName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-trial-{}{}",
            self.subject, self.experiment, self.trial_number, self.suffix
        )
    }
}
