//! Ignored/required error filtering and the run verdict
//!
//! Filtering never mutates a collection it is iterating: candidates are
//! copied into fresh sequences, filtered functionally, and assigned back,
//! so every matching entry is removed.

use std::collections::HashMap;

use crate::error::{HarnessError, HarnessResult};

/// Substring allow-list and must-occur-list applied to recorded failures
/// and the captured log transcript at verdict time.
#[derive(Debug, Clone, Default)]
pub struct ErrorFilter {
    ignored: Vec<String>,
    required: Vec<String>,
}

impl ErrorFilter {
    pub fn new(ignored: Vec<String>, required: Vec<String>) -> Self {
        Self { ignored, required }
    }

    pub fn from_config(config: &shared::HarnessConfig) -> Self {
        Self::new(config.ignored_errors.clone(), config.required_errors.clone())
    }

    fn is_ignored(&self, text: &str) -> bool {
        self.ignored.iter().any(|pattern| text.contains(pattern))
    }

    /// Transcript lines not covered by the ignored list. Any surviving
    /// line is a hard assertion failure for the run.
    pub fn transcript_violations(&self, transcript: &str) -> Vec<String> {
        transcript
            .lines()
            .filter(|line| !self.is_ignored(line))
            .map(str::to_string)
            .collect()
    }

    /// Resolve recorded failures and the transcript against both lists.
    ///
    /// Required patterns are satisfied by an occurrence anywhere: in the
    /// transcript or inside any recorded failure message (including
    /// messages the ignored list suppresses). Modules whose messages are
    /// all suppressed drop out of the failure map entirely.
    pub fn resolve(&self, failures: &HashMap<String, Vec<String>>, transcript: &str) -> Verdict {
        let mut missing_required: Vec<String> = self
            .required
            .iter()
            .filter(|pattern| !transcript.contains(pattern.as_str()))
            .cloned()
            .collect();

        let mut surviving: HashMap<String, Vec<String>> = HashMap::new();
        for (module, messages) in failures {
            missing_required
                .retain(|pattern| !messages.iter().any(|message| message.contains(pattern)));

            let kept: Vec<String> = messages
                .iter()
                .filter(|message| !self.is_ignored(message))
                .cloned()
                .collect();
            if !kept.is_empty() {
                surviving.insert(module.clone(), kept);
            }
        }

        Verdict {
            failures: surviving,
            missing_required,
        }
    }
}

/// Outcome of one harness run after filtering.
///
/// The run fails if any failure survived filtering OR any required
/// pattern was never observed; the two checks are independent.
#[derive(Debug, Clone, Default)]
pub struct Verdict {
    pub failures: HashMap<String, Vec<String>>,
    pub missing_required: Vec<String>,
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        self.failures.is_empty() && self.missing_required.is_empty()
    }

    /// Human-readable summary of why the run failed, if it did.
    pub fn failure_message(&self) -> Option<String> {
        if self.is_pass() {
            return None;
        }
        let mut lines = Vec::new();
        let mut modules: Vec<&String> = self.failures.keys().collect();
        modules.sort();
        for module in modules {
            for message in &self.failures[module] {
                lines.push(message.clone());
            }
        }
        for pattern in &self.missing_required {
            lines.push(format!("required error never observed: {pattern}"));
        }
        Some(lines.join("\n"))
    }

    /// Convert the verdict into a result, reporting surviving failures
    /// before missing required patterns.
    pub fn ensure(self) -> HarnessResult<()> {
        if !self.failures.is_empty() {
            let mut modules: Vec<&String> = self.failures.keys().collect();
            modules.sort();
            let summary = modules
                .iter()
                .flat_map(|module| self.failures[*module].iter().cloned())
                .collect::<Vec<_>>()
                .join("\n");
            return Err(HarnessError::FailuresRecorded { summary });
        }
        if !self.missing_required.is_empty() {
            return Err(HarnessError::RequiredErrorMissing {
                patterns: self.missing_required,
            });
        }
        Ok(())
    }
}
