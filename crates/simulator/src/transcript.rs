// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-step record of a scenario replay.
//!
//! A [`Transcript`] holds one [`StepRecord`] per replayed operation: when it
//! ran, what it was, how the engine answered, and the verdict afterwards.
//! It serialises to JSON for archiving or diffing runs.

use banker::{ArbiterStats, ErrorKind, Verdict};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// How the engine answered one step.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum StepOutcome {
    /// A request or release was committed; carries the new safe sequence.
    Committed { sequence: Vec<String> },
    /// A setup step (define, register, reset) succeeded.
    Applied,
    /// The engine refused the step. State is unchanged.
    Denied { kind: ErrorKind, message: String },
}

impl StepOutcome {
    /// Collapses the outcome to success or the failure kind.
    pub fn as_result(&self) -> Result<(), ErrorKind> {
        match self {
            Self::Committed { .. } | Self::Applied => Ok(()),
            Self::Denied { kind, .. } => Err(*kind),
        }
    }

    /// Short label for tables: `granted`, `applied` or the error kind.
    pub fn label(&self) -> String {
        match self {
            Self::Committed { .. } => "granted".to_string(),
            Self::Applied => "applied".to_string(),
            Self::Denied { kind, .. } => kind.to_string(),
        }
    }
}

/// One replayed step.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StepRecord {
    /// Zero-based position in the script.
    pub index: usize,
    /// Milliseconds since the Unix epoch when the step ran.
    pub timestamp_ms: u64,
    /// Human-readable description of the operation.
    pub description: String,
    pub outcome: StepOutcome,
    /// Declared expectation, if the step had one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    /// Whether the outcome satisfied the expectation (and sequence, if any).
    pub matched: bool,
    /// Engine verdict after the step.
    pub verdict: Verdict,
    /// Time spent inside the engine, in microseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_us: Option<u64>,
}

/// Complete record of a scenario replay.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Transcript {
    /// Scenario name.
    pub scenario: String,
    /// Per-step records, in script order.
    pub steps: Vec<StepRecord>,
    /// Verdict after the last step.
    pub final_verdict: Verdict,
    /// Engine statistics after the last step.
    pub stats: ArbiterStats,
    /// Total replay time in microseconds.
    pub total_elapsed_us: u64,
}

impl Transcript {
    /// Creates an empty transcript for `scenario`.
    pub fn new(scenario: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            steps: Vec::new(),
            final_verdict: Verdict::empty(),
            stats: ArbiterStats::default(),
            total_elapsed_us: 0,
        }
    }

    /// Appends a step record.
    pub fn record(&mut self, record: StepRecord) {
        self.steps.push(record);
    }

    /// Stores the end-of-run verdict, statistics and wall-clock time.
    pub fn finalise(&mut self, verdict: Verdict, stats: ArbiterStats, total: Duration) {
        self.final_verdict = verdict;
        self.stats = stats;
        self.total_elapsed_us = total.as_micros() as u64;
    }

    /// Steps whose outcome was a success.
    pub fn succeeded(&self) -> usize {
        self.steps.iter().filter(|s| s.outcome.as_result().is_ok()).count()
    }

    /// Steps the engine refused.
    pub fn denied(&self) -> usize {
        self.steps.len() - self.succeeded()
    }

    /// Steps whose outcome contradicted their expectation.
    pub fn mismatches(&self) -> Vec<&StepRecord> {
        self.steps.iter().filter(|s| !s.matched).collect()
    }

    /// Returns `true` if every step matched its expectation.
    pub fn all_matched(&self) -> bool {
        self.steps.iter().all(|s| s.matched)
    }

    /// Returns a human-readable summary suitable for CLI output.
    pub fn summary(&self) -> String {
        format!(
            "Scenario '{}': {} steps ({} succeeded, {} denied), {} mismatches, \
             {:.2}ms, final state {}",
            self.scenario,
            self.steps.len(),
            self.succeeded(),
            self.denied(),
            self.mismatches().len(),
            self.total_elapsed_us as f64 / 1000.0,
            if self.final_verdict.safe {
                format!("safe [{}]", self.final_verdict.sequence_display())
            } else {
                "UNSAFE".to_string()
            },
        )
    }

    /// Serialises the transcript as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Milliseconds since the Unix epoch, or 0 if the clock is before it.
pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(index: usize, outcome: StepOutcome, matched: bool) -> StepRecord {
        StepRecord {
            index,
            timestamp_ms: now_ms(),
            description: format!("step {index}"),
            outcome,
            expected: None,
            matched,
            verdict: Verdict::empty(),
            elapsed_us: Some(12),
        }
    }

    #[test]
    fn test_counts() {
        let mut t = Transcript::new("counts");
        t.record(record(0, StepOutcome::Applied, true));
        t.record(record(
            1,
            StepOutcome::Committed {
                sequence: vec!["P1".into()],
            },
            true,
        ));
        t.record(record(
            2,
            StepOutcome::Denied {
                kind: ErrorKind::WouldDeadlock,
                message: "no".into(),
            },
            false,
        ));
        assert_eq!(t.succeeded(), 2);
        assert_eq!(t.denied(), 1);
        assert_eq!(t.mismatches().len(), 1);
        assert!(!t.all_matched());
    }

    #[test]
    fn test_outcome_label() {
        assert_eq!(StepOutcome::Applied.label(), "applied");
        let denied = StepOutcome::Denied {
            kind: ErrorKind::ExceedsClaim,
            message: String::new(),
        };
        assert_eq!(denied.label(), "exceeds-claim");
        assert_eq!(denied.as_result(), Err(ErrorKind::ExceedsClaim));
    }

    #[test]
    fn test_summary_format() {
        let mut t = Transcript::new("demo");
        t.record(record(0, StepOutcome::Applied, true));
        t.finalise(
            Verdict {
                safe: true,
                sequence: vec!["P2".into(), "P1".into()],
            },
            ArbiterStats::default(),
            Duration::from_millis(3),
        );
        let s = t.summary();
        assert!(s.contains("Scenario 'demo'"));
        assert!(s.contains("1 steps"));
        assert!(s.contains("safe [P2 → P1]"));
    }

    #[test]
    fn test_json_shape() {
        let mut t = Transcript::new("json");
        t.record(record(
            0,
            StepOutcome::Denied {
                kind: ErrorKind::UnknownProcess,
                message: "unknown process: P9".into(),
            },
            true,
        ));
        let value: serde_json::Value = serde_json::from_str(&t.to_json().unwrap()).unwrap();
        assert_eq!(value["scenario"], "json");
        assert_eq!(value["steps"][0]["outcome"]["status"], "denied");
        assert_eq!(value["steps"][0]["outcome"]["kind"], "unknown-process");
        assert_eq!(value["steps"][0]["elapsed_us"], 12);
        assert!(value["steps"][0].get("expected").is_none());
    }
}
