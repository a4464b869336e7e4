// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Scenario replay.
//!
//! [`ScenarioRunner`] applies a [`ScenarioConfig`] to a [`SharedBanker`]:
//!
//! ```text
//! define resources ──► register processes ──► steps[0..n] ──► audit
//!   (errors abort)       (errors abort)        │
//!                                              ├─ outcome vs. expectation
//!                                              └─ StepRecord → Transcript
//! ```
//!
//! Setup failures always abort. Step denials are ordinary outcomes and are
//! recorded; they only abort in strict mode, and only when they contradict
//! the step's expectation.

use crate::config::{ScenarioConfig, Step};
use crate::transcript::{now_ms, StepOutcome, StepRecord, Transcript};
use crate::{SharedBanker, SimulatorError};
use banker::{Banker, BankerError};
use std::time::Instant;

/// Replays one scenario.
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    config: ScenarioConfig,
}

impl ScenarioRunner {
    /// Creates a runner for `config`.
    pub fn new(config: ScenarioConfig) -> Self {
        Self { config }
    }

    /// The scenario being replayed.
    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Replays the scenario against a fresh engine and returns the
    /// transcript together with the final engine state.
    pub fn run_fresh(&self) -> Result<(Transcript, Banker), SimulatorError> {
        let shared = SharedBanker::new();
        let transcript = self.run(&shared)?;
        Ok((transcript, shared.snapshot()))
    }

    /// Replays the scenario against `shared`.
    ///
    /// The initial resources and processes are added on top of whatever
    /// `shared` already holds.
    pub fn run(&self, shared: &SharedBanker) -> Result<Transcript, SimulatorError> {
        let run_start = Instant::now();
        let cfg = &self.config;
        tracing::info!(
            "replaying scenario '{}': {} resources, {} processes, {} steps",
            cfg.name,
            cfg.resources.len(),
            cfg.processes.len(),
            cfg.steps.len(),
        );

        shared.with(|banker| -> Result<(), BankerError> {
            for res in &cfg.resources {
                banker.define_resource(&res.name, res.total)?;
            }
            for spec in &cfg.processes {
                banker.register_process(&spec.id, &spec.max)?;
            }
            Ok(())
        })?;

        let mut transcript = Transcript::new(cfg.name.clone());
        for (index, step) in cfg.steps.iter().enumerate() {
            let record = self.replay_step(shared, index, step);
            if !record.matched {
                let expected = record.expected.clone().unwrap_or_default();
                if cfg.runner.strict {
                    return Err(SimulatorError::ExpectationFailed {
                        step: index,
                        description: record.description,
                        expected,
                        actual: describe_outcome(&record.outcome),
                    });
                }
                tracing::warn!(
                    "step {} ({}): expected {}, got {}",
                    index,
                    record.description,
                    expected,
                    describe_outcome(&record.outcome),
                );
            }
            transcript.record(record);
        }

        let (verdict, stats) = shared.with(|banker| -> Result<_, SimulatorError> {
            banker
                .store()
                .audit()
                .map_err(SimulatorError::InvariantViolated)?;
            let recomputed = banker.check_safety();
            if !recomputed.safe {
                return Err(SimulatorError::InvariantViolated(
                    "committed state is unsafe".to_string(),
                ));
            }
            Ok((banker.verdict().clone(), banker.stats().clone()))
        })?;

        transcript.finalise(verdict, stats, run_start.elapsed());
        tracing::info!("{}", transcript.summary());
        Ok(transcript)
    }

    /// Applies one step under the lock and builds its record.
    fn replay_step(&self, shared: &SharedBanker, index: usize, step: &Step) -> StepRecord {
        let description = step.describe();
        let timestamp_ms = now_ms();

        let (outcome, verdict, elapsed) = shared.with(|banker| {
            let start = Instant::now();
            let outcome = apply(banker, step);
            (outcome, banker.verdict().clone(), start.elapsed())
        });
        tracing::debug!("step {index} ({description}) → {}", outcome.label());

        let (expected, matched) = check_expectation(step, &outcome);
        StepRecord {
            index,
            timestamp_ms,
            description,
            outcome,
            expected,
            matched,
            verdict,
            elapsed_us: self
                .config
                .runner
                .record_timings
                .then(|| elapsed.as_micros() as u64),
        }
    }
}

fn apply(banker: &mut Banker, step: &Step) -> StepOutcome {
    let result = match step {
        Step::DefineResource { name, total, .. } => {
            banker.define_resource(name, *total).map(|()| None)
        }
        Step::RegisterProcess { id, max, .. } => banker.register_process(id, max).map(|()| None),
        Step::Request {
            process, amounts, ..
        } => banker.request(process, amounts).map(Some),
        Step::Release {
            process, amounts, ..
        } => banker.release(process, amounts).map(Some),
        Step::Reset => {
            banker.reset();
            Ok(None)
        }
    };
    match result {
        Ok(Some(sequence)) => StepOutcome::Committed { sequence },
        Ok(None) => StepOutcome::Applied,
        Err(e) => StepOutcome::Denied {
            kind: e.kind(),
            message: e.to_string(),
        },
    }
}

/// Returns the rendered expectation (if any) and whether `outcome` meets it.
fn check_expectation(step: &Step, outcome: &StepOutcome) -> (Option<String>, bool) {
    let expect_sequence = match step {
        Step::Request {
            expect_sequence, ..
        }
        | Step::Release {
            expect_sequence, ..
        } => expect_sequence.as_ref(),
        _ => None,
    };
    let expectation = step.expectation();

    let kind_ok = expectation.map_or(true, |e| e.matches(outcome.as_result()));
    let sequence_ok = match (expect_sequence, outcome) {
        (None, _) => true,
        (Some(want), StepOutcome::Committed { sequence }) => want == sequence,
        (Some(_), _) => false,
    };

    let rendered = match (expectation, expect_sequence) {
        (None, None) => None,
        (Some(e), None) => Some(e.to_string()),
        (e, Some(seq)) => Some(format!(
            "{} [{}]",
            e.map_or_else(|| "granted".to_string(), |e| e.to_string()),
            seq.join(" → ")
        )),
    };
    (rendered, kind_ok && sequence_ok)
}

fn describe_outcome(outcome: &StepOutcome) -> String {
    match outcome {
        StepOutcome::Committed { sequence } => format!("granted [{}]", sequence.join(" → ")),
        StepOutcome::Applied => "applied".to_string(),
        StepOutcome::Denied { kind, message } => format!("{kind} ({message})"),
    }
}
