// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: scenario files, shared access and stress runs.
//!
//! These tests go through the public surface only: load the TOML scenarios
//! shipped in `scenarios/`, replay them against a shared engine, and run
//! the stress driver on a multi-threaded runtime.

use banker::ErrorKind;
use simulator::{
    run_stress, scenarios, Expectation, ScenarioConfig, ScenarioRunner, SharedBanker,
    SimulatorError, Step, StepOutcome, StressConfig,
};
use std::path::PathBuf;

// ── Helpers ────────────────────────────────────────────────────

fn scenario_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../scenarios")
}

fn load(file: &str) -> ScenarioConfig {
    ScenarioConfig::from_file(&scenario_dir().join(file)).unwrap()
}

// ── Scenario files ─────────────────────────────────────────────

#[test]
fn test_all_scenario_files_replay_cleanly() {
    let mut seen = 0;
    for entry in std::fs::read_dir(scenario_dir()).unwrap() {
        let path = entry.unwrap().path();
        if path.extension().and_then(|e| e.to_str()) != Some("toml") {
            continue;
        }
        let config = ScenarioConfig::from_file(&path).unwrap();
        let (transcript, _) = ScenarioRunner::new(config).run_fresh().unwrap();
        assert!(
            transcript.all_matched(),
            "{}: {:?}",
            path.display(),
            transcript.mismatches()
        );
        seen += 1;
    }
    assert!(seen >= 3, "expected scenario files in {}", scenario_dir().display());
}

#[test]
fn test_classic_unsafe_file() {
    let (transcript, banker) = ScenarioRunner::new(load("classic-unsafe.toml"))
        .run_fresh()
        .unwrap();

    let denied: Vec<ErrorKind> = transcript
        .steps
        .iter()
        .filter_map(|s| s.outcome.as_result().err())
        .collect();
    assert_eq!(
        denied,
        vec![ErrorKind::WouldDeadlock, ErrorKind::ExceedsAllocation]
    );
    assert_eq!(banker.resources()[0].available, 5);
    assert_eq!(banker.process("P1").unwrap().allocation, vec![3]);
}

#[test]
fn test_textbook_file_final_sequence() {
    let (transcript, banker) = ScenarioRunner::new(load("textbook.toml"))
        .run_fresh()
        .unwrap();
    assert_eq!(
        transcript.final_verdict.sequence,
        vec!["P1", "P3", "P4", "P0", "P2"]
    );
    let available: Vec<u64> = banker.resources().iter().map(|r| r.available).collect();
    assert_eq!(available, vec![2, 3, 0]);
}

#[test]
fn test_missing_file_is_config_error() {
    let err = ScenarioConfig::from_file(&scenario_dir().join("does-not-exist.toml")).unwrap_err();
    assert!(matches!(err, SimulatorError::Config(_)));
}

#[test]
fn test_file_matches_builtin() {
    let from_file = ScenarioRunner::new(load("textbook.toml")).run_fresh().unwrap().1;
    let builtin = ScenarioRunner::new(scenarios::builtin("textbook").unwrap())
        .run_fresh()
        .unwrap()
        .1;
    assert_eq!(from_file.snapshot(), builtin.snapshot());
}

// ── Shared access ──────────────────────────────────────────────

#[test]
fn test_runner_on_prepared_engine() {
    let shared = SharedBanker::new();
    shared.with(|b| b.define_resource("Printer", 2)).unwrap();

    let config = ScenarioConfig::new("on-top")
        .process("P1", &[2])
        .step(Step::request("P1", &[2]).expecting(Expectation::Granted))
        .step(Step::request("P1", &[1]).expecting(Expectation::Denied(ErrorKind::ExceedsAvailable)));
    let transcript = ScenarioRunner::new(config).run(&shared).unwrap();

    assert!(transcript.all_matched());
    assert_eq!(shared.lock().resources()[0].available, 0);
}

#[test]
fn test_transcript_json_lists_every_step() {
    let (transcript, _) = ScenarioRunner::new(scenarios::builtin("release").unwrap())
        .run_fresh()
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&transcript.to_json().unwrap()).unwrap();
    let steps = json["steps"].as_array().unwrap();
    assert_eq!(steps.len(), transcript.steps.len());
    assert_eq!(steps[2]["outcome"]["kind"], "exceeds-allocation");
    assert!(steps.iter().all(|s| s["timestamp_ms"].as_u64().unwrap() > 0));
}

#[test]
fn test_denied_steps_leave_verdict_unchanged() {
    let (transcript, _) = ScenarioRunner::new(scenarios::builtin("unsafe").unwrap())
        .run_fresh()
        .unwrap();
    for pair in transcript.steps.windows(2) {
        if let StepOutcome::Denied { .. } = pair[1].outcome {
            assert_eq!(pair[0].verdict, pair[1].verdict);
        }
    }
}

// ── Stress ─────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_stress_multi_thread() {
    let config = StressConfig {
        clients: 8,
        ops_per_client: 100,
        seed: 7,
        ..StressConfig::default()
    };
    let report = run_stress(&config).await.unwrap();
    assert_eq!(report.operations, 800);
    assert!(report.final_verdict.safe);
    assert_eq!(report.final_verdict.sequence.len(), 8);
    assert_eq!(
        report.granted + report.released + report.denials.values().sum::<u64>(),
        800
    );
}

#[tokio::test]
async fn test_stress_tight_resources_stays_safe() {
    let config = StressConfig {
        clients: 6,
        ops_per_client: 150,
        seed: 1,
        resources: 1,
        units_per_resource: 4,
        audit_each_op: true,
    };
    let report = run_stress(&config).await.unwrap();
    assert!(report.final_verdict.safe);
    assert_eq!(report.stats.granted, report.granted);
}
