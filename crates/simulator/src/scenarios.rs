// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Built-in demonstration scenarios.
//!
//! | Name       | Shows                                                   |
//! |------------|---------------------------------------------------------|
//! | `safe`     | two grants over two resources leave a safe state        |
//! | `unsafe`   | a request that fits but would deadlock is refused       |
//! | `release`  | over-release is refused, a valid release is applied     |
//! | `extend`   | a resource defined late extends every existing row      |
//! | `textbook` | the five-process, three-resource classroom example      |

use crate::config::{Expectation, ScenarioConfig, Step};
use banker::ErrorKind;

/// Names accepted by [`builtin`], in presentation order.
pub const BUILTIN_NAMES: [&str; 5] = ["safe", "unsafe", "release", "extend", "textbook"];

/// Looks up a built-in scenario by name.
pub fn builtin(name: &str) -> Option<ScenarioConfig> {
    match name {
        "safe" => Some(two_resource_grants()),
        "unsafe" => Some(classic_unsafe()),
        "release" => Some(release_checks()),
        "extend" => Some(late_resource()),
        "textbook" => Some(textbook()),
        _ => None,
    }
}

/// Every built-in scenario, in presentation order.
pub fn all() -> Vec<ScenarioConfig> {
    BUILTIN_NAMES.iter().filter_map(|n| builtin(n)).collect()
}

fn granted() -> Expectation {
    Expectation::Granted
}

fn denied(kind: ErrorKind) -> Expectation {
    Expectation::Denied(kind)
}

fn two_resource_grants() -> ScenarioConfig {
    ScenarioConfig::new("safe")
        .describe("Two processes each take part of their claim; both can still finish.")
        .resource("R1", 10)
        .resource("R2", 5)
        .process("P1", &[7, 5])
        .process("P2", &[3, 2])
        .step(Step::request("P1", &[0, 2]).expecting(granted()))
        .step(
            Step::request("P2", &[2, 0])
                .expecting(granted())
                .expecting_sequence(&["P1", "P2"]),
        )
}

fn classic_unsafe() -> ScenarioConfig {
    ScenarioConfig::new("unsafe")
        .describe("P1 asks for two units that are free, but granting them strands everyone.")
        .resource("R", 10)
        .process("P1", &[10])
        .process("P2", &[4])
        .step(Step::request("P1", &[5]).expecting(granted()))
        .step(
            Step::request("P2", &[2])
                .expecting(granted())
                .expecting_sequence(&["P2", "P1"]),
        )
        .step(Step::request("P1", &[2]).expecting(denied(ErrorKind::WouldDeadlock)))
        .step(Step::request("P2", &[2]).expecting(granted()))
}

fn release_checks() -> ScenarioConfig {
    ScenarioConfig::new("release")
        .describe("Releasing more than is held is refused; a partial release is applied.")
        .resource("R", 10)
        .process("P1", &[10])
        .process("P2", &[4])
        .step(Step::request("P1", &[5]).expecting(granted()))
        .step(Step::request("P2", &[2]).expecting(granted()))
        .step(Step::release("P2", &[3]).expecting(denied(ErrorKind::ExceedsAllocation)))
        .step(
            Step::release("P1", &[2])
                .expecting(granted())
                .expecting_sequence(&["P2", "P1"]),
        )
        .step(Step::release("P9", &[1]).expecting(denied(ErrorKind::UnknownProcess)))
}

fn late_resource() -> ScenarioConfig {
    ScenarioConfig::new("extend")
        .describe("A resource defined after registration gives every process a zero claim.")
        .resource("CPU", 4)
        .process("P1", &[2])
        .process("P2", &[3])
        .step(Step::request("P1", &[1]).expecting(granted()))
        .step(Step::DefineResource {
            name: "Disk".into(),
            total: 2,
            expect: Some(granted()),
        })
        .step(Step::request("P2", &[1, 1]).expecting(denied(ErrorKind::ExceedsClaim)))
        .step(Step::request("P2", &[2, 0]).expecting(granted()))
        .step(Step::request("P1", &[1]).expecting(denied(ErrorKind::MalformedVector)))
}

/// Resources A=10, B=5, C=7; the allocations of the classroom example are
/// reached by one request per process, followed by the two classic
/// follow-up requests.
fn textbook() -> ScenarioConfig {
    ScenarioConfig::new("textbook")
        .describe("Five processes over three resources; the classroom safety example.")
        .resource("A", 10)
        .resource("B", 5)
        .resource("C", 7)
        .process("P0", &[7, 5, 3])
        .process("P1", &[3, 2, 2])
        .process("P2", &[9, 0, 2])
        .process("P3", &[2, 2, 2])
        .process("P4", &[4, 3, 3])
        .step(Step::request("P0", &[0, 1, 0]).expecting(granted()))
        .step(Step::request("P1", &[2, 0, 0]).expecting(granted()))
        .step(Step::request("P2", &[3, 0, 2]).expecting(granted()))
        .step(Step::request("P3", &[2, 1, 1]).expecting(granted()))
        .step(
            Step::request("P4", &[0, 0, 2])
                .expecting(granted())
                .expecting_sequence(&["P1", "P3", "P4", "P0", "P2"]),
        )
        .step(
            Step::request("P1", &[1, 0, 2])
                .expecting(granted())
                .expecting_sequence(&["P1", "P3", "P4", "P0", "P2"]),
        )
        .step(Step::request("P4", &[3, 3, 0]).expecting(denied(ErrorKind::ExceedsAvailable)))
        .step(Step::request("P0", &[0, 2, 0]).expecting(denied(ErrorKind::WouldDeadlock)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ScenarioRunner;

    #[test]
    fn test_every_builtin_matches_its_expectations() {
        for scenario in all() {
            let name = scenario.name.clone();
            let (transcript, _) = ScenarioRunner::new(scenario).run_fresh().unwrap();
            let mismatches: Vec<_> = transcript
                .mismatches()
                .iter()
                .map(|s| s.description.clone())
                .collect();
            assert!(mismatches.is_empty(), "{name}: {mismatches:?}");
        }
    }

    #[test]
    fn test_names_resolve() {
        for name in BUILTIN_NAMES {
            assert_eq!(builtin(name).unwrap().name, name);
        }
        assert!(builtin("nope").is_none());
    }

    #[test]
    fn test_unsafe_leaves_state_unchanged() {
        let (_, banker) = ScenarioRunner::new(classic_unsafe()).run_fresh().unwrap();
        let p1 = banker.process("P1").unwrap();
        assert_eq!(p1.allocation, vec![5]);
        assert_eq!(banker.resources()[0].available, 1);
    }
}
