// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Scenario configuration loaded from TOML files or constructed
//! programmatically.
//!
//! # TOML Format
//! ```toml
//! name = "classic-unsafe"
//! description = "P1 asks for two more units than the system can afford"
//!
//! [runner]
//! strict = true
//!
//! [[resources]]
//! name = "R"
//! total = 10
//!
//! [[processes]]
//! id = "P1"
//! max = [10]
//!
//! [[steps]]
//! op = "request"
//! process = "P1"
//! amounts = [5]
//! expect = "granted"
//!
//! [[steps]]
//! op = "reset"
//! ```
//!
//! Step `op`s: `define-resource`, `register-process`, `request`, `release`,
//! `reset`. `expect` is `"granted"` (any success) or an error kind such as
//! `"would-deadlock"`.

use crate::SimulatorError;
use banker::ErrorKind;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A complete scenario: initial system plus a script of operations.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScenarioConfig {
    /// Scenario name, used in transcripts and logs.
    pub name: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Replay options.
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Resources defined before the first step.
    #[serde(default)]
    pub resources: Vec<ResourceSpec>,
    /// Processes registered before the first step.
    #[serde(default)]
    pub processes: Vec<ProcessSpec>,
    /// Operations to replay, in order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Options controlling how a scenario is replayed.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RunnerConfig {
    /// Abort on the first step whose outcome contradicts its expectation.
    #[serde(default)]
    pub strict: bool,
    /// Record per-step wall-clock durations in the transcript.
    #[serde(default = "default_true")]
    pub record_timings: bool,
}

fn default_true() -> bool {
    true
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            strict: false,
            record_timings: true,
        }
    }
}

/// An initial resource definition.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResourceSpec {
    pub name: String,
    pub total: i64,
}

/// An initial process registration.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProcessSpec {
    pub id: String,
    pub max: Vec<i64>,
}

/// One scripted operation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Step {
    DefineResource {
        name: String,
        total: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expect: Option<Expectation>,
    },
    RegisterProcess {
        id: String,
        max: Vec<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expect: Option<Expectation>,
    },
    Request {
        process: String,
        amounts: Vec<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expect: Option<Expectation>,
        /// Exact safe sequence expected after a successful request.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expect_sequence: Option<Vec<String>>,
    },
    Release {
        process: String,
        amounts: Vec<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expect: Option<Expectation>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expect_sequence: Option<Vec<String>>,
    },
    Reset,
}

impl Step {
    /// Shorthand for an unchecked request step.
    pub fn request(process: &str, amounts: &[i64]) -> Self {
        Self::Request {
            process: process.to_string(),
            amounts: amounts.to_vec(),
            expect: None,
            expect_sequence: None,
        }
    }

    /// Shorthand for an unchecked release step.
    pub fn release(process: &str, amounts: &[i64]) -> Self {
        Self::Release {
            process: process.to_string(),
            amounts: amounts.to_vec(),
            expect: None,
            expect_sequence: None,
        }
    }

    /// Attaches an outcome expectation. No effect on `Reset`.
    pub fn expecting(mut self, expectation: Expectation) -> Self {
        match &mut self {
            Self::DefineResource { expect, .. }
            | Self::RegisterProcess { expect, .. }
            | Self::Request { expect, .. }
            | Self::Release { expect, .. } => *expect = Some(expectation),
            Self::Reset => {}
        }
        self
    }

    /// Attaches an expected safe sequence to a request or release.
    pub fn expecting_sequence(mut self, sequence: &[&str]) -> Self {
        if let Self::Request {
            expect_sequence, ..
        }
        | Self::Release {
            expect_sequence, ..
        } = &mut self
        {
            *expect_sequence = Some(sequence.iter().map(|s| s.to_string()).collect());
        }
        self
    }

    /// The declared outcome expectation, if any.
    pub fn expectation(&self) -> Option<Expectation> {
        match self {
            Self::DefineResource { expect, .. }
            | Self::RegisterProcess { expect, .. }
            | Self::Request { expect, .. }
            | Self::Release { expect, .. } => *expect,
            Self::Reset => None,
        }
    }

    /// One-line description for logs and transcripts.
    pub fn describe(&self) -> String {
        match self {
            Self::DefineResource { name, total, .. } => format!("define {name} ({total} units)"),
            Self::RegisterProcess { id, max, .. } => format!("register {id} max {max:?}"),
            Self::Request {
                process, amounts, ..
            } => format!("request {process} {amounts:?}"),
            Self::Release {
                process, amounts, ..
            } => format!("release {process} {amounts:?}"),
            Self::Reset => "reset".to_string(),
        }
    }
}

/// Expected outcome of a step.
///
/// Written as `"granted"` (also accepted: `"ok"`, `"applied"`) or as the
/// kebab-case name of an [`ErrorKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Expectation {
    Granted,
    Denied(ErrorKind),
}

impl Expectation {
    /// Returns `true` if `outcome` satisfies this expectation.
    pub fn matches(&self, outcome: Result<(), ErrorKind>) -> bool {
        match (self, outcome) {
            (Self::Granted, Ok(())) => true,
            (Self::Denied(want), Err(got)) => *want == got,
            _ => false,
        }
    }
}

impl FromStr for Expectation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if matches!(s.as_str(), "granted" | "ok" | "applied") {
            return Ok(Self::Granted);
        }
        ErrorKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .map(Self::Denied)
            .ok_or_else(|| {
                let kinds: Vec<&str> = ErrorKind::ALL.iter().map(|k| k.as_str()).collect();
                format!(
                    "unknown expectation '{s}'; expected 'granted' or one of: {}",
                    kinds.join(", ")
                )
            })
    }
}

impl TryFrom<String> for Expectation {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Expectation> for String {
    fn from(e: Expectation) -> Self {
        e.to_string()
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Granted => f.write_str("granted"),
            Self::Denied(kind) => write!(f, "{kind}"),
        }
    }
}

impl ScenarioConfig {
    /// Creates an empty scenario with default runner options.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            runner: RunnerConfig::default(),
            resources: Vec::new(),
            processes: Vec::new(),
            steps: Vec::new(),
        }
    }

    /// Adds an initial resource.
    pub fn resource(mut self, name: &str, total: i64) -> Self {
        self.resources.push(ResourceSpec {
            name: name.to_string(),
            total,
        });
        self
    }

    /// Adds an initial process.
    pub fn process(mut self, id: &str, max: &[i64]) -> Self {
        self.processes.push(ProcessSpec {
            id: id.to_string(),
            max: max.to_vec(),
        });
        self
    }

    /// Appends a step.
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Sets the description.
    pub fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Loads a scenario from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, SimulatorError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SimulatorError::Config(format!("cannot read scenario '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses a scenario from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, SimulatorError> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| SimulatorError::Config(format!("TOML parse error: {e}")))?;
        if config.name.trim().is_empty() {
            return Err(SimulatorError::Config("scenario name must not be empty".into()));
        }
        Ok(config)
    }

    /// Serialises the scenario to TOML.
    pub fn to_toml(&self) -> Result<String, SimulatorError> {
        toml::to_string_pretty(self)
            .map_err(|e| SimulatorError::Config(format!("TOML serialise error: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLASSIC: &str = r#"
name = "classic-unsafe"
description = "two processes, one resource"

[runner]
strict = true

[[resources]]
name = "R"
total = 10

[[processes]]
id = "P1"
max = [10]

[[processes]]
id = "P2"
max = [4]

[[steps]]
op = "request"
process = "P1"
amounts = [5]
expect = "granted"

[[steps]]
op = "request"
process = "P1"
amounts = [2]
expect = "would-deadlock"

[[steps]]
op = "reset"
"#;

    #[test]
    fn test_from_toml() {
        let c = ScenarioConfig::from_toml(CLASSIC).unwrap();
        assert_eq!(c.name, "classic-unsafe");
        assert!(c.runner.strict);
        assert!(c.runner.record_timings);
        assert_eq!(c.resources, vec![ResourceSpec { name: "R".into(), total: 10 }]);
        assert_eq!(c.processes.len(), 2);
        assert_eq!(c.steps.len(), 3);
        assert_eq!(
            c.steps[1].expectation(),
            Some(Expectation::Denied(ErrorKind::WouldDeadlock))
        );
        assert_eq!(c.steps[2], Step::Reset);
    }

    #[test]
    fn test_runner_defaults() {
        let c = ScenarioConfig::from_toml("name = \"bare\"").unwrap();
        assert_eq!(c.runner, RunnerConfig::default());
        assert!(c.steps.is_empty());
    }

    #[test]
    fn test_rejects_unknown_op() {
        let toml = r#"
name = "bad"
[[steps]]
op = "steal"
"#;
        assert!(matches!(
            ScenarioConfig::from_toml(toml),
            Err(SimulatorError::Config(_))
        ));
    }

    #[test]
    fn test_rejects_unknown_expectation() {
        let toml = r#"
name = "bad"
[[steps]]
op = "reset"
[[steps]]
op = "request"
process = "P1"
amounts = [1]
expect = "maybe"
"#;
        let err = ScenarioConfig::from_toml(toml).unwrap_err();
        assert!(err.to_string().contains("unknown expectation"));
    }

    #[test]
    fn test_rejects_empty_name() {
        assert!(ScenarioConfig::from_toml("name = \"  \"").is_err());
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let c = ScenarioConfig::new("roundtrip")
            .describe("builder output")
            .resource("R1", 3)
            .process("P1", &[2])
            .step(Step::request("P1", &[1]).expecting(Expectation::Granted))
            .step(
                Step::release("P1", &[1])
                    .expecting(Expectation::Granted)
                    .expecting_sequence(&["P1"]),
            )
            .step(Step::Reset);
        let toml = c.to_toml().unwrap();
        let back = ScenarioConfig::from_toml(&toml).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_expectation_parse_and_display() {
        assert_eq!("granted".parse::<Expectation>().unwrap(), Expectation::Granted);
        assert_eq!("OK".parse::<Expectation>().unwrap(), Expectation::Granted);
        assert_eq!(
            "exceeds-claim".parse::<Expectation>().unwrap(),
            Expectation::Denied(ErrorKind::ExceedsClaim)
        );
        assert_eq!(
            Expectation::Denied(ErrorKind::UnknownProcess).to_string(),
            "unknown-process"
        );
    }

    #[test]
    fn test_expectation_matches() {
        assert!(Expectation::Granted.matches(Ok(())));
        assert!(!Expectation::Granted.matches(Err(ErrorKind::ExceedsClaim)));
        assert!(Expectation::Denied(ErrorKind::ExceedsClaim).matches(Err(ErrorKind::ExceedsClaim)));
        assert!(!Expectation::Denied(ErrorKind::ExceedsClaim).matches(Ok(())));
    }

    #[test]
    fn test_describe() {
        assert_eq!(Step::request("P1", &[0, 2]).describe(), "request P1 [0, 2]");
        assert_eq!(Step::Reset.describe(), "reset");
    }
}
