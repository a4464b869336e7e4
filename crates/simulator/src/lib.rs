// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # simulator
//!
//! Drives the `banker` engine from the outside: scripted scenario replay,
//! built-in demonstrations, and a concurrent stress driver.
//!
//! The simulator takes:
//! - A [`ScenarioConfig`] loaded from TOML or built in code.
//! - A [`SharedBanker`] handle that serialises access to one engine.
//!
//! And produces a [`Transcript`] (per-step outcomes, verdicts and timings)
//! or, for stress runs, a [`StressReport`].
//!
//! # Concurrency
//! The engine itself is single-writer. Every client here goes through the
//! same lock in [`SharedBanker`], so a request's trial evaluation and its
//! commit are atomic with respect to every other client. Stress clients run
//! as `tokio` tasks and yield between operations to force interleaving.

mod config;
mod error;
mod runner;
pub mod scenarios;
mod shared;
mod stress;
mod transcript;

pub use config::{Expectation, ProcessSpec, ResourceSpec, RunnerConfig, ScenarioConfig, Step};
pub use error::SimulatorError;
pub use runner::ScenarioRunner;
pub use shared::SharedBanker;
pub use stress::{run_stress, StressConfig, StressReport};
pub use transcript::{StepOutcome, StepRecord, Transcript};
