// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for scenario replay and stress runs.

/// Errors that can occur while loading or running a scenario.
#[derive(Debug, thiserror::Error)]
pub enum SimulatorError {
    /// The scenario file could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// The engine rejected a scenario's setup (resources or processes).
    #[error("engine error: {0}")]
    Banker(#[from] banker::BankerError),

    /// A step's outcome differed from its declared expectation.
    #[error("step {step} ({description}): expected {expected}, got {actual}")]
    ExpectationFailed {
        step: usize,
        description: String,
        expected: String,
        actual: String,
    },

    /// A post-run audit found a broken invariant.
    #[error("invariant violated: {0}")]
    InvariantViolated(String),

    /// A stress client task failed to complete.
    #[error("stress client {client} failed: {detail}")]
    ClientFailed { client: usize, detail: String },
}
