// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Read-only views handed to the presentation layer.
//!
//! Views are owned copies. Holding one never blocks or aliases the engine.

use crate::vector::Units;

/// A resource type with its current free and held counts.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ResourceView {
    pub name: String,
    pub total: Units,
    pub available: Units,
    pub allocated: Units,
}

impl ResourceView {
    /// Held units as a percentage of the total.
    ///
    /// A zero total reports `0.0` rather than dividing by zero.
    pub fn utilization_percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.allocated as f64 / self.total as f64 * 100.0
    }

    /// Held units as a fraction in `[0.0, 1.0]`.
    pub fn utilization(&self) -> f64 {
        self.utilization_percent() / 100.0
    }
}

/// A registered process with its claim, holdings and remaining need.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ProcessView {
    pub id: String,
    pub max_claim: Vec<Units>,
    pub allocation: Vec<Units>,
    pub need: Vec<Units>,
}

impl ProcessView {
    /// Returns `true` if the process already holds its full claim.
    pub fn is_satisfied(&self) -> bool {
        self.need.iter().all(|&n| n == 0)
    }
}

/// The most recent safety verdict, with process ids instead of indices.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Verdict {
    pub safe: bool,
    pub sequence: Vec<String>,
}

impl Verdict {
    /// The verdict of an empty system.
    pub fn empty() -> Self {
        Self {
            safe: true,
            sequence: Vec::new(),
        }
    }

    /// Formats the sequence as `P2 → P1`, or `<unsafe>`.
    pub fn sequence_display(&self) -> String {
        if !self.safe {
            "<unsafe>".to_string()
        } else if self.sequence.is_empty() {
            "<empty>".to_string()
        } else {
            self.sequence.join(" → ")
        }
    }
}

impl Default for Verdict {
    fn default() -> Self {
        Self::empty()
    }
}
