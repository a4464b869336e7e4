// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Arbitration statistics for diagnostics.
//!
//! [`ArbiterStats`] counts what the arbiter has decided since creation (or
//! the last reset). Nothing in the engine reads these counters back; they
//! exist for logging and for the CLI summary.

use crate::ErrorKind;
use std::collections::BTreeMap;

/// Cumulative counters over request/release decisions.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ArbiterStats {
    /// Total `request` calls.
    pub requests: u64,
    /// Requests that were committed.
    pub granted: u64,
    /// Total `release` calls.
    pub releases: u64,
    /// Releases that were applied.
    pub released: u64,
    /// Failures by kind, across all operations.
    pub denials: BTreeMap<ErrorKind, u64>,
    /// Number of times the safety oracle ran.
    pub safety_checks: u64,
    /// Highest number of units held across all resources at once.
    pub peak_allocated_units: u64,
}

impl ArbiterStats {
    /// Fraction of requests that were granted, in `[0.0, 1.0]`.
    ///
    /// Returns `0.0` if no requests have been made.
    pub fn grant_ratio(&self) -> f64 {
        if self.requests == 0 {
            return 0.0;
        }
        self.granted as f64 / self.requests as f64
    }

    /// Number of failures of the given kind.
    pub fn denials_of(&self, kind: ErrorKind) -> u64 {
        self.denials.get(&kind).copied().unwrap_or(0)
    }

    /// Total failures across all kinds.
    pub fn total_denials(&self) -> u64 {
        self.denials.values().sum()
    }

    pub(crate) fn record_request(&mut self) {
        self.requests += 1;
    }

    pub(crate) fn record_grant(&mut self) {
        self.granted += 1;
    }

    pub(crate) fn record_release(&mut self) {
        self.releases += 1;
    }

    pub(crate) fn record_released(&mut self) {
        self.released += 1;
    }

    pub(crate) fn record_denial(&mut self, kind: ErrorKind) {
        *self.denials.entry(kind).or_insert(0) += 1;
    }

    pub(crate) fn record_safety_check(&mut self) {
        self.safety_checks += 1;
    }

    /// Updates the peak-units high-water mark if needed.
    pub(crate) fn update_peak(&mut self, allocated_units: u64) {
        if allocated_units > self.peak_allocated_units {
            self.peak_allocated_units = allocated_units;
        }
    }

    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "Requests: {} total ({} granted, {:.0}% grant rate), \
             {} releases ({} applied), {} safety checks, peak {} units held",
            self.requests,
            self.granted,
            self.grant_ratio() * 100.0,
            self.releases,
            self.released,
            self.safety_checks,
            self.peak_allocated_units,
        );
        if !self.denials.is_empty() {
            let parts: Vec<String> = self
                .denials
                .iter()
                .map(|(kind, n)| format!("{kind}: {n}"))
                .collect();
            out.push_str(&format!("; denials [{}]", parts.join(", ")));
        }
        out
    }
}
