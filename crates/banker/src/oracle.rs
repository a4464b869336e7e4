// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The safety oracle: the Banker's safety check over a [`Snapshot`].
//!
//! ```text
//! work     := available
//! finished := [false; n]
//! loop {
//!     for p in 0..n where !finished[p]:       // registration order
//!         if need[p] <= work (component-wise):
//!             work += allocation[p]
//!             finished[p] = true; sequence.push(p)
//!     if no process finished in this pass: break
//! }
//! safe := all(finished)
//! ```
//!
//! A later process may only become finishable once an earlier one returns
//! its units, so the scan runs to a fixed point rather than a single pass.
//! Ties are broken by registration order, which makes the sequence
//! deterministic. Cost is `O(n² · m)` for `n` processes and `m` resources.

use crate::store::Snapshot;
use crate::vector::Units;

/// Outcome of a safety check, in process indices.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SafetyVerdict {
    /// Whether every process can run to completion.
    pub safe: bool,
    /// A completion order by registration index. Empty when unsafe.
    pub order: Vec<usize>,
}

impl SafetyVerdict {
    /// The verdict for a system with no processes.
    pub fn trivially_safe() -> Self {
        Self {
            safe: true,
            order: Vec::new(),
        }
    }
}

/// Decides whether `snapshot` is a safe state.
///
/// Pure: reads the snapshot and allocates only its own work vector.
pub fn check(snapshot: &Snapshot) -> SafetyVerdict {
    let n = snapshot.num_processes();
    if n == 0 {
        return SafetyVerdict::trivially_safe();
    }

    let mut work: Vec<Units> = snapshot.available.clone();
    let mut finished = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut passes = 0usize;

    loop {
        passes += 1;
        let mut progressed = false;

        for p in 0..n {
            if finished[p] || !can_finish(snapshot, p, &work) {
                continue;
            }
            for (w, &held) in work.iter_mut().zip(&snapshot.allocation[p]) {
                *w += held;
            }
            finished[p] = true;
            order.push(p);
            progressed = true;
        }

        if !progressed || order.len() == n {
            break;
        }
    }

    let safe = order.len() == n;
    tracing::debug!(
        processes = n,
        resources = snapshot.num_resources(),
        passes,
        safe,
        "safety check complete"
    );

    if !safe {
        order.clear();
    }
    SafetyVerdict { safe, order }
}

/// Returns `true` if process `p`'s remaining need fits in `work`.
///
/// Vacuously true when there are no resource types.
fn can_finish(snapshot: &Snapshot, p: usize, work: &[Units]) -> bool {
    work.iter()
        .enumerate()
        .all(|(r, &free)| snapshot.need(p, r) <= free)
}
