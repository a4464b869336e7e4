// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The state store: resource registry, process registry and the committed
//! [`Snapshot`].
//!
//! # Layout
//!
//! ```text
//!                 resource 0   resource 1   ...
//!   available   [    a0     ,     a1     , ... ]
//!   claims[p]   [   c_p0    ,    c_p1    , ... ]
//!   alloc[p]    [   x_p0    ,    x_p1    , ... ]
//! ```
//!
//! Rows are indexed by registration order, columns by resource definition
//! order. Adding a resource grows every row by one zero column; there are
//! no sparse or auto-extending containers.

use crate::vector::{validate_amounts, Units};
use crate::BankerError;
use std::collections::HashMap;

/// A named pool of interchangeable units.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ResourceType {
    /// Unique name.
    pub name: String,
    /// Total units in the pool. Fixed at creation.
    pub total: Units,
}

/// The matrices the safety oracle reads.
///
/// A `Snapshot` is a plain value: cloning it yields an independent scratch
/// copy with no aliasing back into the committed state.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Snapshot {
    /// Free units per resource.
    pub available: Vec<Units>,
    /// Units currently held, one row per process.
    pub allocation: Vec<Vec<Units>>,
    /// Declared maximum claims, one row per process.
    pub claims: Vec<Vec<Units>>,
}

impl Snapshot {
    /// Number of process rows.
    pub fn num_processes(&self) -> usize {
        self.allocation.len()
    }

    /// Number of resource columns.
    pub fn num_resources(&self) -> usize {
        self.available.len()
    }

    /// Remaining need of process `p` for resource `r`.
    ///
    /// Saturates at zero so that a hand-built snapshot violating the claim
    /// bound cannot underflow.
    pub fn need(&self, p: usize, r: usize) -> Units {
        self.claims[p][r].saturating_sub(self.allocation[p][r])
    }

    /// Full need row of process `p`.
    pub fn need_row(&self, p: usize) -> Vec<Units> {
        (0..self.num_resources()).map(|r| self.need(p, r)).collect()
    }

    /// Units of resource `r` held across all processes.
    pub fn allocated(&self, r: usize) -> Units {
        self.allocation.iter().map(|row| row[r]).sum()
    }
}

/// Authoritative holder of resource definitions, process registrations and
/// the committed snapshot.
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    resources: Vec<ResourceType>,
    processes: Vec<String>,
    process_index: HashMap<String, usize>,
    snapshot: Snapshot,
}

impl StateStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines a new resource type with `total` units, all initially free.
    ///
    /// Every existing process gets a zero claim and a zero allocation for the
    /// new resource.
    pub fn define_resource(&mut self, name: &str, total: i64) -> Result<(), BankerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BankerError::InvalidInput(
                "resource name must not be empty".into(),
            ));
        }
        if self.resources.iter().any(|r| r.name == name) {
            return Err(BankerError::InvalidInput(format!(
                "resource '{name}' is already defined"
            )));
        }
        if total <= 0 {
            return Err(BankerError::InvalidInput(format!(
                "resource '{name}' must have a positive number of units, got {total}"
            )));
        }
        let total = total as Units;

        self.resources.push(ResourceType {
            name: name.to_string(),
            total,
        });
        self.snapshot.available.push(total);
        for row in &mut self.snapshot.allocation {
            row.push(0);
        }
        for row in &mut self.snapshot.claims {
            row.push(0);
        }
        Ok(())
    }

    /// Registers a process with the given maximum claim vector.
    ///
    /// The claim must have one entry per defined resource, none negative and
    /// none above the resource's total.
    pub fn register_process(&mut self, id: &str, max_claim: &[i64]) -> Result<(), BankerError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(BankerError::InvalidInput(
                "process id must not be empty".into(),
            ));
        }
        if self.process_index.contains_key(id) {
            return Err(BankerError::InvalidInput(format!(
                "process '{id}' is already registered"
            )));
        }

        let claim = validate_amounts(max_claim, self.resources.len()).map_err(|e| {
            BankerError::InvalidInput(format!("claim for process '{id}': {e}"))
        })?;

        for (res, &c) in self.resources.iter().zip(&claim) {
            if c > res.total {
                return Err(BankerError::InvalidInput(format!(
                    "process '{id}' claims {c} unit(s) of '{}', which only has {}",
                    res.name, res.total,
                )));
            }
        }

        self.process_index.insert(id.to_string(), self.processes.len());
        self.processes.push(id.to_string());
        self.snapshot.allocation.push(vec![0; claim.len()]);
        self.snapshot.claims.push(claim);
        Ok(())
    }

    /// Removes every resource, process and matrix.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Defined resources, in definition order.
    pub fn resources(&self) -> &[ResourceType] {
        &self.resources
    }

    /// Registered process ids, in registration order.
    pub fn process_ids(&self) -> &[String] {
        &self.processes
    }

    /// Registration index of a process.
    pub fn process_index(&self, id: &str) -> Option<usize> {
        self.process_index.get(id.trim()).copied()
    }

    /// The committed snapshot.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Replaces the committed snapshot with a trial that passed the oracle.
    ///
    /// The dimensions must match the registries; only the arbiter calls this.
    pub(crate) fn commit(&mut self, snapshot: Snapshot) {
        debug_assert_eq!(snapshot.num_processes(), self.processes.len());
        debug_assert_eq!(snapshot.num_resources(), self.resources.len());
        self.snapshot = snapshot;
    }

    /// Checks the conservation and claim-bound invariants of the committed
    /// snapshot.
    ///
    /// Returns a description of the first violation found. The engine never
    /// produces a violating state; this exists for tests and for the stress
    /// driver's post-run audit.
    pub fn audit(&self) -> Result<(), String> {
        let snap = &self.snapshot;
        for (r, res) in self.resources.iter().enumerate() {
            let held = snap.allocated(r);
            if held + snap.available[r] != res.total {
                return Err(format!(
                    "conservation broken for '{}': {} available + {} held != {} total",
                    res.name, snap.available[r], held, res.total,
                ));
            }
        }
        for (p, id) in self.processes.iter().enumerate() {
            for (r, res) in self.resources.iter().enumerate() {
                if snap.allocation[p][r] > snap.claims[p][r] {
                    return Err(format!(
                        "process '{id}' holds {} of '{}' above its claim of {}",
                        snap.allocation[p][r], res.name, snap.claims[p][r],
                    ));
                }
            }
        }
        Ok(())
    }
}
