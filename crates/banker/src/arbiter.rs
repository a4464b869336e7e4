// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The request/release arbiter.
//!
//! [`Banker`] owns a [`StateStore`] and is the only type that mutates
//! committed allocation state. Requests follow a trial/commit protocol:
//!
//! ```text
//! request(p, amounts)
//!     │  preconditions (no mutation)
//!     ▼
//!   trial = committed.clone()  ──► apply amounts ──► oracle::check(trial)
//!     │                                                  │
//!     │ safe                                             │ unsafe
//!     ▼                                                  ▼
//!   store.commit(trial)                     drop(trial), Err(WouldDeadlock)
//! ```
//!
//! Releases skip the veto: returning units never lowers any process's
//! chance to finish, so the oracle runs afterwards only to refresh the
//! reported sequence.

use crate::oracle::{self, SafetyVerdict};
use crate::store::{Snapshot, StateStore};
use crate::vector::{validate_amounts, Units};
use crate::view::{ProcessView, ResourceView, Verdict};
use crate::{ArbiterStats, BankerError};

/// A safe completion order, as process ids.
pub type SafeSequence = Vec<String>;

/// The allocation engine: state store, safety oracle and arbiter in one
/// owned value.
///
/// There is no global state; independent `Banker`s can coexist. The type is
/// single-writer (`&mut self` for every mutation); share it across threads
/// behind one lock.
///
/// # Example
/// ```
/// use banker::{Banker, ErrorKind};
///
/// let mut banker = Banker::new();
/// banker.define_resource("R", 10).unwrap();
/// banker.register_process("P1", &[10]).unwrap();
/// banker.register_process("P2", &[4]).unwrap();
///
/// banker.request("P1", &[5]).unwrap();
/// banker.request("P2", &[2]).unwrap();
///
/// // Granting two more units to P1 would leave nobody able to finish.
/// let err = banker.request("P1", &[2]).unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::WouldDeadlock);
/// assert_eq!(banker.resources()[0].available, 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Banker {
    store: StateStore,
    verdict: Verdict,
    stats: ArbiterStats,
}

impl Banker {
    /// Creates an empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    // ── State store entry points ───────────────────────────────

    /// Defines a resource type with `total_units` units.
    ///
    /// Existing processes get a zero claim for the new resource, so the
    /// current verdict stays valid.
    pub fn define_resource(&mut self, name: &str, total_units: i64) -> Result<(), BankerError> {
        match self.store.define_resource(name, total_units) {
            Ok(()) => {
                tracing::info!(resource = name.trim(), total_units, "resource defined");
                self.refresh_verdict();
                Ok(())
            }
            Err(e) => Err(self.reject("define_resource", e)),
        }
    }

    /// Registers a process with its maximum claim vector.
    pub fn register_process(&mut self, id: &str, max_claim: &[i64]) -> Result<(), BankerError> {
        match self.store.register_process(id, max_claim) {
            Ok(()) => {
                tracing::info!(process = id.trim(), ?max_claim, "process registered");
                self.refresh_verdict();
                Ok(())
            }
            Err(e) => Err(self.reject("register_process", e)),
        }
    }

    /// Destroys every resource, process and matrix, and clears statistics.
    pub fn reset(&mut self) {
        *self = Self::default();
        tracing::info!("engine reset");
    }

    // ── Arbiter entry points ───────────────────────────────────

    /// Asks for `amounts` additional units on behalf of `process_id`.
    ///
    /// On success the request is committed and the new safe sequence is
    /// returned. On any error, committed state is untouched.
    pub fn request(
        &mut self,
        process_id: &str,
        amounts: &[i64],
    ) -> Result<SafeSequence, BankerError> {
        self.stats.record_request();
        let outcome = self.trial_request(process_id, amounts);
        if matches!(outcome, Ok(_) | Err(BankerError::WouldDeadlock(_))) {
            self.stats.record_safety_check();
        }

        match outcome {
            Ok((trial, verdict)) => {
                self.store.commit(trial);
                let sequence = self.apply_verdict(&verdict);
                let held = self.total_allocated();
                self.stats.record_grant();
                self.stats.update_peak(held);
                tracing::info!(
                    process = process_id,
                    ?amounts,
                    sequence = %self.verdict.sequence_display(),
                    "request granted"
                );
                Ok(sequence)
            }
            Err(e) => Err(self.reject("request", e)),
        }
    }

    /// Evaluates a request without committing it.
    ///
    /// Returns exactly what [`request`](Self::request) would return, but
    /// leaves state and statistics untouched.
    pub fn evaluate_request(
        &self,
        process_id: &str,
        amounts: &[i64],
    ) -> Result<SafeSequence, BankerError> {
        let (_, verdict) = self.trial_request(process_id, amounts)?;
        Ok(self.names(&verdict.order))
    }

    /// Returns `amounts` units held by `process_id`.
    ///
    /// Never vetoed by the oracle; only the precondition checks can fail.
    pub fn release(
        &mut self,
        process_id: &str,
        amounts: &[i64],
    ) -> Result<SafeSequence, BankerError> {
        self.stats.record_release();

        match self.prepare_release(process_id, amounts) {
            Ok(next) => {
                self.store.commit(next);
                let verdict = oracle::check(self.store.snapshot());
                self.stats.record_safety_check();
                self.stats.record_released();
                let sequence = self.apply_verdict(&verdict);
                tracing::info!(
                    process = process_id,
                    ?amounts,
                    sequence = %self.verdict.sequence_display(),
                    "units released"
                );
                Ok(sequence)
            }
            Err(e) => Err(self.reject("release", e)),
        }
    }

    // ── Read accessors ─────────────────────────────────────────

    /// Resources with their total, free and held counts.
    pub fn resources(&self) -> Vec<ResourceView> {
        let snap = self.store.snapshot();
        self.store
            .resources()
            .iter()
            .enumerate()
            .map(|(r, res)| ResourceView {
                name: res.name.clone(),
                total: res.total,
                available: snap.available[r],
                allocated: snap.allocated(r),
            })
            .collect()
    }

    /// Processes with their claim, holdings and remaining need.
    pub fn processes(&self) -> Vec<ProcessView> {
        let snap = self.store.snapshot();
        self.store
            .process_ids()
            .iter()
            .enumerate()
            .map(|(p, id)| ProcessView {
                id: id.clone(),
                max_claim: snap.claims[p].clone(),
                allocation: snap.allocation[p].clone(),
                need: snap.need_row(p),
            })
            .collect()
    }

    /// Looks up one process by id.
    pub fn process(&self, id: &str) -> Option<ProcessView> {
        let p = self.store.process_index(id)?;
        let snap = self.store.snapshot();
        Some(ProcessView {
            id: id.to_string(),
            max_claim: snap.claims[p].clone(),
            allocation: snap.allocation[p].clone(),
            need: snap.need_row(p),
        })
    }

    /// The verdict computed by the last state-changing operation.
    pub fn verdict(&self) -> &Verdict {
        &self.verdict
    }

    /// Per-resource utilisation percentages, in definition order.
    pub fn utilization(&self) -> Vec<(String, f64)> {
        self.resources()
            .into_iter()
            .map(|r| {
                let pct = r.utilization_percent();
                (r.name, pct)
            })
            .collect()
    }

    /// Arbitration statistics.
    pub fn stats(&self) -> &ArbiterStats {
        &self.stats
    }

    /// The committed matrices.
    pub fn snapshot(&self) -> &Snapshot {
        self.store.snapshot()
    }

    /// The underlying state store.
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Number of defined resource types.
    pub fn num_resources(&self) -> usize {
        self.store.resources().len()
    }

    /// Number of registered processes.
    pub fn num_processes(&self) -> usize {
        self.store.process_ids().len()
    }

    /// Runs the oracle on the committed state without touching anything.
    pub fn check_safety(&self) -> Verdict {
        let verdict = oracle::check(self.store.snapshot());
        Verdict {
            safe: verdict.safe,
            sequence: self.names(&verdict.order),
        }
    }

    // ── Private helpers ────────────────────────────────────────

    /// Runs every request precondition, then the trial evaluation.
    ///
    /// Per resource, in definition order: free units first, then the claim.
    fn trial_request(
        &self,
        process_id: &str,
        amounts: &[i64],
    ) -> Result<(Snapshot, SafetyVerdict), BankerError> {
        let p = self.lookup(process_id)?;
        let amounts = validate_amounts(amounts, self.num_resources())?;
        let committed = self.store.snapshot();

        for (r, res) in self.store.resources().iter().enumerate() {
            if amounts[r] > committed.available[r] {
                return Err(BankerError::ExceedsAvailable {
                    resource: res.name.clone(),
                    requested: amounts[r],
                    available: committed.available[r],
                });
            }
            let would_hold = committed.allocation[p][r] + amounts[r];
            if would_hold > committed.claims[p][r] {
                return Err(BankerError::ExceedsClaim {
                    process: process_id.to_string(),
                    resource: res.name.clone(),
                    would_hold,
                    claim: committed.claims[p][r],
                });
            }
        }

        let mut trial = committed.clone();
        for (r, &amount) in amounts.iter().enumerate() {
            trial.allocation[p][r] += amount;
            trial.available[r] -= amount;
        }

        let verdict = oracle::check(&trial);
        tracing::debug!(
            process = process_id,
            safe = verdict.safe,
            "trial allocation evaluated"
        );
        if !verdict.safe {
            return Err(BankerError::WouldDeadlock(process_id.to_string()));
        }
        Ok((trial, verdict))
    }

    /// Validates a release and builds the resulting snapshot.
    fn prepare_release(&self, process_id: &str, amounts: &[i64]) -> Result<Snapshot, BankerError> {
        let p = self.lookup(process_id)?;
        let amounts = validate_amounts(amounts, self.num_resources())?;
        let committed = self.store.snapshot();

        for (r, res) in self.store.resources().iter().enumerate() {
            if amounts[r] > committed.allocation[p][r] {
                return Err(BankerError::ExceedsAllocation {
                    process: process_id.to_string(),
                    resource: res.name.clone(),
                    requested: amounts[r],
                    held: committed.allocation[p][r],
                });
            }
        }

        let mut next = committed.clone();
        for (r, &amount) in amounts.iter().enumerate() {
            next.allocation[p][r] -= amount;
            next.available[r] += amount;
        }
        Ok(next)
    }

    fn lookup(&self, process_id: &str) -> Result<usize, BankerError> {
        self.store
            .process_index(process_id)
            .ok_or_else(|| BankerError::UnknownProcess(process_id.trim().to_string()))
    }

    fn names(&self, order: &[usize]) -> SafeSequence {
        let ids = self.store.process_ids();
        order.iter().map(|&p| ids[p].clone()).collect()
    }

    fn apply_verdict(&mut self, verdict: &SafetyVerdict) -> SafeSequence {
        let sequence = self.names(&verdict.order);
        self.verdict = Verdict {
            safe: verdict.safe,
            sequence: sequence.clone(),
        };
        sequence
    }

    fn refresh_verdict(&mut self) {
        let verdict = oracle::check(self.store.snapshot());
        self.stats.record_safety_check();
        self.apply_verdict(&verdict);
    }

    fn total_allocated(&self) -> Units {
        let snap = self.store.snapshot();
        (0..snap.num_resources())
            .map(|r| snap.allocated(r))
            .fold(0, Units::saturating_add)
    }

    fn reject(&mut self, op: &'static str, err: BankerError) -> BankerError {
        self.stats.record_denial(err.kind());
        tracing::warn!(op, kind = %err.kind(), "{err}");
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    /// `{R1: 10, R2: 5}`, `P1 max [7,5]`, `P2 max [3,2]`.
    fn scenario_a() -> Banker {
        let mut b = Banker::new();
        b.define_resource("R1", 10).unwrap();
        b.define_resource("R2", 5).unwrap();
        b.register_process("P1", &[7, 5]).unwrap();
        b.register_process("P2", &[3, 2]).unwrap();
        b
    }

    /// `{R: 10}`, `P1 max 10 alloc 5`, `P2 max 4 alloc 2`, available 3.
    fn scenario_b() -> Banker {
        let mut b = Banker::new();
        b.define_resource("R", 10).unwrap();
        b.register_process("P1", &[10]).unwrap();
        b.register_process("P2", &[4]).unwrap();
        b.request("P1", &[5]).unwrap();
        b.request("P2", &[2]).unwrap();
        b
    }

    #[test]
    fn test_empty_engine() {
        let mut b = Banker::new();
        assert!(b.verdict().safe);
        assert!(b.verdict().sequence.is_empty());
        assert!(b.check_safety().safe);

        let err = b.request("P1", &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownProcess);
        let err = b.release("P1", &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownProcess);
    }

    #[test]
    fn test_scenario_a_grants() {
        let mut b = scenario_a();
        b.request("P1", &[0, 2]).unwrap();
        let seq = b.request("P2", &[2, 0]).unwrap();

        assert!(b.verdict().safe);
        assert_eq!(seq.len(), 2);
        assert!(seq.contains(&"P1".to_string()));
        assert!(seq.contains(&"P2".to_string()));
        assert_eq!(b.verdict().sequence, seq);
        // available (8,3): P1 needs (7,3) → fits first in registration order.
        assert_eq!(seq, vec!["P1".to_string(), "P2".to_string()]);
    }

    #[test]
    fn test_scenario_b_would_deadlock() {
        let mut b = scenario_b();
        let before = b.snapshot().clone();
        let verdict_before = b.verdict().clone();

        let err = b.request("P1", &[2]).unwrap_err();
        assert_eq!(err, BankerError::WouldDeadlock("P1".into()));
        assert_eq!(b.snapshot(), &before);
        assert_eq!(b.verdict(), &verdict_before);
        assert_eq!(b.resources()[0].available, 3);
    }

    #[test]
    fn test_precondition_order_and_kinds() {
        let mut b = scenario_a();

        let err = b.request("P9", &[1, 1]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownProcess);

        let err = b.request("P1", &[1]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedVector);

        let err = b.request("P1", &[-1, 0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedVector);

        let err = b.request("P1", &[0, 6]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExceedsAvailable);

        let err = b.request("P2", &[4, 0]).unwrap_err();
        assert!(matches!(
            err,
            BankerError::ExceedsClaim { would_hold: 4, claim: 3, .. }
        ));
    }

    #[test]
    fn test_failed_requests_leave_no_trace() {
        let mut b = scenario_b();
        let before = b.snapshot().clone();

        let _ = b.request("nobody", &[1]);
        let _ = b.request("P1", &[1, 1]);
        let _ = b.request("P1", &[4]);
        let _ = b.request("P2", &[3]);
        let _ = b.request("P1", &[2]);

        assert_eq!(b.snapshot(), &before);
        assert!(b.store().audit().is_ok());
    }

    #[test]
    fn test_release() {
        let mut b = scenario_b();
        let seq = b.release("P1", &[5]).unwrap();

        assert_eq!(b.resources()[0].available, 8);
        assert_eq!(b.process("P1").unwrap().allocation, vec![0]);
        // P1 now needs all 10 units; P2 must finish first.
        assert_eq!(seq, vec!["P2".to_string(), "P1".to_string()]);
        assert!(b.verdict().safe);
    }

    #[test]
    fn test_release_exceeds_allocation() {
        let mut b = scenario_b();
        let before = b.snapshot().clone();

        let err = b.release("P2", &[3]).unwrap_err();
        assert!(matches!(
            err,
            BankerError::ExceedsAllocation { requested: 3, held: 2, .. }
        ));
        assert_eq!(b.snapshot(), &before);

        assert_eq!(b.release("P2", &[-1]).unwrap_err().kind(), ErrorKind::MalformedVector);
        assert_eq!(b.release("P2", &[]).unwrap_err().kind(), ErrorKind::MalformedVector);
    }

    #[test]
    fn test_define_resource_after_processes() {
        let mut b = scenario_b();
        let seq_before = b.verdict().sequence.clone();

        b.define_resource("R2", 4).unwrap();
        let p1 = b.process("P1").unwrap();
        assert_eq!(p1.max_claim, vec![10, 0]);
        assert_eq!(p1.allocation, vec![5, 0]);
        assert!(b.verdict().safe);
        assert_eq!(b.verdict().sequence, seq_before);

        // Existing processes cannot acquire the new resource.
        let err = b.request("P1", &[0, 1]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExceedsClaim);
    }

    #[test]
    fn test_evaluate_request_does_not_commit() {
        let b = scenario_b();
        let before = b.snapshot().clone();

        let preview = b.evaluate_request("P2", &[2]).unwrap();
        assert_eq!(preview, vec!["P2".to_string(), "P1".to_string()]);
        assert_eq!(b.evaluate_request("P1", &[2]).unwrap_err().kind(), ErrorKind::WouldDeadlock);
        assert_eq!(b.snapshot(), &before);
        assert_eq!(b.stats().requests, 2);
    }

    #[test]
    fn test_reset() {
        let mut b = scenario_b();
        b.reset();
        assert_eq!(b.num_resources(), 0);
        assert_eq!(b.num_processes(), 0);
        assert_eq!(b.stats(), &ArbiterStats::default());
        assert_eq!(b.verdict(), &Verdict::empty());
    }

    #[test]
    fn test_stats_and_utilization() {
        let mut b = scenario_b();
        let _ = b.request("P1", &[2]);
        b.release("P2", &[1]).unwrap();

        let stats = b.stats();
        assert_eq!(stats.requests, 3);
        assert_eq!(stats.granted, 2);
        assert_eq!(stats.releases, 1);
        assert_eq!(stats.denials_of(ErrorKind::WouldDeadlock), 1);
        assert_eq!(stats.peak_allocated_units, 7);

        let util = b.utilization();
        assert_eq!(util[0].0, "R");
        assert!((util[0].1 - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_peak_saturates_across_huge_resources() {
        let mut b = Banker::new();
        for name in ["R1", "R2", "R3"] {
            b.define_resource(name, i64::MAX).unwrap();
        }
        b.register_process("P1", &[i64::MAX; 3]).unwrap();

        let seq = b.request("P1", &[i64::MAX; 3]).unwrap();
        assert_eq!(seq, vec!["P1".to_string()]);
        assert_eq!(b.stats().peak_allocated_units, u64::MAX);
        assert!(b.resources().iter().all(|r| r.available == 0));

        b.release("P1", &[i64::MAX; 3]).unwrap();
        assert!(b.store().audit().is_ok());
    }

    #[test]
    fn test_ids_are_trimmed_on_lookup() {
        let mut b = Banker::new();
        b.define_resource(" R ", 4).unwrap();
        b.register_process(" P1 ", &[3]).unwrap();

        b.request(" P1 ", &[2]).unwrap();
        b.release("P1\t", &[1]).unwrap();
        assert_eq!(b.process("  P1").unwrap().allocation, vec![1]);
        assert!(b.evaluate_request(" P1", &[1]).is_ok());

        let err = b.request(" P9 ", &[1]).unwrap_err();
        assert_eq!(err, BankerError::UnknownProcess("P9".to_string()));
    }

    #[test]
    fn test_available_checked_before_claim_per_resource() {
        // R1 has 10 free but P2 may hold only 3; R2 has 5 free and P2 asks 6.
        let mut b = scenario_a();
        let err = b.request("P2", &[4, 6]).unwrap_err();
        assert!(matches!(
            err,
            BankerError::ExceedsClaim { ref resource, would_hold: 4, claim: 3, .. } if resource == "R1"
        ));

        // Only R2 is short of free units; a claim breach on R1 still wins.
        b.request("P1", &[0, 4]).unwrap();
        let err = b.request("P2", &[0, 2]).unwrap_err();
        assert!(matches!(
            err,
            BankerError::ExceedsAvailable { ref resource, requested: 2, available: 1 } if resource == "R2"
        ));
        let err = b.request("P2", &[4, 2]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExceedsClaim);
    }

    #[test]
    fn test_zero_resource_system() {
        let mut b = Banker::new();
        b.register_process("P1", &[]).unwrap();
        b.register_process("P2", &[]).unwrap();
        let seq = b.request("P2", &[]).unwrap();
        assert_eq!(seq, vec!["P1".to_string(), "P2".to_string()]);
    }
}
