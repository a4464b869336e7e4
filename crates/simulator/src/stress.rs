// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Concurrent stress driver.
//!
//! Spawns one tokio task per client. Each client owns one process and, using
//! its own seeded RNG, alternates random requests and releases against a
//! single [`SharedBanker`]. Every operation runs under the shared lock, so
//! the engine sees a serial history however the tasks interleave.
//!
//! ```text
//!   client 0 ──┐
//!   client 1 ──┼──► SharedBanker (one lock) ──► audit after every op
//!   client N ──┘
//!                         │
//!                         ▼  join all, drain, final audit
//!                    StressReport
//! ```

use crate::{SharedBanker, SimulatorError};
use banker::{ArbiterStats, Banker, ErrorKind, Verdict};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Parameters for a stress run.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StressConfig {
    /// Number of concurrent clients (one process each).
    pub clients: usize,
    /// Operations issued by each client.
    pub ops_per_client: usize,
    /// Base seed. Claims are drawn from `seed`; client `i` uses `seed + i + 1`.
    pub seed: u64,
    /// Number of resource types.
    pub resources: usize,
    /// Units of each resource type.
    pub units_per_resource: i64,
    /// Run the store audit after every operation, not only at the end.
    pub audit_each_op: bool,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            clients: 8,
            ops_per_client: 200,
            seed: 42,
            resources: 3,
            units_per_resource: 10,
            audit_each_op: true,
        }
    }
}

/// Outcome of a stress run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StressReport {
    pub clients: usize,
    /// Operations issued across all clients (excluding the final drain).
    pub operations: u64,
    pub granted: u64,
    pub released: u64,
    /// Refusals by kind.
    pub denials: BTreeMap<ErrorKind, u64>,
    /// Verdict after every client drained its holdings.
    pub final_verdict: Verdict,
    /// Engine statistics at the end of the run.
    pub stats: ArbiterStats,
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
}

impl StressReport {
    /// Operations per second over the whole run.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.operations as f64 / secs
    }

    /// Returns a human-readable summary suitable for CLI output.
    pub fn summary(&self) -> String {
        let denials: u64 = self.denials.values().sum();
        format!(
            "Stress: {} clients, {} ops in {:.2}ms ({:.0} ops/s), \
             {} granted, {} released, {} denied (would-deadlock: {}), final state {}",
            self.clients,
            self.operations,
            self.elapsed.as_secs_f64() * 1000.0,
            self.throughput(),
            self.granted,
            self.released,
            denials,
            self.denials.get(&ErrorKind::WouldDeadlock).copied().unwrap_or(0),
            if self.final_verdict.safe { "safe" } else { "UNSAFE" },
        )
    }
}

mod duration_ms {
    use std::time::Duration;

    pub fn serialize<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64() * 1000.0)
    }
}

#[derive(Debug, Default)]
struct ClientTally {
    operations: u64,
    granted: u64,
    released: u64,
    denials: BTreeMap<ErrorKind, u64>,
}

/// Runs a stress session against a fresh engine.
pub async fn run_stress(config: &StressConfig) -> Result<StressReport, SimulatorError> {
    if config.clients == 0 || config.resources == 0 || config.units_per_resource <= 0 {
        return Err(SimulatorError::Config(
            "stress run needs at least one client, one resource and one unit".to_string(),
        ));
    }

    let shared = SharedBanker::from_banker(build_system(config)?);
    tracing::info!(
        "stress run: {} clients × {} ops, {} resources × {} units, seed {}",
        config.clients,
        config.ops_per_client,
        config.resources,
        config.units_per_resource,
        config.seed,
    );

    let start = Instant::now();
    let handles: Vec<_> = (0..config.clients)
        .map(|c| {
            let shared = shared.clone();
            let config = config.clone();
            tokio::spawn(async move { run_client(c, shared, config).await })
        })
        .collect();

    let mut report = StressReport {
        clients: config.clients,
        operations: 0,
        granted: 0,
        released: 0,
        denials: BTreeMap::new(),
        final_verdict: Verdict::empty(),
        stats: ArbiterStats::default(),
        elapsed: Duration::ZERO,
    };
    for (client, handle) in handles.into_iter().enumerate() {
        let tally = handle
            .await
            .map_err(|e| SimulatorError::ClientFailed {
                client,
                detail: e.to_string(),
            })??;
        report.operations += tally.operations;
        report.granted += tally.granted;
        report.released += tally.released;
        for (kind, n) in tally.denials {
            *report.denials.entry(kind).or_insert(0) += n;
        }
    }
    report.elapsed = start.elapsed();

    let (verdict, stats) = shared.with(|banker| -> Result<_, SimulatorError> {
        drain(banker)?;
        audit(banker)?;
        let free: Vec<_> = banker
            .resources()
            .into_iter()
            .filter(|r| r.available != r.total)
            .map(|r| r.name)
            .collect();
        if !free.is_empty() {
            return Err(SimulatorError::InvariantViolated(format!(
                "units not returned after drain: {}",
                free.join(", ")
            )));
        }
        Ok((banker.verdict().clone(), banker.stats().clone()))
    })?;
    report.final_verdict = verdict;
    report.stats = stats;

    tracing::info!("{}", report.summary());
    Ok(report)
}

/// Defines the resources and registers one process per client, with claims
/// drawn from the base seed.
fn build_system(config: &StressConfig) -> Result<Banker, SimulatorError> {
    let mut banker = Banker::new();
    let mut rng = StdRng::seed_from_u64(config.seed);
    for r in 0..config.resources {
        banker.define_resource(&format!("R{r}"), config.units_per_resource)?;
    }
    for c in 0..config.clients {
        let claim: Vec<i64> = (0..config.resources)
            .map(|_| rng.gen_range(0..=config.units_per_resource))
            .collect();
        banker.register_process(&client_id(c), &claim)?;
    }
    Ok(banker)
}

fn client_id(c: usize) -> String {
    format!("C{c}")
}

async fn run_client(
    client: usize,
    shared: SharedBanker,
    config: StressConfig,
) -> Result<ClientTally, SimulatorError> {
    let id = client_id(client);
    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(client as u64 + 1));
    let mut tally = ClientTally::default();

    for _ in 0..config.ops_per_client {
        let want_request = rng.gen_bool(0.6);
        let outcome = shared.with(|banker| -> Result<_, SimulatorError> {
            let view = banker.process(&id).ok_or_else(|| SimulatorError::ClientFailed {
                client,
                detail: format!("process {id} vanished"),
            })?;
            let outcome = if want_request {
                let amounts: Vec<i64> = view
                    .need
                    .iter()
                    .map(|&n| rng.gen_range(0..=n) as i64)
                    .collect();
                banker.request(&id, &amounts).map(|_| true)
            } else {
                let amounts: Vec<i64> = view
                    .allocation
                    .iter()
                    .map(|&held| rng.gen_range(0..=held) as i64)
                    .collect();
                banker.release(&id, &amounts).map(|_| false)
            };
            if config.audit_each_op {
                audit(banker)?;
            }
            Ok(outcome)
        })?;

        tally.operations += 1;
        match outcome {
            Ok(true) => tally.granted += 1,
            Ok(false) => tally.released += 1,
            Err(e) => *tally.denials.entry(e.kind()).or_insert(0) += 1,
        }
        tokio::task::yield_now().await;
    }

    tracing::debug!(
        "client {id} done: {} granted, {} released",
        tally.granted,
        tally.released
    );
    Ok(tally)
}

/// Releases everything every process holds.
fn drain(banker: &mut Banker) -> Result<(), SimulatorError> {
    for view in banker.processes() {
        let held: Vec<i64> = view.allocation.iter().map(|&u| u as i64).collect();
        banker.release(&view.id, &held)?;
    }
    Ok(())
}

fn audit(banker: &Banker) -> Result<(), SimulatorError> {
    banker
        .store()
        .audit()
        .map_err(SimulatorError::InvariantViolated)?;
    if !banker.check_safety().safe {
        return Err(SimulatorError::InvariantViolated(
            "committed state is unsafe".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_small_run_stays_consistent() {
        let config = StressConfig {
            clients: 4,
            ops_per_client: 50,
            ..StressConfig::default()
        };
        let report = run_stress(&config).await.unwrap();
        assert_eq!(report.operations, 200);
        assert!(report.final_verdict.safe);
        assert_eq!(report.stats.requests + report.stats.releases, 200 + 4);
    }

    #[test]
    fn test_build_system_is_seeded() {
        let config = StressConfig {
            clients: 3,
            resources: 2,
            ..StressConfig::default()
        };
        let a = build_system(&config).unwrap();
        let b = build_system(&config).unwrap();
        assert_eq!(a.snapshot(), b.snapshot());
        assert_eq!(a.num_processes(), 3);
        assert!(a.resources().iter().all(|r| r.total == 10 && r.available == 10));
    }

    #[tokio::test]
    async fn test_rejects_empty_config() {
        let config = StressConfig {
            clients: 0,
            ..StressConfig::default()
        };
        assert!(matches!(
            run_stress(&config).await,
            Err(SimulatorError::Config(_))
        ));
    }

    #[test]
    fn test_summary_format() {
        let mut denials = BTreeMap::new();
        denials.insert(ErrorKind::WouldDeadlock, 3);
        let report = StressReport {
            clients: 2,
            operations: 10,
            granted: 5,
            released: 2,
            denials,
            final_verdict: Verdict::empty(),
            stats: ArbiterStats::default(),
            elapsed: Duration::from_millis(5),
        };
        let s = report.summary();
        assert!(s.contains("2 clients"));
        assert!(s.contains("would-deadlock: 3"));
        assert!(s.contains("final state safe"));
    }
}
