// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `banker stress` command: concurrent random clients against one engine.

use super::print_header;
use simulator::{run_stress, StressConfig};

pub async fn execute(
    clients: usize,
    ops: usize,
    seed: u64,
    resources: usize,
    units: i64,
    json: bool,
) -> anyhow::Result<()> {
    let config = StressConfig {
        clients,
        ops_per_client: ops,
        seed,
        resources,
        units_per_resource: units,
        ..StressConfig::default()
    };
    let report = run_stress(&config).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_header("banker · stress");
    println!("  Clients:      {}", report.clients);
    println!("  Operations:   {} ({:.0} ops/s)", report.operations, report.throughput());
    println!("  Granted:      {}", report.granted);
    println!("  Released:     {}", report.released);
    for (kind, n) in &report.denials {
        println!("  Denied:       {n} × {kind}");
    }
    println!(
        "  Final state:  {}",
        if report.final_verdict.safe { "SAFE (all units returned)" } else { "UNSAFE" }
    );
    println!();
    println!("{}", report.summary());
    println!("{}", report.stats.summary());
    Ok(())
}
