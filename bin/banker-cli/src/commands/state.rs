// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `banker state` command: replay a scenario, then show the tables it
//! leaves behind (resources with utilisation, claim/allocation/need rows,
//! the safety verdict and arbitration statistics).

use super::{load_scenario, print_header, print_processes, print_resources, print_verdict};
use simulator::ScenarioRunner;
use std::path::PathBuf;

pub async fn execute(scenario: PathBuf) -> anyhow::Result<()> {
    let config = load_scenario(&scenario)?;
    let name = config.name.clone();
    let (transcript, banker) = ScenarioRunner::new(config).run_fresh()?;

    print_header(&format!("banker · state after '{name}'"));
    println!(
        "  {} steps replayed ({} succeeded, {} denied)",
        transcript.steps.len(),
        transcript.succeeded(),
        transcript.denied(),
    );
    println!();

    print_resources(&banker);
    print_processes(&banker);
    print_verdict(banker.verdict());
    println!();
    println!("{}", banker.stats().summary());
    Ok(())
}
