// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `banker run` command: replay a scenario file and print its transcript.

use super::{load_scenario, print_header, print_transcript, print_verdict};
use simulator::ScenarioRunner;
use std::path::PathBuf;

pub async fn execute(scenario: PathBuf, strict: bool, json: bool) -> anyhow::Result<()> {
    let mut config = load_scenario(&scenario)?;
    config.runner.strict |= strict;

    let runner = ScenarioRunner::new(config);
    let (transcript, _) = runner.run_fresh()?;

    if json {
        println!("{}", transcript.to_json()?);
        return Ok(());
    }

    print_header(&format!("banker · {}", runner.config().name));
    if let Some(description) = &runner.config().description {
        println!("  {description}");
        println!();
    }
    print_transcript(&transcript);
    print_verdict(&transcript.final_verdict);
    println!();
    println!("{}", transcript.summary());
    println!("{}", transcript.stats.summary());

    let mismatches = transcript.mismatches().len();
    if mismatches > 0 {
        anyhow::bail!("{mismatches} step(s) did not match their expectation");
    }
    Ok(())
}
