// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `banker check` command: would this request be granted?

use super::{load_scenario, print_header, print_processes, print_verdict};
use banker::vector::parse_amounts;
use banker::Verdict;
use simulator::ScenarioRunner;
use std::path::PathBuf;

pub async fn execute(scenario: PathBuf, process: String, amounts: String) -> anyhow::Result<()> {
    let amounts = parse_amounts(&amounts)?;
    let config = load_scenario(&scenario)?;
    let (_, banker) = ScenarioRunner::new(config).run_fresh()?;

    print_header("banker · request preview");
    print_processes(&banker);
    println!("  Request: {process} {amounts:?}");
    match banker.evaluate_request(&process, &amounts) {
        Ok(sequence) => {
            println!("  Result:  would be GRANTED");
            print_verdict(&Verdict {
                safe: true,
                sequence,
            });
        }
        Err(e) => {
            println!("  Result:  would be DENIED ({})", e.kind());
            println!("           {e}");
        }
    }
    Ok(())
}
