// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `banker demo` command: replay the built-in scenarios.

use super::{print_header, print_processes, print_resources, print_transcript, print_verdict};
use simulator::{scenarios, ScenarioRunner};

pub async fn execute(name: Option<String>) -> anyhow::Result<()> {
    let selected = match name {
        Some(name) => vec![scenarios::builtin(&name).ok_or_else(|| {
            anyhow::anyhow!(
                "unknown scenario '{name}' (available: {})",
                scenarios::BUILTIN_NAMES.join(", ")
            )
        })?],
        None => scenarios::all(),
    };

    for config in selected {
        print_header(&format!("banker · demo · {}", config.name));
        if let Some(description) = &config.description {
            println!("  {description}");
            println!();
        }

        let (transcript, banker) = ScenarioRunner::new(config).run_fresh()?;
        print_transcript(&transcript);
        print_resources(&banker);
        print_processes(&banker);
        print_verdict(banker.verdict());
        println!();
    }
    Ok(())
}
