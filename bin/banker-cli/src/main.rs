// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # banker
//!
//! Command-line interface for the banker-rt allocation engine.
//!
//! ## Usage
//! ```bash
//! # Replay a scenario file, stopping at the first unexpected outcome
//! banker run --scenario scenarios/classic-unsafe.toml --strict
//!
//! # Walk through the built-in demonstrations
//! banker demo --name textbook
//!
//! # Show the tables a scenario leaves behind
//! banker state --scenario scenarios/textbook.toml
//!
//! # Preview a request without committing it
//! banker check --scenario scenarios/textbook.toml --process P0 --amounts "0 2 0"
//!
//! # Hammer one engine from many concurrent clients
//! banker stress --clients 16 --ops 1000 --seed 7
//! ```

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "banker",
    about = "Deadlock-avoiding resource allocation with the Banker's safety check",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scenario file and print its transcript.
    Run {
        /// Path to the scenario TOML file.
        #[arg(short, long)]
        scenario: std::path::PathBuf,

        /// Abort on the first step whose outcome contradicts its expectation.
        #[arg(long)]
        strict: bool,

        /// Print the transcript as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Replay built-in demonstration scenarios.
    Demo {
        /// Scenario to run: safe, unsafe, release, extend, textbook (default: all).
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Replay a scenario and display the resulting allocation state.
    State {
        /// Path to the scenario TOML file.
        #[arg(short, long)]
        scenario: std::path::PathBuf,
    },

    /// Preview a request against a scenario's final state without committing it.
    Check {
        /// Path to the scenario TOML file.
        #[arg(short, long)]
        scenario: std::path::PathBuf,

        /// Requesting process id.
        #[arg(short, long)]
        process: String,

        /// Requested units per resource (e.g., "1,0,2" or "[1 0 2]").
        #[arg(short, long)]
        amounts: String,
    },

    /// Run concurrent random clients against one engine and audit the result.
    Stress {
        /// Number of concurrent clients.
        #[arg(long, default_value_t = 8)]
        clients: usize,

        /// Operations per client.
        #[arg(long, default_value_t = 200)]
        ops: usize,

        /// Base RNG seed.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Number of resource types.
        #[arg(long, default_value_t = 3)]
        resources: usize,

        /// Units of each resource type.
        #[arg(long, default_value_t = 10)]
        units: i64,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            scenario,
            strict,
            json,
        } => commands::run::execute(scenario, strict, json).await,
        Commands::Demo { name } => commands::demo::execute(name).await,
        Commands::State { scenario } => commands::state::execute(scenario).await,
        Commands::Check {
            scenario,
            process,
            amounts,
        } => commands::check::execute(scenario, process, amounts).await,
        Commands::Stress {
            clients,
            ops,
            seed,
            resources,
            units,
            json,
        } => commands::stress::execute(clients, ops, seed, resources, units, json).await,
    }
}
