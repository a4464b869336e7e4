// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and shared terminal rendering.

pub mod check;
pub mod demo;
pub mod run;
pub mod state;
pub mod stress;

use banker::vector::format_units;
use banker::{Banker, Verdict};
use simulator::{ScenarioConfig, StepOutcome, Transcript};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// With no `-v` flags, `RUST_LOG` is honoured and defaults to `warn`.
/// Each `-v` raises the level: info, debug, trace.
pub fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads a scenario file with a readable error.
pub fn load_scenario(path: &Path) -> anyhow::Result<ScenarioConfig> {
    tracing::debug!("loading scenario from {}", path.display());
    ScenarioConfig::from_file(path)
        .map_err(|e| anyhow::anyhow!("failed to load scenario '{}': {e}", path.display()))
}

// ── Rendering ──────────────────────────────────────────────────

pub fn print_header(title: &str) {
    println!("╔══════════════════════════════════════════════════════╗");
    println!("║{:^54}║", title);
    println!("╚══════════════════════════════════════════════════════╝");
    println!();
}

/// Resource table with a utilisation bar per row.
pub fn print_resources(banker: &Banker) {
    println!("  Resources");
    if banker.num_resources() == 0 {
        println!("   (none defined)");
        println!();
        return;
    }
    println!(
        "   {:<14} {:>7} {:>7} {:>7} {:>7}  {}",
        "Name", "Total", "Free", "Held", "Util.", "",
    );
    println!("   {}", "-".repeat(68));
    for res in banker.resources() {
        println!(
            "   {:<14} {:>7} {:>7} {:>7} {:>6.1}%  {}",
            truncate(&res.name, 14),
            res.total,
            res.available,
            res.allocated,
            res.utilization_percent(),
            usage_bar(res.utilization()),
        );
    }
    println!();
}

/// Claim, allocation and need rows per process.
pub fn print_processes(banker: &Banker) {
    println!("  Processes");
    if banker.num_processes() == 0 {
        println!("   (none registered)");
        println!();
        return;
    }
    println!(
        "   {:<10} {:<20} {:<20} {:<20}",
        "Id", "Max claim", "Allocation", "Need",
    );
    println!("   {}", "-".repeat(72));
    for process in banker.processes() {
        let mark = if process.is_satisfied() { " *" } else { "" };
        println!(
            "   {:<10} {:<20} {:<20} {:<20}{mark}",
            truncate(&process.id, 10),
            format_units(&process.max_claim),
            format_units(&process.allocation),
            format_units(&process.need),
        );
    }
    println!();
}

pub fn print_verdict(verdict: &Verdict) {
    if verdict.safe {
        println!("  State: SAFE   sequence {}", verdict.sequence_display());
    } else {
        println!("  State: UNSAFE");
    }
}

/// One row per replayed step.
pub fn print_transcript(transcript: &Transcript) {
    println!(
        "  {:<4} {:<34} {:<20} {:>8}  {}",
        "#", "Step", "Outcome", "µs", "Sequence after",
    );
    println!("  {}", "-".repeat(90));
    for step in &transcript.steps {
        let elapsed = step
            .elapsed_us
            .map(|us| us.to_string())
            .unwrap_or_else(|| "-".to_string());
        let flag = if step.matched { "" } else { "  ← unexpected" };
        println!(
            "  {:<4} {:<34} {:<20} {:>8}  {}{flag}",
            step.index,
            truncate(&step.description, 34),
            step.outcome.label(),
            elapsed,
            step.verdict.sequence_display(),
        );
        if let StepOutcome::Denied { message, .. } = &step.outcome {
            println!("       {message}");
        }
    }
    println!();
}

/// Creates a visual usage bar (0.0-1.0 scale).
pub fn usage_bar(ratio: f64) -> String {
    let filled = (ratio * 20.0).round() as usize;
    let filled = filled.min(20);
    let empty = 20 - filled;
    let symbol = if ratio >= 0.9 {
        "#"
    } else if ratio >= 0.7 {
        "="
    } else {
        "-"
    };
    format!("[{}{}]", symbol.repeat(filled), ".".repeat(empty))
}

/// Truncates a string to `max_len` characters, adding "..." if needed.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{head}...")
    }
}
