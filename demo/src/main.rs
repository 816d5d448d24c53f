//! RiskWatch Hospital Reference Runtime - Demo CLI
//!
//! Runs one or all of the five recalculation scenarios, or scores a single
//! risk-input document with the v2.0.1 model.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- worked-example
//!   cargo run -p demo -- concurrent-writes
//!   cargo run -p demo -- score --input patient.json --at 2026-10-16
//!   cat patient.json | cargo run -p demo -- score --tables custom.toml
//!   cargo run -p demo -- health-score --input habits.json

use std::{
    io::Read,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use riskwatch_contracts::{
    error::{RiskwatchError, RiskwatchResult},
    health::HealthScoreInput,
};
use riskwatch_core::traits::HealthScorer;
use riskwatch_model::{HealthScoreModel, ModelTables, RiskModel};
use riskwatch_ref_hospital::scenarios::{
    bulk_delete, concurrent_writes, degraded_input, lab_lifecycle, worked_example,
};

// ── CLI definition ────────────────────────────────────────────────────────────

/// RiskWatch - patient risk recalculation demo.
///
/// Each scenario subcommand wires a fresh in-memory hospital runtime and
/// shows how mutations trigger, coalesce and journal risk recomputes.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "RiskWatch hospital reference runtime demo",
    long_about = "Runs RiskWatch recalculation scenarios showing event-driven recomputes,\n\
                  per-patient coalescing, snapshot verification and journal integrity."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all five scenarios in sequence.
    RunAll,
    /// Scenario 1: the reference patient scored end to end.
    WorkedExample,
    /// Scenario 2: create, patch, revise and delete a lab report.
    LabLifecycle,
    /// Scenario 3: bulk lab deletion across two patients.
    BulkDelete,
    /// Scenario 4: concurrent lab writes for one patient.
    ConcurrentWrites,
    /// Scenario 5: an unparsable date of birth.
    DegradedInput,
    /// Score one risk-input JSON document and print the assessment.
    Score {
        /// Path to the document, or `-` for stdin.
        #[arg(long, default_value = "-")]
        input: String,
        /// TOML file replacing the standard lookup tables.
        #[arg(long)]
        tables: Option<PathBuf>,
        /// Evaluation date (YYYY-MM-DD); defaults to now.
        #[arg(long)]
        at: Option<String>,
    },
    /// Compute the lifestyle-aware health score of one JSON document.
    HealthScore {
        /// Path to the document, or `-` for stdin.
        #[arg(long, default_value = "-")]
        input: String,
        /// Evaluation date (YYYY-MM-DD); defaults to now.
        #[arg(long)]
        at: Option<String>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Score { input, tables, at } => score(&input, tables.as_deref(), at.as_deref()),
        Command::HealthScore { input, at } => health_score(&input, at.as_deref()),
        scenario => {
            print_banner();
            run_scenarios(scenario).map(|()| {
                println!("All selected scenarios completed successfully.");
            })
        }
    };

    if let Err(e) = result {
        eprintln!("Demo error: {}", e);
        std::process::exit(1);
    }
}

// ── Scenario dispatch ─────────────────────────────────────────────────────────

fn run_scenarios(command: Command) -> RiskwatchResult<()> {
    match command {
        Command::RunAll => {
            worked_example::run_scenario()?;
            lab_lifecycle::run_scenario()?;
            bulk_delete::run_scenario()?;
            concurrent_writes::run_scenario()?;
            degraded_input::run_scenario()
        }
        Command::WorkedExample => worked_example::run_scenario(),
        Command::LabLifecycle => lab_lifecycle::run_scenario(),
        Command::BulkDelete => bulk_delete::run_scenario(),
        Command::ConcurrentWrites => concurrent_writes::run_scenario(),
        Command::DegradedInput => degraded_input::run_scenario(),
        Command::Score { .. } | Command::HealthScore { .. } => Ok(()),
    }
}

// ── Score ─────────────────────────────────────────────────────────────────────

fn score(input: &str, tables: Option<&Path>, at: Option<&str>) -> RiskwatchResult<()> {
    let model = match tables {
        Some(path) => RiskModel::with_tables(ModelTables::from_file(path)?),
        None => RiskModel::new(),
    };
    let now = evaluation_time(at)?;

    let raw = read_input(input)?;
    let doc: Value = serde_json::from_str(&raw).map_err(|e| RiskwatchError::InvalidInput {
        reason: format!("risk input is not JSON: {}", e),
    })?;
    debug!(input, at = %now, "scoring document");

    let assessment = model.evaluate_document(&doc, now);
    let rendered =
        serde_json::to_string_pretty(&assessment).map_err(|e| RiskwatchError::InvalidInput {
            reason: format!("could not render assessment: {}", e),
        })?;
    println!("{}", rendered);
    Ok(())
}

fn health_score(input: &str, at: Option<&str>) -> RiskwatchResult<()> {
    let now = evaluation_time(at)?;
    let raw = read_input(input)?;
    let doc: HealthScoreInput =
        serde_json::from_str(&raw).map_err(|e| RiskwatchError::InvalidInput {
            reason: format!("health score input is malformed: {}", e),
        })?;

    let score = HealthScoreModel::new().score_at(&doc, now);
    let rendered =
        serde_json::to_string_pretty(&score).map_err(|e| RiskwatchError::InvalidInput {
            reason: format!("could not render health score: {}", e),
        })?;
    println!("{}", rendered);
    Ok(())
}

fn read_input(input: &str) -> RiskwatchResult<String> {
    let raw = if input == "-" {
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw).map(|_| raw)
    } else {
        std::fs::read_to_string(input)
    };
    raw.map_err(|e| RiskwatchError::ConfigError {
        reason: format!("cannot read risk input '{}': {}", input, e),
    })
}

/// Midnight UTC of `at`, or the current time.
fn evaluation_time(at: Option<&str>) -> RiskwatchResult<DateTime<Utc>> {
    let Some(at) = at else {
        return Ok(Utc::now());
    };
    NaiveDate::parse_from_str(at, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| RiskwatchError::ConfigError {
            reason: format!("--at must be YYYY-MM-DD, got '{}'", at),
        })
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("RiskWatch - Patient Risk Recalculation");
    println!("Hospital Reference Demo");
    println!("======================================");
    println!();
    println!("Recalculation pipeline per affected patient:");
    println!("  [1] A patient or lab-report mutation commits and fires a risk event");
    println!("  [2] The per-patient gate folds mutations already covered by a recompute");
    println!("  [3] Inputs are gathered from the latest committed patient and lab state");
    println!("  [4] The v2.0.1 model scores them; bad input degrades to Unknown");
    println!("  [5] The verifier checks the snapshot before it is persisted");
    println!("  [6] Each persisted snapshot is appended to a SHA-256 journal chain");
    println!();
}
