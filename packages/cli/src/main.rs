#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line driver for crime rate reconciliation.
//!
//! ```text
//! livability reconcile --input raw.csv --output places.csv [--secondary alt.csv] [--config engine.toml] [--by-state]
//! livability normalize --input raw.csv --output typed.csv
//! livability baseline [--config engine.toml]
//! ```
//!
//! Running `livability` with no subcommand enters interactive mode.
//!
//! Uses `indicatif-log-bridge` (via [`livability_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and progress bars never fight for the terminal.

mod commands;
mod interactive;
mod table;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::ReconcileOptions;

#[derive(Parser)]
#[command(
    name = "livability",
    about = "Fill missing per-place crime rates from neighbors and national baselines"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize, reconcile and write a complete place table
    Reconcile {
        /// Raw scraped places CSV
        #[arg(long)]
        input: PathBuf,
        /// Destination CSV (replaced)
        #[arg(long)]
        output: PathBuf,
        /// Alternate-source CSV used to fill gaps before reconciliation
        #[arg(long)]
        secondary: Option<PathBuf>,
        /// Engine config TOML overriding the embedded defaults
        #[arg(long)]
        config: Option<PathBuf>,
        /// Reconcile each state on its own thread
        #[arg(long)]
        by_state: bool,
    },
    /// Normalize a raw table without filling crime rates
    Normalize {
        /// Raw scraped places CSV
        #[arg(long)]
        input: PathBuf,
        /// Destination CSV (replaced)
        #[arg(long)]
        output: PathBuf,
    },
    /// Print the national baseline and engine parameters
    Baseline {
        /// Engine config TOML overriding the embedded defaults
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = livability_cli_utils::init_logger();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive::run(&multi);
    };

    match command {
        Commands::Reconcile {
            input,
            output,
            secondary,
            config,
            by_state,
        } => {
            let options = ReconcileOptions {
                input,
                output,
                secondary,
                config,
                by_state,
            };
            commands::reconcile(&options, &multi)?;
        }
        Commands::Normalize { input, output } => commands::normalize(&input, &output)?,
        Commands::Baseline { config } => commands::baseline(config.as_deref())?,
    }

    Ok(())
}
