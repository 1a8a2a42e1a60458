//! Ignition CLI
//!
//! Command-line front end for replaying vehicle access-control scenarios and
//! checking vehicle configuration files.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use ignition_cli::handlers::{handle_check_config, handle_run};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ignition")]
#[command(about = "Ignition - Owner, authority, and permit gating for engine start", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a scenario file against a freshly deployed vehicle
    Run {
        /// Scenario file (TOML)
        scenario: PathBuf,

        /// Vehicle config file (TOML); defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the full report, including final state, as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a vehicle config file
    CheckConfig {
        /// Vehicle config file (TOML)
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Commands::Run {
            scenario,
            config,
            json,
        } => {
            let report = handle_run(&scenario, config.as_deref(), json, &mut stdout)?;
            let failed = report.failed_expectations().count();
            if failed > 0 {
                bail!("{failed} expectation(s) not met in {}", scenario.display());
            }
        }

        Commands::CheckConfig { path } => {
            handle_check_config(&path, &mut stdout)?;
        }
    }

    Ok(())
}
