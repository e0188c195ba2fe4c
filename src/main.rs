//! Money transfer E2E suite
//!
//! Runs login, verification and card-to-card transfer scenarios against the
//! bank web application and prints a pass/fail report.

use std::path::PathBuf;

use clap::Parser;
use commands::Commands;
use transfer::common::logging;
use transfer::{cli, commands};

#[derive(Parser)]
#[command(name = "transfer-e2e", about = "E2E scenarios for the money transfer web UI")]
#[command(version, long_about = None)]
struct Cli {
    /// Configuration file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Run { verbose: true, .. });
    logging::init_cli(verbose);

    if let Err(e) = cli::dispatch(cli.command, cli.config).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
