//! CLI command definitions
//!
//! Defines the clap commands for the transfer suite CLI.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run a scenario suite (the built-in money transfer suite by default)
    Run {
        /// Path to a YAML suite file
        suite: Option<PathBuf>,

        /// Run only the named scenario; can be given multiple times
        #[arg(long, short)]
        only: Vec<String>,

        /// Run against the in-memory bank instead of Chrome
        #[arg(long)]
        simulate: bool,

        /// Verbose output
        #[arg(long, short)]
        verbose: bool,
    },

    /// List the scenarios of a suite
    List {
        /// Path to a YAML suite file
        suite: Option<PathBuf>,
    },

    /// Show the effective configuration
    Config {
        /// Print only the default config file location
        #[arg(long)]
        path: bool,
    },
}
