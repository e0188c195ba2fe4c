//! CLI command handling
//!
//! Dispatches CLI commands and formats their output.

use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::{paths, Error, Result};
use crate::driver::{ChromeFactory, SessionFactory, SimulatedBank};
use crate::testing::{Runner, TestSuite};

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, config_path: Option<PathBuf>) -> Result<()> {
    let config = Config::load(config_path.as_deref())?;

    match command {
        Commands::Run {
            suite,
            only,
            simulate,
            verbose,
        } => {
            let suite = load_suite(suite.as_deref())?;

            let factory: Box<dyn SessionFactory> = if simulate {
                Box::new(SimulatedBank::with_default_balances(
                    config.target.base_url.clone(),
                    &config.fixtures,
                ))
            } else {
                Box::new(ChromeFactory::new(config.chrome.clone(), config.timeouts.clone()))
            };

            let runner = Runner::new(factory.as_ref(), &config, verbose);
            let report = runner.run_suite(&suite, &only).await?;

            if report.all_passed() {
                Ok(())
            } else {
                Err(Error::ScenariosFailed(report.failed()))
            }
        }

        Commands::List { suite } => {
            let suite = load_suite(suite.as_deref())?;

            println!("{}", suite.name.white().bold());
            if let Some(desc) = &suite.description {
                println!("  {}", desc.dimmed());
            }
            for scenario in &suite.scenarios {
                println!("  - {} ({} steps)", scenario.name, scenario.steps.len());
                if let Some(desc) = &scenario.description {
                    println!("      {}", desc.dimmed());
                }
            }
            Ok(())
        }

        Commands::Config { path } => {
            if path {
                match paths::config_path() {
                    Some(p) => println!("{}", p.display()),
                    None => println!("No configuration directory on this platform"),
                }
                return Ok(());
            }

            let rendered = toml::to_string_pretty(&config)
                .map_err(|e| Error::Config(format!("Failed to render configuration: {}", e)))?;
            println!("{}", rendered);
            Ok(())
        }
    }
}

fn load_suite(path: Option<&Path>) -> Result<TestSuite> {
    match path {
        Some(path) => TestSuite::load(path),
        None => TestSuite::builtin(),
    }
}
