//! E2E Test Runner
//!
//! Reads YAML scenario suites and executes them through the page objects,
//! against either Chrome or the simulated bank.

mod config;
mod runner;

pub use config::*;
pub use runner::{Runner, SuiteReport, TestResult};
