//! Money transfer E2E suite
//!
//! Page objects, test data and a scenario runner for the card-to-card money
//! transfer web application.

pub mod cli;
pub mod commands;
pub mod common;
pub mod data;
pub mod driver;
pub mod page;
pub mod testing;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use data::{AuthInfo, CardInfo, DataHelper, Fixtures};
