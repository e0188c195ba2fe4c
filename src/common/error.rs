//! Error types for the transfer suite
//!
//! Every failure inside a scenario propagates to the runner, which reports
//! the message verbatim, so messages carry both expected and observed values.

use std::io;
use thiserror::Error;

/// DevTools replies meaning a node went away between lookup and use
const DETACHED_NODE_MESSAGES: &[&str] = &[
    "Could not find node with given id",
    "No node with given id found",
    "Node is detached from document",
    "Cannot find context with specified id",
];

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the transfer suite
#[derive(Error, Debug)]
pub enum Error {
    // === Assertion Errors ===
    #[error("Assertion failed: expected '{expected}', got '{actual}'")]
    Assertion { expected: String, actual: String },

    #[error("Balance mismatch: {0}")]
    BalanceMismatch(String),

    #[error("{0} scenario(s) failed")]
    ScenariosFailed(usize),

    // === Page / Element Errors ===
    #[error("Element '{selector}' not found after waiting {waited_ms} ms")]
    ElementNotFound { selector: String, waited_ms: u64 },

    #[error("Cannot parse balance from '{0}'")]
    BalanceParse(String),

    #[error("Card '{0}' is not shown on the dashboard")]
    CardNotShown(String),

    // === Navigation Errors ===
    #[error("Cannot {action} while on the {state} page")]
    InvalidState { action: String, state: String },

    // === Test Data Errors ===
    #[error("Cannot generate a valid amount for balance {0}: balance must be greater than 1")]
    InsufficientBalance(i64),

    #[error("Cannot generate an amount above balance {0}: no larger amount exists")]
    AmountOverflow(i64),

    // === Browser Errors ===
    #[error("Browser protocol error: {0}")]
    Cdp(#[from] chromiumoxide::error::CdpError),

    #[error("Failed to start browser: {0}")]
    BrowserLaunch(String),

    #[error("Failed to open '{url}': {reason}")]
    Navigation { url: String, reason: String },

    #[error("Element '{0}' is no longer attached to the page")]
    StaleElement(String),

    #[error("Browser session is closed")]
    SessionClosed,

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an assertion error from an expected and an observed value
    pub fn assertion(expected: impl ToString, actual: impl ToString) -> Self {
        Self::Assertion {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create an invalid state error
    pub fn invalid_state(action: &str, state: &str) -> Self {
        Self::InvalidState {
            action: action.to_string(),
            state: state.to_string(),
        }
    }

    /// Create an element not found error
    pub fn element_not_found(selector: &str, waited_ms: u64) -> Self {
        Self::ElementNotFound {
            selector: selector.to_string(),
            waited_ms,
        }
    }

    /// Whether the error means "the element is not there (yet)"
    ///
    /// Wait loops keep polling on these and give up on everything else.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::ElementNotFound { .. } | Self::CardNotShown(_) | Self::StaleElement(_) => true,
            Self::Cdp(e) => {
                let message = e.to_string();
                DETACHED_NODE_MESSAGES.iter().any(|m| message.contains(m))
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assertion_message_names_both_sides() {
        let e = Error::assertion("Поле 'Сумма' не заполнено", "Ошибка! Произошла ошибка");
        let msg = e.to_string();
        assert!(msg.contains("expected 'Поле 'Сумма' не заполнено'"));
        assert!(msg.contains("got 'Ошибка! Произошла ошибка'"));
    }

    #[test]
    fn test_not_found_classification() {
        assert!(Error::element_not_found("#x", 0).is_not_found());
        assert!(Error::StaleElement("e7".to_string()).is_not_found());
        assert!(!Error::SessionClosed.is_not_found());
        assert!(!Error::InsufficientBalance(1).is_not_found());
        assert!(!Error::Navigation {
            url: "http://localhost:1".to_string(),
            reason: "net::ERR_CONNECTION_REFUSED".to_string(),
        }
        .is_not_found());
    }
}
