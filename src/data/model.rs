//! Value records describing cards and credentials

use serde::{Deserialize, Serialize};

/// A bank card as the transfer form and dashboard see it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardInfo {
    /// Full card number, e.g. `5559 0000 0000 0001`
    pub card_number: String,
    /// Stable UI key of the card (its `data-test-id` on the dashboard)
    pub owner_code: String,
}

impl CardInfo {
    pub fn new(card_number: impl Into<String>, owner_code: impl Into<String>) -> Self {
        Self {
            card_number: card_number.into(),
            owner_code: owner_code.into(),
        }
    }

    /// The card number as the dashboard renders it: `**** **** **** 0001`
    ///
    /// Whitespace is ignored; numbers shorter than four digits are shown in full.
    pub fn masked_number(&self) -> String {
        let digits: Vec<char> = self
            .card_number
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let tail: String = digits[digits.len().saturating_sub(4)..].iter().collect();
        format!("**** **** **** {}", tail)
    }
}

/// Login credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthInfo {
    pub login: String,
    pub password: String,
}

impl AuthInfo {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            password: password.into(),
        }
    }
}
