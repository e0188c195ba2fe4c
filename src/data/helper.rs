//! Fixture provider and synthetic amount generation

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::model::{AuthInfo, CardInfo};
use crate::common::{Error, Result};

/// Largest offset `generate_invalid_amount` adds on top of the balance
const MAX_INVALID_OFFSET: i64 = 10_000;

/// Credentials, verification code and the two cards of the test account
///
/// Defaults are the fixtures of the bank application build used for testing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixtures {
    #[serde(default = "default_login")]
    pub login: String,

    #[serde(default = "default_password")]
    pub password: String,

    #[serde(default = "default_verification_code")]
    pub verification_code: String,

    #[serde(default = "default_first_card")]
    pub first_card: CardInfo,

    #[serde(default = "default_second_card")]
    pub second_card: CardInfo,
}

impl Default for Fixtures {
    fn default() -> Self {
        Self {
            login: default_login(),
            password: default_password(),
            verification_code: default_verification_code(),
            first_card: default_first_card(),
            second_card: default_second_card(),
        }
    }
}

fn default_login() -> String {
    "vasya".to_string()
}
fn default_password() -> String {
    "qwerty123".to_string()
}
fn default_verification_code() -> String {
    "12345".to_string()
}
fn default_first_card() -> CardInfo {
    CardInfo::new(
        "5559 0000 0000 0001",
        "92df3f1c-a033-48e6-8390-206f6b1f56c0",
    )
}
fn default_second_card() -> CardInfo {
    CardInfo::new(
        "5559 0000 0000 0002",
        "0f3f5c2a-249e-4c3d-8287-09f7a039391d",
    )
}

/// Hands out fixtures and generates transfer amounts
///
/// Each scenario gets its own helper built from the loaded configuration,
/// so nothing here is global.
#[derive(Debug, Clone)]
pub struct DataHelper {
    fixtures: Fixtures,
}

impl DataHelper {
    pub fn new(fixtures: Fixtures) -> Self {
        Self { fixtures }
    }

    pub fn auth_info(&self) -> AuthInfo {
        AuthInfo::new(&self.fixtures.login, &self.fixtures.password)
    }

    pub fn verification_code(&self) -> &str {
        &self.fixtures.verification_code
    }

    pub fn first_card_info(&self) -> CardInfo {
        self.fixtures.first_card.clone()
    }

    pub fn second_card_info(&self) -> CardInfo {
        self.fixtures.second_card.clone()
    }

    /// An amount in `1..balance`, i.e. one the source card can cover
    ///
    /// Requires `balance > 1`; anything else cannot yield a positive amount
    /// below the balance and is reported instead of guessed around.
    pub fn generate_valid_amount(balance: i64) -> Result<i64> {
        Self::generate_valid_amount_with(&mut rand::rng(), balance)
    }

    pub fn generate_valid_amount_with<R: Rng>(rng: &mut R, balance: i64) -> Result<i64> {
        if balance <= 1 {
            return Err(Error::InsufficientBalance(balance));
        }
        Ok(rng.random_range(1..balance))
    }

    /// An amount strictly greater than `balance`
    ///
    /// Fails when no such amount fits in an `i64`.
    pub fn generate_invalid_amount(balance: i64) -> Result<i64> {
        Self::generate_invalid_amount_with(&mut rand::rng(), balance)
    }

    pub fn generate_invalid_amount_with<R: Rng>(rng: &mut R, balance: i64) -> Result<i64> {
        let headroom = i64::MAX.saturating_sub(balance);
        if headroom < 1 {
            return Err(Error::AmountOverflow(balance));
        }
        let offset = rng.random_range(1..=MAX_INVALID_OFFSET.min(headroom));
        balance
            .checked_add(offset)
            .ok_or(Error::AmountOverflow(balance))
    }
}

/// Parse an amount the way the transfer form reads it
///
/// Surrounding and grouping whitespace (`"1 000"`) is ignored. Returns `None`
/// for empty or non-numeric input.
pub fn parse_amount(text: &str) -> Option<i64> {
    let digits: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_valid_amount_stays_below_balance() {
        let mut rng = StdRng::seed_from_u64(7);
        for balance in [2, 3, 10, 500, 1000, 10_000, 1_000_000] {
            for _ in 0..500 {
                let amount = DataHelper::generate_valid_amount_with(&mut rng, balance).unwrap();
                assert!(
                    (1..balance).contains(&amount),
                    "amount {} out of range for balance {}",
                    amount,
                    balance
                );
            }
        }
    }

    #[test]
    fn test_valid_amount_for_balance_of_two_is_one() {
        for _ in 0..20 {
            assert_eq!(DataHelper::generate_valid_amount(2).unwrap(), 1);
        }
    }

    #[test]
    fn test_valid_amount_rejects_tiny_balances() {
        for balance in [1, 0, -5] {
            assert!(matches!(
                DataHelper::generate_valid_amount(balance),
                Err(Error::InsufficientBalance(b)) if b == balance
            ));
        }
    }

    #[test]
    fn test_invalid_amount_exceeds_balance() {
        let mut rng = StdRng::seed_from_u64(11);
        for balance in [0, 1, 500, 10_000] {
            for _ in 0..500 {
                let amount = DataHelper::generate_invalid_amount_with(&mut rng, balance).unwrap();
                assert!(amount > balance);
                assert!(amount <= balance + MAX_INVALID_OFFSET);
            }
        }
    }

    #[test]
    fn test_invalid_amount_near_i64_max() {
        let mut rng = StdRng::seed_from_u64(3);
        for balance in [i64::MAX - 1, i64::MAX - 5] {
            for _ in 0..100 {
                let amount = DataHelper::generate_invalid_amount_with(&mut rng, balance).unwrap();
                assert!(amount > balance);
            }
        }

        assert!(matches!(
            DataHelper::generate_invalid_amount(i64::MAX),
            Err(Error::AmountOverflow(i64::MAX))
        ));
    }

    #[test]
    fn test_parse_amount_ignores_whitespace() {
        assert_eq!(parse_amount("1000"), Some(1000));
        assert_eq!(parse_amount(" 1 000 "), Some(1000));
        assert_eq!(parse_amount("0"), Some(0));
        assert_eq!(parse_amount("-3"), Some(-3));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("   "), None);
        assert_eq!(parse_amount("10 р."), None);
    }

    #[test]
    fn test_fixtures_are_distinct_cards() {
        let helper = DataHelper::new(Fixtures::default());
        let first = helper.first_card_info();
        let second = helper.second_card_info();

        assert_ne!(first.card_number, second.card_number);
        assert_ne!(first.owner_code, second.owner_code);
        assert_ne!(first.masked_number(), second.masked_number());
        assert_eq!(helper.auth_info(), AuthInfo::new("vasya", "qwerty123"));
        assert_eq!(helper.verification_code(), "12345");
    }
}
