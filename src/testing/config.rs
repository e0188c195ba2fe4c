//! Test scenario configuration types
//!
//! Defines the data structures for deserializing YAML scenario suites.

use serde::Deserialize;
use std::path::Path;

use crate::common::{Error, Result};
use crate::data::{CardInfo, DataHelper};

/// Suite compiled into the binary
const BUILTIN_SUITE: &str = include_str!("../../scenarios/money_transfer.yaml");

/// A named set of scenarios loaded from one YAML file
#[derive(Deserialize, Debug)]
pub struct TestSuite {
    /// Name of the suite
    pub name: String,
    /// Optional description of what the suite covers
    pub description: Option<String>,
    /// Scenarios, run in order
    pub scenarios: Vec<TestScenario>,
}

/// One scenario: log in, read baseline balances, then run the steps
#[derive(Deserialize, Debug)]
pub struct TestScenario {
    /// Name of the test scenario
    pub name: String,
    /// Optional description of what the test verifies
    pub description: Option<String>,
    /// The sequence of test steps to execute
    pub steps: Vec<TestStep>,
}

/// One of the two fixture cards
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FixtureCard {
    First,
    Second,
}

impl FixtureCard {
    pub fn name(self) -> &'static str {
        match self {
            FixtureCard::First => "first",
            FixtureCard::Second => "second",
        }
    }

    pub fn card_info(self, data: &DataHelper) -> CardInfo {
        match self {
            FixtureCard::First => data.first_card_info(),
            FixtureCard::Second => data.second_card_info(),
        }
    }
}

/// A card named in a step: a fixture card or an inline (possibly malformed) one
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum CardRef {
    Fixture(FixtureCard),
    Inline(CardInfo),
}

impl CardRef {
    pub fn card_info(&self, data: &DataHelper) -> CardInfo {
        match self {
            CardRef::Fixture(card) => card.card_info(data),
            CardRef::Inline(card) => card.clone(),
        }
    }

    fn label(&self) -> String {
        match self {
            CardRef::Fixture(card) => format!("{} card", card.name()),
            CardRef::Inline(card) => format!("card '{}'", card.card_number),
        }
    }
}

/// How the amount of a transfer step is chosen
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AmountSpec {
    /// Random amount the card's baseline balance covers
    Valid { of: FixtureCard },
    /// Random amount above the card's baseline balance
    Invalid { of: FixtureCard },
    /// Exactly this text, typed into the amount field
    Literal { value: String },
}

/// Expected balances of the fixture cards, relative to the baseline
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BalanceChange {
    /// Both cards still show their baseline balance
    Unchanged,
    /// Baseline moved by every transfer accepted so far
    Transferred,
}

/// A single test step in the execution flow
#[derive(Deserialize, Debug)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TestStep {
    /// Open the top-up form of a card
    SelectCard {
        /// Destination card
        to: CardRef,
    },
    /// Fill and submit the transfer form
    Transfer {
        amount: AmountSpec,
        /// Source card typed into the form
        from: CardRef,
        /// Require the transfer to be accepted
        #[serde(default)]
        expect_success: bool,
    },
    /// The error banner must show exactly this text
    ExpectError { message: String },
    /// Abort the transfer
    Cancel,
    /// Reload the dashboard
    Reload,
    /// Check both fixture card balances
    ExpectBalances { change: BalanceChange },
    /// Read every balance twice and compare
    CheckStableRead,
}

impl TestStep {
    /// One-line description for the report
    pub fn describe(&self) -> String {
        match self {
            TestStep::SelectCard { to } => format!("select {} to top up", to.label()),
            TestStep::Transfer {
                amount,
                from,
                expect_success,
            } => {
                let amount = match amount {
                    AmountSpec::Valid { of } => format!("valid amount for {} card", of.name()),
                    AmountSpec::Invalid { of } => {
                        format!("amount above {} card balance", of.name())
                    }
                    AmountSpec::Literal { value } => format!("amount '{}'", value),
                };
                let outcome = if *expect_success { " (must succeed)" } else { "" };
                format!("transfer {} from {}{}", amount, from.label(), outcome)
            }
            TestStep::ExpectError { message } => format!("expect error '{}'", message),
            TestStep::Cancel => "cancel transfer".to_string(),
            TestStep::Reload => "reload dashboard".to_string(),
            TestStep::ExpectBalances { change } => match change {
                BalanceChange::Unchanged => "expect balances unchanged".to_string(),
                BalanceChange::Transferred => "expect balances moved by the transfer".to_string(),
            },
            TestStep::CheckStableRead => "read balances twice".to_string(),
        }
    }
}

impl TestSuite {
    /// The money transfer suite shipped with the binary
    pub fn builtin() -> Result<Self> {
        Self::parse(BUILTIN_SUITE)
    }

    /// Load a suite from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read test suite '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let suite: TestSuite = serde_yaml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse test suite: {}", e)))?;
        if suite.scenarios.is_empty() {
            return Err(Error::Config(format!("Suite '{}' has no scenarios", suite.name)));
        }
        Ok(suite)
    }

    /// Scenarios whose names are in `only`, or all of them if `only` is empty
    pub fn select(&self, only: &[String]) -> Result<Vec<&TestScenario>> {
        if only.is_empty() {
            return Ok(self.scenarios.iter().collect());
        }
        if let Some(unknown) = only
            .iter()
            .find(|name| !self.scenarios.iter().any(|s| &s.name == *name))
        {
            return Err(Error::Config(format!(
                "Unknown scenario '{}' in suite '{}'",
                unknown, self.name
            )));
        }
        Ok(self
            .scenarios
            .iter()
            .filter(|s| only.contains(&s.name))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_suite_parses() {
        let suite = TestSuite::builtin().unwrap();
        assert_eq!(suite.scenarios.len(), 7);
        for scenario in &suite.scenarios {
            assert!(!scenario.steps.is_empty(), "{} has no steps", scenario.name);
        }
    }

    #[test]
    fn test_step_shapes() {
        let suite = TestSuite::parse(
            r#"
name: shapes
scenarios:
  - name: everything
    steps:
      - action: select_card
        to: second
      - action: transfer
        amount: { kind: valid, of: first }
        from: first
        expect_success: true
      - action: transfer
        amount: { kind: literal, value: "" }
        from: { card_number: "1000 0000 0000 0001", owner_code: "" }
      - action: expect_error
        message: "Ошибка! Произошла ошибка"
      - action: cancel
      - action: reload
      - action: expect_balances
        change: unchanged
      - action: check_stable_read
"#,
        )
        .unwrap();

        let steps = &suite.scenarios[0].steps;
        assert!(matches!(
            steps[0],
            TestStep::SelectCard { to: CardRef::Fixture(FixtureCard::Second) }
        ));
        assert!(matches!(
            steps[1],
            TestStep::Transfer {
                amount: AmountSpec::Valid { of: FixtureCard::First },
                from: CardRef::Fixture(FixtureCard::First),
                expect_success: true,
            }
        ));
        match &steps[2] {
            TestStep::Transfer {
                amount: AmountSpec::Literal { value },
                from: CardRef::Inline(card),
                expect_success,
            } => {
                assert_eq!(value, "");
                assert_eq!(card.card_number, "1000 0000 0000 0001");
                assert_eq!(card.owner_code, "");
                assert!(!expect_success);
            }
            other => panic!("unexpected step {:?}", other),
        }
        assert!(matches!(steps[4], TestStep::Cancel));
        assert!(matches!(
            steps[6],
            TestStep::ExpectBalances { change: BalanceChange::Unchanged }
        ));
        assert!(matches!(steps[7], TestStep::CheckStableRead));
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let result = TestSuite::parse(
            "name: bad\nscenarios:\n  - name: x\n    steps:\n      - action: teleport\n",
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_suite_is_rejected() {
        assert!(TestSuite::parse("name: empty\nscenarios: []\n").is_err());
    }

    #[test]
    fn test_select() {
        let suite = TestSuite::builtin().unwrap();
        let name = suite.scenarios[2].name.clone();

        assert_eq!(suite.select(&[]).unwrap().len(), suite.scenarios.len());

        let picked = suite.select(std::slice::from_ref(&name)).unwrap();
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].name, name);

        assert!(suite.select(&["no such scenario".to_string()]).is_err());
    }
}
