//! Test runner implementation
//!
//! Executes scenarios against a fresh browser session each: log in, read the
//! baseline balances, run the steps, close the session. Assertions are made
//! on parsed balances and exact notification texts.

use colored::Colorize;

use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::data::{parse_amount, CardInfo, DataHelper};
use crate::driver::{SessionFactory, Waiter};
use crate::page::{Action, Flow, PageContext};

use super::config::{AmountSpec, BalanceChange, FixtureCard, TestScenario, TestStep, TestSuite};

/// Result of a test run
#[derive(Debug)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub steps_run: usize,
    pub steps_total: usize,
    pub error: Option<String>,
}

/// Results of every scenario of a suite run
#[derive(Debug, Default)]
pub struct SuiteReport {
    pub results: Vec<TestResult>,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }
}

/// Balances of the two fixture cards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Balances {
    first: i64,
    second: i64,
}

impl Balances {
    fn get(&self, card: FixtureCard) -> i64 {
        match card {
            FixtureCard::First => self.first,
            FixtureCard::Second => self.second,
        }
    }

    fn get_mut(&mut self, card: FixtureCard) -> &mut i64 {
        match card {
            FixtureCard::First => &mut self.first,
            FixtureCard::Second => &mut self.second,
        }
    }
}

/// Per-scenario state: the UI flow plus what the balances should be
struct ScenarioRun {
    flow: Flow,
    data: DataHelper,
    baseline: Balances,
    expected: Balances,
}

impl ScenarioRun {
    /// Log in and record the baseline balances
    async fn setup(ctx: PageContext, config: &Config) -> Result<Self> {
        let data = DataHelper::new(config.fixtures.clone());

        let mut flow = Flow::start(ctx, &config.target.base_url).await?;
        flow.apply(Action::Login(data.auth_info())).await?;
        flow.apply(Action::Verify(data.verification_code().to_string()))
            .await?;

        let baseline = read_balances(&flow, &data).await?;
        tracing::info!(first = baseline.first, second = baseline.second, "baseline balances");

        Ok(Self {
            flow,
            data,
            baseline,
            expected: baseline,
        })
    }

    /// Which fixture card, if any, `card` is
    fn fixture_of(&self, card: &CardInfo) -> Option<FixtureCard> {
        [FixtureCard::First, FixtureCard::Second]
            .into_iter()
            .find(|f| f.card_info(&self.data).card_number == card.card_number)
    }

    fn amount(&self, spec: &AmountSpec) -> Result<String> {
        let amount = match spec {
            AmountSpec::Valid { of } => DataHelper::generate_valid_amount(self.baseline.get(*of))?,
            AmountSpec::Invalid { of } => {
                DataHelper::generate_invalid_amount(self.baseline.get(*of))?
            }
            AmountSpec::Literal { value } => return Ok(value.clone()),
        };
        Ok(amount.to_string())
    }

    async fn execute(&mut self, step: &TestStep) -> Result<()> {
        match step {
            TestStep::SelectCard { to } => {
                let card = to.card_info(&self.data);
                self.flow.apply(Action::SelectCard(card)).await?;
            }
            TestStep::Transfer {
                amount,
                from,
                expect_success,
            } => {
                let amount = self.amount(amount)?;
                let source = from.card_info(&self.data);
                tracing::info!(amount = %amount, from = %source.card_number, "transfer");

                if *expect_success {
                    let destination = self.flow.transfer()?.destination().clone();
                    self.flow
                        .apply(Action::SubmitTransfer {
                            amount: amount.clone(),
                            source: source.clone(),
                        })
                        .await?;
                    self.record_transfer(&amount, &source, &destination)?;
                } else {
                    self.flow.apply(Action::Transfer { amount, source }).await?;
                }
            }
            TestStep::ExpectError { message } => {
                self.flow.transfer()?.find_error_notification(message).await?;
            }
            TestStep::Cancel => {
                self.flow.apply(Action::Cancel).await?;
            }
            TestStep::Reload => {
                self.flow.apply(Action::Reload).await?;
            }
            TestStep::ExpectBalances { change } => {
                let expected = match change {
                    BalanceChange::Unchanged => self.baseline,
                    BalanceChange::Transferred => self.expected,
                };
                let actual = read_balances(&self.flow, &self.data).await?;
                compare_balances(expected, actual)?;
            }
            TestStep::CheckStableRead => {
                let first_read = read_balances(&self.flow, &self.data).await?;
                let second_read = read_balances(&self.flow, &self.data).await?;
                if first_read != second_read {
                    return Err(Error::assertion(
                        format!("{:?}", first_read),
                        format!("{:?}", second_read),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Move the expected balances by an accepted transfer
    fn record_transfer(
        &mut self,
        amount: &str,
        source: &CardInfo,
        destination: &CardInfo,
    ) -> Result<()> {
        let amount = parse_amount(amount).ok_or_else(|| {
            Error::Config(format!("Accepted transfer amount '{}' is not a number", amount))
        })?;
        if let Some(card) = self.fixture_of(source) {
            *self.expected.get_mut(card) -= amount;
        }
        if let Some(card) = self.fixture_of(destination) {
            *self.expected.get_mut(card) += amount;
        }
        Ok(())
    }
}

async fn read_balances(flow: &Flow, data: &DataHelper) -> Result<Balances> {
    let dashboard = flow.dashboard()?;
    Ok(Balances {
        first: dashboard.card_balance(&data.first_card_info()).await?,
        second: dashboard.card_balance(&data.second_card_info()).await?,
    })
}

/// Grouped assertion over both cards; every mismatch is reported
fn compare_balances(expected: Balances, actual: Balances) -> Result<()> {
    let mismatches: Vec<String> = [FixtureCard::First, FixtureCard::Second]
        .into_iter()
        .filter(|card| expected.get(*card) != actual.get(*card))
        .map(|card| {
            format!(
                "{} card expected {}, got {}",
                card.name(),
                expected.get(card),
                actual.get(card)
            )
        })
        .collect();

    if mismatches.is_empty() {
        Ok(())
    } else {
        Err(Error::BalanceMismatch(mismatches.join("; ")))
    }
}

/// Runs scenarios against sessions from one factory
pub struct Runner<'a> {
    factory: &'a dyn SessionFactory,
    config: &'a Config,
    verbose: bool,
}

impl<'a> Runner<'a> {
    pub fn new(factory: &'a dyn SessionFactory, config: &'a Config, verbose: bool) -> Self {
        Self {
            factory,
            config,
            verbose,
        }
    }

    /// Run the selected scenarios of `suite` in order and print a summary
    pub async fn run_suite(&self, suite: &TestSuite, only: &[String]) -> Result<SuiteReport> {
        let scenarios = suite.select(only)?;

        println!(
            "\n{} {} ({} scenarios, {})",
            "Suite:".blue().bold(),
            suite.name.white().bold(),
            scenarios.len(),
            self.factory.describe().dimmed()
        );

        let mut report = SuiteReport::default();
        for scenario in scenarios {
            report.results.push(self.run_scenario(scenario).await);
        }

        println!("{}", "Results:".cyan().bold());
        for result in &report.results {
            if result.passed {
                println!("  {} {}", "✓".green(), result.name);
            } else {
                println!(
                    "  {} {} ({}/{} steps): {}",
                    "✗".red(),
                    result.name,
                    result.steps_run,
                    result.steps_total,
                    result.error.as_deref().unwrap_or("unknown error").red()
                );
            }
        }

        let summary = format!("{} passed, {} failed", report.passed(), report.failed());
        if report.all_passed() {
            println!("\n{}\n", summary.green().bold());
        } else {
            println!("\n{}\n", summary.red().bold());
        }

        Ok(report)
    }

    /// Run one scenario in its own browser session
    pub async fn run_scenario(&self, scenario: &TestScenario) -> TestResult {
        let steps_total = scenario.steps.len();

        println!(
            "\n{} {}",
            "Running Test:".blue().bold(),
            scenario.name.white().bold()
        );
        if let Some(desc) = &scenario.description {
            println!("  {}", desc.dimmed());
        }

        let failed = |steps_run: usize, error: &Error| TestResult {
            name: scenario.name.clone(),
            passed: false,
            steps_run,
            steps_total,
            error: Some(error.to_string()),
        };

        let browser = match self.factory.open_session().await {
            Ok(browser) => browser,
            Err(e) => {
                println!("  {} Session: {}", "✗".red(), e);
                return failed(0, &e);
            }
        };
        let ctx = PageContext::new(browser.clone(), Waiter::from_timeouts(&self.config.timeouts));

        let outcome = self.run_steps(ctx, scenario).await;

        if let Err(e) = browser.close().await {
            tracing::warn!(
                scenario = %scenario.name,
                error = %e,
                "failed to close browser session"
            );
        }

        match outcome {
            Ok(()) => {
                println!(
                    "\n{} {}",
                    "✓".green().bold(),
                    "Test Passed".green().bold()
                );
                TestResult {
                    name: scenario.name.clone(),
                    passed: true,
                    steps_run: steps_total,
                    steps_total,
                    error: None,
                }
            }
            Err((steps_run, e)) => failed(steps_run, &e),
        }
    }

    /// Setup plus steps; on failure returns how many steps ran
    async fn run_steps(
        &self,
        ctx: PageContext,
        scenario: &TestScenario,
    ) -> std::result::Result<(), (usize, Error)> {
        println!("{}", "Setup:".cyan());
        let mut run = match ScenarioRun::setup(ctx, self.config).await {
            Ok(run) => run,
            Err(e) => {
                println!("  {} Login: {}", "✗".red(), e);
                return Err((0, e));
            }
        };
        println!("  {} Logged in", "✓".green());
        if self.verbose {
            println!(
                "  Baseline: first {}, second {}",
                run.baseline.first.to_string().dimmed(),
                run.baseline.second.to_string().dimmed()
            );
        }

        println!("{}", "Steps:".cyan());
        for (i, step) in scenario.steps.iter().enumerate() {
            let step_num = i + 1;
            match run.execute(step).await {
                Ok(()) => {
                    println!(
                        "  {} Step {}: {}",
                        "✓".green(),
                        step_num,
                        step.describe().dimmed()
                    );
                }
                Err(e) => {
                    println!("  {} Step {}: {}", "✗".red(), step_num, e);
                    return Err((step_num, e));
                }
            }
        }
        Ok(())
    }
}
