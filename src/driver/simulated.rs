//! In-memory model of the bank application
//!
//! Renders the same DOM contract as the real application (see
//! [`crate::page::locators`]) and applies the same transfer validation, so the
//! page objects and scenarios can run without a browser. Balances live in a
//! [`SimulatedBank`] shared by every session it opens; each
//! [`SimulatedBrowser`] only owns its UI state.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Browser, ElementRef, SessionFactory};
use crate::common::{Error, Result};
use crate::data::{parse_amount, CardInfo, Fixtures};
use crate::page::locators::{self, *};
use crate::page::messages;

/// Balance each card starts with unless told otherwise
pub const DEFAULT_BALANCE: i64 = 10_000;

const WRONG_CREDENTIALS: &str = "Ошибка! Неверно указан логин или пароль";
const WRONG_CODE: &str = "Ошибка! Неверно указан код! Попробуйте ещё раз.";

/// Element id prefix of dashboard card items
const CARD_PREFIX: &str = "card:";

#[derive(Debug)]
struct Account {
    number: String,
    owner_code: String,
    balance: i64,
}

#[derive(Debug)]
struct BankState {
    login: String,
    password: String,
    code: String,
    accounts: Vec<Account>,
}

impl BankState {
    fn account(&self, owner_code: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.owner_code == owner_code)
    }

    /// Validate and apply a transfer the way the application does
    ///
    /// On rejection returns the notification text and leaves balances alone.
    fn transfer(
        &mut self,
        to: &str,
        amount: &str,
        from: &str,
    ) -> std::result::Result<i64, &'static str> {
        if amount.trim().is_empty() {
            return Err(messages::EMPTY_AMOUNT);
        }
        let amount = parse_amount(amount).ok_or(messages::GENERIC_ERROR)?;
        if amount < 1 {
            return Err(messages::AMOUNT_BELOW_MINIMUM);
        }

        let from = normalize_number(from);
        let source = self
            .accounts
            .iter()
            .position(|a| !from.is_empty() && normalize_number(&a.number) == from)
            .ok_or(messages::GENERIC_ERROR)?;
        let target = self
            .accounts
            .iter()
            .position(|a| a.owner_code == to)
            .ok_or(messages::GENERIC_ERROR)?;
        if source == target {
            return Err(messages::GENERIC_ERROR);
        }
        if amount > self.accounts[source].balance {
            return Err(messages::AMOUNT_EXCEEDS_BALANCE);
        }

        self.accounts[source].balance -= amount;
        self.accounts[target].balance += amount;
        Ok(amount)
    }
}

fn normalize_number(number: &str) -> String {
    number.chars().filter(|c| !c.is_whitespace()).collect()
}

fn render_card(account: &Account) -> String {
    let masked = CardInfo::new(&account.number, &account.owner_code).masked_number();
    format!("{}, баланс: {} р.\nПополнить", masked, account.balance)
}

/// Server side of the simulated application
#[derive(Clone)]
pub struct SimulatedBank {
    base_url: String,
    state: Arc<Mutex<BankState>>,
}

impl SimulatedBank {
    /// A bank holding the fixture account with both cards at `balances`
    pub fn new(base_url: impl Into<String>, fixtures: &Fixtures, balances: (i64, i64)) -> Self {
        let accounts = vec![
            Account {
                number: fixtures.first_card.card_number.clone(),
                owner_code: fixtures.first_card.owner_code.clone(),
                balance: balances.0,
            },
            Account {
                number: fixtures.second_card.card_number.clone(),
                owner_code: fixtures.second_card.owner_code.clone(),
                balance: balances.1,
            },
        ];

        Self {
            base_url: base_url.into(),
            state: Arc::new(Mutex::new(BankState {
                login: fixtures.login.clone(),
                password: fixtures.password.clone(),
                code: fixtures.verification_code.clone(),
                accounts,
            })),
        }
    }

    pub fn with_default_balances(base_url: impl Into<String>, fixtures: &Fixtures) -> Self {
        Self::new(base_url, fixtures, (DEFAULT_BALANCE, DEFAULT_BALANCE))
    }

    /// Server-side balance of the card with `owner_code`
    pub async fn balance(&self, owner_code: &str) -> Option<i64> {
        let state = self.state.lock().await;
        state.account(owner_code).map(|a| a.balance)
    }

    /// Overwrite the server-side balance of the card with `owner_code`
    pub async fn set_balance(&self, owner_code: &str, balance: i64) -> Result<()> {
        let mut state = self.state.lock().await;
        let account = state
            .accounts
            .iter_mut()
            .find(|a| a.owner_code == owner_code)
            .ok_or_else(|| Error::CardNotShown(owner_code.to_string()))?;
        account.balance = balance;
        Ok(())
    }

    /// A fresh browser session against this bank
    pub fn session(&self) -> SimulatedBrowser {
        SimulatedBrowser {
            base_url: self.base_url.clone(),
            bank: Arc::clone(&self.state),
            ui: Mutex::new(Ui::default()),
        }
    }
}

#[async_trait]
impl SessionFactory for SimulatedBank {
    async fn open_session(&self) -> Result<Arc<dyn Browser>> {
        Ok(Arc::new(self.session()))
    }

    fn describe(&self) -> String {
        format!("simulated bank at {}", self.base_url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum Route {
    #[default]
    Blank,
    Login,
    Verification,
    Dashboard,
    Transfer { to: String },
}

#[derive(Debug, Default)]
struct Ui {
    route: Route,
    fields: HashMap<&'static str, String>,
    notification: Option<String>,
    closed: bool,
}

impl Ui {
    fn field(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    fn reset_form(&mut self) {
        self.fields.clear();
        self.notification = None;
    }

    fn navigate(&mut self, route: Route) {
        tracing::debug!(?route, "simulated navigation");
        self.route = route;
        self.reset_form();
    }

    /// Input fields and buttons rendered on the current route
    fn controls(&self) -> &'static [&'static str] {
        match self.route {
            Route::Blank => &[],
            Route::Login => &[LOGIN_FIELD, PASSWORD_FIELD, LOGIN_BUTTON],
            Route::Verification => &[CODE_FIELD, VERIFY_BUTTON],
            Route::Dashboard => &[DASHBOARD_HEADING],
            Route::Transfer { .. } => &[
                DASHBOARD_HEADING,
                AMOUNT_FIELD,
                FROM_FIELD,
                TRANSFER_BUTTON,
                CANCEL_BUTTON,
            ],
        }
    }

    fn control(&self, selector: &str) -> Option<&'static str> {
        self.controls().iter().copied().find(|c| *c == selector)
    }
}

/// Browser session against a [`SimulatedBank`]
pub struct SimulatedBrowser {
    base_url: String,
    bank: Arc<Mutex<BankState>>,
    ui: Mutex<Ui>,
}

impl SimulatedBrowser {
    fn gone(element: &ElementRef) -> Error {
        Error::element_not_found(&element.0, 0)
    }

    /// Whether `element` is part of the page currently rendered
    fn is_rendered(ui: &Ui, bank: &BankState, element: &ElementRef) -> bool {
        let id = element.0.as_str();
        if ui.control(id).is_some() {
            return true;
        }
        if id == ERROR_NOTIFICATION {
            return ui.notification.is_some();
        }
        if ui.route != Route::Dashboard {
            return false;
        }
        if let Some(owner) = id.strip_prefix(CARD_PREFIX) {
            return bank.account(owner).is_some();
        }
        locators::parse_deposit_button(id).is_some_and(|owner| bank.account(owner).is_some())
    }

    async fn ensure_open(&self) -> Result<()> {
        if self.ui.lock().await.closed {
            return Err(Error::SessionClosed);
        }
        Ok(())
    }
}

#[async_trait]
impl Browser for SimulatedBrowser {
    async fn open(&self, url: &str) -> Result<()> {
        self.ensure_open().await?;
        if url.trim_end_matches('/') != self.base_url.trim_end_matches('/') {
            return Err(Error::Navigation {
                url: url.to_string(),
                reason: "net::ERR_CONNECTION_REFUSED".to_string(),
            });
        }
        self.ui.lock().await.navigate(Route::Login);
        Ok(())
    }

    async fn refresh(&self) -> Result<()> {
        self.ensure_open().await?;
        self.ui.lock().await.reset_form();
        Ok(())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<ElementRef>> {
        self.ensure_open().await?;
        let ui = self.ui.lock().await;
        let bank = self.bank.lock().await;

        if selector == CARD_ITEMS {
            if ui.route != Route::Dashboard {
                return Ok(Vec::new());
            }
            return Ok(bank
                .accounts
                .iter()
                .map(|a| ElementRef(format!("{}{}", CARD_PREFIX, a.owner_code)))
                .collect());
        }

        let element = ElementRef(selector.to_string());
        if Self::is_rendered(&ui, &bank, &element) {
            Ok(vec![element])
        } else {
            Ok(Vec::new())
        }
    }

    async fn text(&self, element: &ElementRef) -> Result<String> {
        self.ensure_open().await?;
        let ui = self.ui.lock().await;
        let bank = self.bank.lock().await;
        if !Self::is_rendered(&ui, &bank, element) {
            return Err(Self::gone(element));
        }

        let id = element.0.as_str();
        if let Some(owner) = id.strip_prefix(CARD_PREFIX) {
            return bank
                .account(owner)
                .map(render_card)
                .ok_or_else(|| Self::gone(element));
        }
        let text = match id {
            DASHBOARD_HEADING => "Личный кабинет".to_string(),
            ERROR_NOTIFICATION => ui.notification.clone().unwrap_or_default(),
            LOGIN_BUTTON => "Продолжить".to_string(),
            VERIFY_BUTTON => "Продолжить".to_string(),
            TRANSFER_BUTTON => "Пополнить".to_string(),
            CANCEL_BUTTON => "Отмена".to_string(),
            _ if locators::parse_deposit_button(id).is_some() => "Пополнить".to_string(),
            field => ui.fields.get(field).cloned().unwrap_or_default(),
        };
        Ok(text)
    }

    async fn attribute(&self, element: &ElementRef, name: &str) -> Result<Option<String>> {
        self.ensure_open().await?;
        let ui = self.ui.lock().await;
        let bank = self.bank.lock().await;
        if !Self::is_rendered(&ui, &bank, element) {
            return Err(Self::gone(element));
        }

        let id = element.0.as_str();
        Ok(match (id.strip_prefix(CARD_PREFIX), name) {
            (Some(owner), CARD_KEY_ATTRIBUTE) => Some(owner.to_string()),
            (None, "value") => ui.fields.get(id).cloned(),
            _ => None,
        })
    }

    async fn is_displayed(&self, element: &ElementRef) -> Result<bool> {
        self.ensure_open().await?;
        let ui = self.ui.lock().await;
        let bank = self.bank.lock().await;
        Ok(Self::is_rendered(&ui, &bank, element))
    }

    async fn click(&self, element: &ElementRef) -> Result<()> {
        self.ensure_open().await?;
        let mut ui = self.ui.lock().await;
        let mut bank = self.bank.lock().await;
        if !Self::is_rendered(&ui, &bank, element) {
            return Err(Self::gone(element));
        }

        match element.0.as_str() {
            LOGIN_BUTTON => {
                let login = ui.field(LOGIN_FIELD);
                let password = ui.field(PASSWORD_FIELD);
                if login == bank.login && password == bank.password {
                    ui.navigate(Route::Verification);
                } else {
                    ui.notification = Some(WRONG_CREDENTIALS.to_string());
                }
            }
            VERIFY_BUTTON => {
                if ui.field(CODE_FIELD) == bank.code {
                    ui.navigate(Route::Dashboard);
                } else {
                    ui.notification = Some(WRONG_CODE.to_string());
                }
            }
            TRANSFER_BUTTON => {
                let Route::Transfer { to } = ui.route.clone() else {
                    return Err(Self::gone(element));
                };
                let amount = ui.field(AMOUNT_FIELD);
                let from = ui.field(FROM_FIELD);
                match bank.transfer(&to, &amount, &from) {
                    Ok(moved) => {
                        tracing::debug!(moved, %from, %to, "simulated transfer applied");
                        ui.navigate(Route::Dashboard);
                    }
                    Err(message) => {
                        tracing::debug!(message, "simulated transfer rejected");
                        ui.notification = Some(message.to_string());
                    }
                }
            }
            CANCEL_BUTTON => ui.navigate(Route::Dashboard),
            id => {
                if let Some(owner) = locators::parse_deposit_button(id) {
                    ui.navigate(Route::Transfer {
                        to: owner.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    async fn set_value(&self, element: &ElementRef, value: &str) -> Result<()> {
        self.ensure_open().await?;
        let mut ui = self.ui.lock().await;
        let field = match ui.control(&element.0) {
            Some(f) if f.ends_with(" input") => f,
            _ => return Err(Self::gone(element)),
        };
        ui.fields.insert(field, value.to_string());
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let mut ui = self.ui.lock().await;
        ui.closed = true;
        ui.route = Route::Blank;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://localhost:9999";

    fn bank() -> (SimulatedBank, Fixtures) {
        let fixtures = Fixtures::default();
        (SimulatedBank::new(URL, &fixtures, (1000, 500)), fixtures)
    }

    async fn click(browser: &SimulatedBrowser, selector: &str) {
        browser
            .click(&ElementRef(selector.to_string()))
            .await
            .unwrap();
    }

    async fn type_into(browser: &SimulatedBrowser, selector: &str, value: &str) {
        browser
            .set_value(&ElementRef(selector.to_string()), value)
            .await
            .unwrap();
    }

    async fn logged_in(bank: &SimulatedBank, fixtures: &Fixtures) -> SimulatedBrowser {
        let browser = bank.session();
        browser.open(URL).await.unwrap();
        type_into(&browser, LOGIN_FIELD, &fixtures.login).await;
        type_into(&browser, PASSWORD_FIELD, &fixtures.password).await;
        click(&browser, LOGIN_BUTTON).await;
        type_into(&browser, CODE_FIELD, &fixtures.verification_code).await;
        click(&browser, VERIFY_BUTTON).await;
        browser
    }

    #[test]
    fn test_transfer_validation_order() {
        let (bank, fixtures) = bank();
        let state = Arc::try_unwrap(bank.state).unwrap();
        let mut state = state.into_inner();
        let first = &fixtures.first_card;
        let second = &fixtures.second_card;

        let to_second = |state: &mut BankState, amount: &str, from: &str| {
            state.transfer(&second.owner_code, amount, from)
        };

        assert_eq!(to_second(&mut state, "", &first.card_number), Err(messages::EMPTY_AMOUNT));
        assert_eq!(to_second(&mut state, "  ", &first.card_number), Err(messages::EMPTY_AMOUNT));
        assert_eq!(
            to_second(&mut state, "0", &first.card_number),
            Err(messages::AMOUNT_BELOW_MINIMUM)
        );
        assert_eq!(
            to_second(&mut state, "-3", &first.card_number),
            Err(messages::AMOUNT_BELOW_MINIMUM)
        );
        assert_eq!(to_second(&mut state, "ten", &first.card_number), Err(messages::GENERIC_ERROR));
        assert_eq!(to_second(&mut state, "10", ""), Err(messages::GENERIC_ERROR));
        assert_eq!(
            to_second(&mut state, "10", "1000 0000 0000 0001"),
            Err(messages::GENERIC_ERROR)
        );
        assert_eq!(
            state.transfer(&first.owner_code, "10", &first.card_number),
            Err(messages::GENERIC_ERROR)
        );
        assert_eq!(
            to_second(&mut state, "1001", &first.card_number),
            Err(messages::AMOUNT_EXCEEDS_BALANCE)
        );
        assert_eq!(state.accounts[0].balance, 1000);
        assert_eq!(state.accounts[1].balance, 500);

        assert_eq!(to_second(&mut state, "1 000", "5559000000000001"), Ok(1000));
        assert_eq!(state.accounts[0].balance, 0);
        assert_eq!(state.accounts[1].balance, 1500);
    }

    #[tokio::test]
    async fn test_wrong_credentials_keep_login_form() {
        let (bank, _) = bank();
        let browser = bank.session();
        browser.open(URL).await.unwrap();
        type_into(&browser, LOGIN_FIELD, "petya").await;
        type_into(&browser, PASSWORD_FIELD, "123").await;
        click(&browser, LOGIN_BUTTON).await;

        assert!(browser.find_all(CODE_FIELD).await.unwrap().is_empty());
        let banner = browser.find_all(ERROR_NOTIFICATION).await.unwrap();
        assert_eq!(browser.text(&banner[0]).await.unwrap(), WRONG_CREDENTIALS);
    }

    #[tokio::test]
    async fn test_dashboard_renders_cards() {
        let (bank, fixtures) = bank();
        let browser = logged_in(&bank, &fixtures).await;

        let cards = browser.find_all(CARD_ITEMS).await.unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(
            browser.text(&cards[0]).await.unwrap(),
            "**** **** **** 0001, баланс: 1000 р.\nПополнить"
        );
        assert_eq!(
            browser.attribute(&cards[1], CARD_KEY_ATTRIBUTE).await.unwrap(),
            Some(fixtures.second_card.owner_code.clone())
        );
    }

    #[tokio::test]
    async fn test_rejected_transfer_shows_notification_and_cancel_returns() {
        let (bank, fixtures) = bank();
        let browser = logged_in(&bank, &fixtures).await;

        click(&browser, &deposit_button(&fixtures.second_card.owner_code)).await;
        type_into(&browser, AMOUNT_FIELD, "0").await;
        type_into(&browser, FROM_FIELD, &fixtures.first_card.card_number).await;
        click(&browser, TRANSFER_BUTTON).await;

        let banner = browser.find_all(ERROR_NOTIFICATION).await.unwrap();
        assert_eq!(browser.text(&banner[0]).await.unwrap(), messages::AMOUNT_BELOW_MINIMUM);

        click(&browser, CANCEL_BUTTON).await;
        assert_eq!(browser.find_all(CARD_ITEMS).await.unwrap().len(), 2);
        assert_eq!(bank.balance(&fixtures.first_card.owner_code).await, Some(1000));
    }

    #[tokio::test]
    async fn test_balances_shared_between_sessions() {
        let (bank, fixtures) = bank();
        let browser = logged_in(&bank, &fixtures).await;
        click(&browser, &deposit_button(&fixtures.first_card.owner_code)).await;
        type_into(&browser, AMOUNT_FIELD, "200").await;
        type_into(&browser, FROM_FIELD, &fixtures.second_card.card_number).await;
        click(&browser, TRANSFER_BUTTON).await;
        browser.close().await.unwrap();

        assert!(matches!(browser.open(URL).await, Err(Error::SessionClosed)));

        let other = logged_in(&bank, &fixtures).await;
        let cards = other.find_all(CARD_ITEMS).await.unwrap();
        assert!(other.text(&cards[0]).await.unwrap().contains("баланс: 1200 р."));
        assert!(other.text(&cards[1]).await.unwrap().contains("баланс: 300 р."));
    }

    #[tokio::test]
    async fn test_wrong_url_is_refused() {
        let (bank, _) = bank();
        let browser = bank.session();
        assert!(matches!(
            browser.open("http://localhost:8080").await,
            Err(Error::Navigation { .. })
        ));
    }
}
