//! Navigation state machine over the four pages
//!
//! ```text
//! LoggedOut --Login--> AwaitingVerification --Verify--> Dashboard
//! Dashboard --SelectCard--> TransferInProgress
//! Dashboard --Reload--> Dashboard
//! TransferInProgress --Transfer--> TransferInProgress (rejected or not yet checked)
//! TransferInProgress --SubmitTransfer--> Dashboard
//! TransferInProgress --Cancel--> Dashboard
//! ```

use std::fmt;

use super::{DashboardPage, LoginPage, PageContext, TransferPage, VerificationPage};
use crate::common::{Error, Result};
use crate::data::{AuthInfo, CardInfo};

/// Where the browser is in the navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    LoggedOut,
    AwaitingVerification,
    Dashboard,
    TransferInProgress,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::LoggedOut => "login",
            State::AwaitingVerification => "verification",
            State::Dashboard => "dashboard",
            State::TransferInProgress => "transfer",
        };
        f.write_str(name)
    }
}

/// Something the scenario does to the UI
#[derive(Debug, Clone)]
pub enum Action {
    Login(AuthInfo),
    Verify(String),
    /// Open the top-up form of the destination card
    SelectCard(CardInfo),
    /// Submit a transfer and stay on the form whatever happens
    Transfer { amount: String, source: CardInfo },
    /// Submit a transfer that must succeed
    SubmitTransfer { amount: String, source: CardInfo },
    Cancel,
    Reload,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Login(_) => "log in",
            Action::Verify(_) => "verify",
            Action::SelectCard(_) => "select a card",
            Action::Transfer { .. } => "transfer",
            Action::SubmitTransfer { .. } => "submit a transfer",
            Action::Cancel => "cancel",
            Action::Reload => "reload",
        }
    }
}

impl State {
    /// The transition table: where `action` leads from `self`
    pub fn next(self, action: &Action) -> Result<State> {
        let next = match (self, action) {
            (State::LoggedOut, Action::Login(_)) => State::AwaitingVerification,
            (State::AwaitingVerification, Action::Verify(_)) => State::Dashboard,
            (State::Dashboard, Action::SelectCard(_)) => State::TransferInProgress,
            (State::Dashboard, Action::Reload) => State::Dashboard,
            (State::TransferInProgress, Action::Transfer { .. }) => State::TransferInProgress,
            (State::TransferInProgress, Action::SubmitTransfer { .. }) => State::Dashboard,
            (State::TransferInProgress, Action::Cancel) => State::Dashboard,
            (state, action) => return Err(Error::invalid_state(action.name(), &state.to_string())),
        };
        Ok(next)
    }
}

enum Page {
    Login(LoginPage),
    Verification(VerificationPage),
    Dashboard(DashboardPage),
    Transfer(TransferPage),
}

impl Page {
    fn state(&self) -> State {
        match self {
            Page::Login(_) => State::LoggedOut,
            Page::Verification(_) => State::AwaitingVerification,
            Page::Dashboard(_) => State::Dashboard,
            Page::Transfer(_) => State::TransferInProgress,
        }
    }
}

/// The page a session is currently on
///
/// Only actions valid from the current state are carried out. A rejected
/// action leaves the flow untouched; an action that fails half-way through
/// leaves it without a page, and every later action reports that.
pub struct Flow {
    page: Option<Page>,
}

impl Flow {
    /// Open the application and land on the login form
    pub async fn start(ctx: PageContext, url: &str) -> Result<Self> {
        let login = LoginPage::open(ctx, url).await?;
        Ok(Self {
            page: Some(Page::Login(login)),
        })
    }

    pub fn state(&self) -> Option<State> {
        self.page.as_ref().map(Page::state)
    }

    /// Carry out `action` and move to the page it leads to
    pub async fn apply(&mut self, action: Action) -> Result<State> {
        let current = self
            .state()
            .ok_or_else(|| Error::invalid_state(action.name(), "unknown"))?;
        let expected = current.next(&action)?;
        tracing::debug!(from = %current, to = %expected, action = action.name(), "transition");

        // Actions that stay on their page work in place
        match (&mut self.page, &action) {
            (Some(Page::Dashboard(dashboard)), Action::Reload) => {
                dashboard.reload().await?;
                return Ok(expected);
            }
            (Some(Page::Transfer(transfer)), Action::Transfer { amount, source }) => {
                transfer.transfer_money(amount, source).await?;
                return Ok(expected);
            }
            _ => {}
        }

        let page = self
            .page
            .take()
            .ok_or_else(|| Error::invalid_state(action.name(), "unknown"))?;
        let next = match (page, action) {
            (Page::Login(login), Action::Login(auth)) => {
                Page::Verification(login.valid_login(&auth).await?)
            }
            (Page::Verification(verification), Action::Verify(code)) => {
                Page::Dashboard(verification.valid_verification(&code).await?)
            }
            (Page::Dashboard(dashboard), Action::SelectCard(card)) => {
                Page::Transfer(dashboard.select_card_to_transfer(&card).await?)
            }
            (Page::Transfer(transfer), Action::SubmitTransfer { amount, source }) => {
                Page::Dashboard(transfer.valid_transfer(&amount, &source).await?)
            }
            (Page::Transfer(transfer), Action::Cancel) => {
                Page::Dashboard(transfer.cancel_transfer().await?)
            }
            (page, action) => {
                let state = page.state();
                self.page = Some(page);
                return Err(Error::invalid_state(action.name(), &state.to_string()));
            }
        };

        self.page = Some(next);
        Ok(expected)
    }

    /// The dashboard, if that is the current page
    pub fn dashboard(&self) -> Result<&DashboardPage> {
        match &self.page {
            Some(Page::Dashboard(dashboard)) => Ok(dashboard),
            other => Err(Error::invalid_state(
                "read balances",
                &describe(other.as_ref()),
            )),
        }
    }

    /// The transfer form, if that is the current page
    pub fn transfer(&self) -> Result<&TransferPage> {
        match &self.page {
            Some(Page::Transfer(transfer)) => Ok(transfer),
            other => Err(Error::invalid_state(
                "check the transfer form",
                &describe(other.as_ref()),
            )),
        }
    }
}

fn describe(page: Option<&Page>) -> String {
    page.map(|p| p.state().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
