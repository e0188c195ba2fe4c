//! Page objects for the bank application
//!
//! Each page waits for its own landmark element when constructed and hands
//! out the next page when an action navigates away. [`Flow`] wraps the four
//! pages into one state machine for the scenario runner.

mod dashboard;
mod flow;
pub mod locators;
mod login;
pub mod messages;
mod transfer;
mod verification;

use std::sync::Arc;

use crate::common::Result;
use crate::driver::{Browser, ElementRef, Waiter};

pub use dashboard::{parse_balance, DashboardPage};
pub use flow::{Action, Flow, State};
pub use login::LoginPage;
pub use transfer::TransferPage;
pub use verification::VerificationPage;

/// Browser handle and wait policy shared by all pages of one session
#[derive(Clone)]
pub struct PageContext {
    browser: Arc<dyn Browser>,
    wait: Waiter,
}

impl PageContext {
    pub fn new(browser: Arc<dyn Browser>, wait: Waiter) -> Self {
        Self { browser, wait }
    }

    pub fn browser(&self) -> &dyn Browser {
        self.browser.as_ref()
    }

    /// Wait for the first visible element matching `selector`
    async fn element(&self, selector: &str) -> Result<ElementRef> {
        self.wait.element(self.browser(), selector).await
    }

    async fn elements(&self, selector: &str) -> Result<Vec<ElementRef>> {
        self.wait.elements(self.browser(), selector).await
    }

    async fn fill(&self, selector: &str, value: &str) -> Result<()> {
        let element = self.element(selector).await?;
        self.browser.set_value(&element, value).await
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self.element(selector).await?;
        self.browser.click(&element).await
    }
}
