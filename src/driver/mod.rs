//! Browser automation seam
//!
//! Pages talk to a [`Browser`] and never to a concrete driver. Two
//! implementations exist: [`ChromeSession`] drives Chrome over the DevTools
//! protocol, [`SimulatedBank`] renders an in-memory model of the bank
//! application.

mod chrome;
mod simulated;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::common::config::Timeouts;
use crate::common::{Error, Result};

pub use chrome::{ChromeFactory, ChromeSession};
pub use simulated::{SimulatedBank, SimulatedBrowser};

/// Opaque handle to an element found by a [`Browser`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef(pub String);

/// The DOM operations page objects need
#[async_trait]
pub trait Browser: Send + Sync {
    /// Navigate to `url`
    async fn open(&self, url: &str) -> Result<()>;

    /// Reload the current page
    async fn refresh(&self) -> Result<()>;

    /// All elements matching a CSS selector, in document order
    async fn find_all(&self, selector: &str) -> Result<Vec<ElementRef>>;

    /// Rendered text of an element
    async fn text(&self, element: &ElementRef) -> Result<String>;

    async fn attribute(&self, element: &ElementRef, name: &str) -> Result<Option<String>>;

    async fn is_displayed(&self, element: &ElementRef) -> Result<bool>;

    async fn click(&self, element: &ElementRef) -> Result<()>;

    /// Clear an input and type `value` into it
    async fn set_value(&self, element: &ElementRef, value: &str) -> Result<()>;

    /// End the session; the browser is unusable afterwards
    async fn close(&self) -> Result<()>;
}

/// Hands out one fresh browser session per scenario
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open_session(&self) -> Result<Arc<dyn Browser>>;

    /// Short human-readable name for the report header
    fn describe(&self) -> String;
}

/// Polls a [`Browser`] until an element shows up or the budget runs out
#[derive(Debug, Clone, Copy)]
pub struct Waiter {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Waiter {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    pub fn from_timeouts(timeouts: &Timeouts) -> Self {
        Self::new(timeouts.element_wait(), timeouts.poll_interval())
    }

    /// First visible element matching `selector`
    pub async fn element(&self, browser: &dyn Browser, selector: &str) -> Result<ElementRef> {
        let mut visible = self.elements(browser, selector).await?;
        Ok(visible.remove(0))
    }

    /// All visible elements matching `selector`; fails if there are none
    pub async fn elements(&self, browser: &dyn Browser, selector: &str) -> Result<Vec<ElementRef>> {
        let started = tokio::time::Instant::now();
        loop {
            match self.visible(browser, selector).await {
                Ok(found) if !found.is_empty() => return Ok(found),
                Ok(_) => {}
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e),
            }

            let waited = started.elapsed();
            if waited >= self.timeout {
                let waited_ms = waited.as_millis() as u64;
                tracing::debug!(selector, waited_ms, "element did not appear");
                return Err(Error::element_not_found(selector, waited_ms));
            }
            tokio::time::sleep(self.poll_interval.min(self.timeout - waited)).await;
        }
    }

    async fn visible(&self, browser: &dyn Browser, selector: &str) -> Result<Vec<ElementRef>> {
        let mut visible = Vec::new();
        for element in browser.find_all(selector).await? {
            if browser.is_displayed(&element).await? {
                visible.push(element);
            }
        }
        Ok(visible)
    }
}
