//! Transfer form opened from a card's top-up button

use super::locators::{AMOUNT_FIELD, CANCEL_BUTTON, ERROR_NOTIFICATION, FROM_FIELD, TRANSFER_BUTTON};
use super::{DashboardPage, PageContext};
use crate::common::{Error, Result};
use crate::data::CardInfo;

/// Top-up form for one destination card
pub struct TransferPage {
    ctx: PageContext,
    destination: CardInfo,
}

impl TransferPage {
    pub(super) async fn load(ctx: PageContext, destination: CardInfo) -> Result<Self> {
        ctx.element(AMOUNT_FIELD).await?;
        Ok(Self { ctx, destination })
    }

    /// The card this form tops up
    pub fn destination(&self) -> &CardInfo {
        &self.destination
    }

    /// Fill amount and source card and submit, whatever the outcome
    ///
    /// Any string is accepted, empty included.
    pub async fn transfer_money(&self, amount: &str, source: &CardInfo) -> Result<()> {
        tracing::debug!(
            amount,
            from = %source.card_number,
            to = %self.destination.masked_number(),
            "submitting transfer"
        );
        self.ctx.fill(AMOUNT_FIELD, amount).await?;
        self.ctx.fill(FROM_FIELD, &source.card_number).await?;
        self.ctx.click(TRANSFER_BUTTON).await
    }

    /// Submit a transfer that must be accepted, landing back on the dashboard
    pub async fn valid_transfer(self, amount: &str, source: &CardInfo) -> Result<DashboardPage> {
        self.transfer_money(amount, source).await?;
        match DashboardPage::load(self.ctx.clone()).await {
            Ok(dashboard) => Ok(dashboard),
            Err(e) if e.is_not_found() => match self.visible_notification().await? {
                Some(text) => Err(Error::assertion("transfer accepted", text)),
                None => Err(e),
            },
            Err(e) => Err(e),
        }
    }

    /// Assert the error banner shows exactly `expected`
    pub async fn find_error_notification(&self, expected: &str) -> Result<()> {
        let banner = self.ctx.element(ERROR_NOTIFICATION).await?;
        let actual = self.ctx.browser().text(&banner).await?;
        if actual.trim() != expected {
            return Err(Error::assertion(expected, actual.trim()));
        }
        Ok(())
    }

    /// Abort the transfer and return to the dashboard
    pub async fn cancel_transfer(self) -> Result<DashboardPage> {
        tracing::debug!("cancelling transfer");
        self.ctx.click(CANCEL_BUTTON).await?;
        DashboardPage::load(self.ctx).await
    }

    /// Banner text if one is shown right now, without waiting
    async fn visible_notification(&self) -> Result<Option<String>> {
        let browser = self.ctx.browser();
        for element in browser.find_all(ERROR_NOTIFICATION).await? {
            if browser.is_displayed(&element).await? {
                return Ok(Some(browser.text(&element).await?));
            }
        }
        Ok(None)
    }
}
