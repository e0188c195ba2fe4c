//! SMS code verification page

use super::locators::{CODE_FIELD, VERIFY_BUTTON};
use super::{DashboardPage, PageContext};
use crate::common::Result;

/// One-time code form shown after a successful login
pub struct VerificationPage {
    ctx: PageContext,
}

impl VerificationPage {
    pub(super) async fn load(ctx: PageContext) -> Result<Self> {
        ctx.element(CODE_FIELD).await?;
        Ok(Self { ctx })
    }

    /// Submit the code and wait for the dashboard
    pub async fn valid_verification(self, code: &str) -> Result<DashboardPage> {
        tracing::debug!("submitting verification code");
        self.ctx.fill(CODE_FIELD, code).await?;
        self.ctx.click(VERIFY_BUTTON).await?;
        DashboardPage::load(self.ctx).await
    }
}
