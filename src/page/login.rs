//! Login page

use super::locators::{LOGIN_BUTTON, LOGIN_FIELD, PASSWORD_FIELD};
use super::{PageContext, VerificationPage};
use crate::common::Result;
use crate::data::AuthInfo;

/// Login form, the entry page of the application
pub struct LoginPage {
    ctx: PageContext,
}

impl LoginPage {
    /// Open `url` and wait for the login form
    pub async fn open(ctx: PageContext, url: &str) -> Result<Self> {
        tracing::info!(url, "opening application");
        ctx.browser().open(url).await?;
        ctx.element(LOGIN_FIELD).await?;
        Ok(Self { ctx })
    }

    /// Submit the credentials and wait for the verification form
    pub async fn valid_login(self, auth: &AuthInfo) -> Result<VerificationPage> {
        tracing::debug!(login = %auth.login, "logging in");
        self.ctx.fill(LOGIN_FIELD, &auth.login).await?;
        self.ctx.fill(PASSWORD_FIELD, &auth.password).await?;
        self.ctx.click(LOGIN_BUTTON).await?;
        VerificationPage::load(self.ctx).await
    }
}
