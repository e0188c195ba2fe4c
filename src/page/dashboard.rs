//! Dashboard page: card list, balances and the top-up buttons

use super::locators::{self, CARD_ITEMS, CARD_KEY_ATTRIBUTE, DASHBOARD_HEADING};
use super::{PageContext, TransferPage};
use crate::common::{Error, Result};
use crate::data::CardInfo;
use crate::driver::ElementRef;

const BALANCE_START: &str = "баланс: ";
const BALANCE_FINISH: &str = " р.";

/// A card list item as resolved on page load
#[derive(Debug, Clone)]
struct CardSlot {
    owner_code: Option<String>,
    element: ElementRef,
}

/// Account overview listing every card with its balance
pub struct DashboardPage {
    ctx: PageContext,
    /// Card items in render order, keyed by owner code
    cards: Vec<CardSlot>,
}

impl DashboardPage {
    pub(super) async fn load(ctx: PageContext) -> Result<Self> {
        ctx.element(DASHBOARD_HEADING).await?;
        let cards = Self::resolve_cards(&ctx).await?;
        tracing::debug!(cards = cards.len(), "dashboard loaded");
        Ok(Self { ctx, cards })
    }

    async fn resolve_cards(ctx: &PageContext) -> Result<Vec<CardSlot>> {
        let mut cards = Vec::new();
        for element in ctx.elements(CARD_ITEMS).await? {
            let owner_code = ctx.browser().attribute(&element, CARD_KEY_ATTRIBUTE).await?;
            cards.push(CardSlot {
                owner_code,
                element,
            });
        }
        Ok(cards)
    }

    /// Number of cards shown
    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    /// Balance of the card rendered at `index` (0 = first card)
    pub async fn card_balance_at(&self, index: usize) -> Result<i64> {
        let slot = self
            .cards
            .get(index)
            .ok_or_else(|| Error::element_not_found(&format!("{}[{}]", CARD_ITEMS, index), 0))?;
        self.read_balance(slot).await
    }

    /// Balance of `card`, found by its owner code rather than its position
    pub async fn card_balance(&self, card: &CardInfo) -> Result<i64> {
        let slot = self
            .cards
            .iter()
            .find(|slot| slot.owner_code.as_deref() == Some(card.owner_code.as_str()))
            .ok_or_else(|| Error::CardNotShown(card.masked_number()))?;
        self.read_balance(slot).await
    }

    async fn read_balance(&self, slot: &CardSlot) -> Result<i64> {
        let text = self.ctx.browser().text(&slot.element).await?;
        parse_balance(&text)
    }

    /// Open the transfer form that tops up `destination`
    pub async fn select_card_to_transfer(self, destination: &CardInfo) -> Result<TransferPage> {
        tracing::debug!(card = %destination.masked_number(), "selecting card to top up");
        self.ctx
            .click(&locators::deposit_button(&destination.owner_code))
            .await?;
        TransferPage::load(self.ctx, destination.clone()).await
    }

    /// Reload the page so balances reflect the server state
    pub async fn reload(&mut self) -> Result<()> {
        tracing::debug!("reloading dashboard");
        self.ctx.browser().refresh().await?;
        self.ctx.element(DASHBOARD_HEADING).await?;
        self.cards = Self::resolve_cards(&self.ctx).await?;
        Ok(())
    }
}

/// Extract the balance from a card item text such as
/// `**** **** **** 0001, баланс: 10000 р.`
pub fn parse_balance(text: &str) -> Result<i64> {
    let start = text
        .find(BALANCE_START)
        .ok_or_else(|| Error::BalanceParse(text.to_string()))?
        + BALANCE_START.len();
    let rest = &text[start..];
    let finish = rest
        .find(BALANCE_FINISH)
        .ok_or_else(|| Error::BalanceParse(text.to_string()))?;

    rest[..finish]
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .parse()
        .map_err(|_| Error::BalanceParse(text.to_string()))
}
