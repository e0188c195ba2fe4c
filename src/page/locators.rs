//! CSS selectors of the bank application's DOM

pub const LOGIN_FIELD: &str = "[data-test-id=login] input";
pub const PASSWORD_FIELD: &str = "[data-test-id=password] input";
pub const LOGIN_BUTTON: &str = "[data-test-id=action-login]";

pub const CODE_FIELD: &str = "[data-test-id=code] input";
pub const VERIFY_BUTTON: &str = "[data-test-id=action-verify]";

pub const DASHBOARD_HEADING: &str = "[data-test-id=dashboard]";
pub const CARD_ITEMS: &str = ".list__item div";
/// Attribute carrying a card's owner code on its list item
pub const CARD_KEY_ATTRIBUTE: &str = "data-test-id";

pub const AMOUNT_FIELD: &str = "[data-test-id=amount] input";
pub const FROM_FIELD: &str = "[data-test-id=from] input";
pub const TRANSFER_BUTTON: &str = "[data-test-id=action-transfer]";
pub const CANCEL_BUTTON: &str = "[data-test-id=action-cancel]";

pub const ERROR_NOTIFICATION: &str = "[data-test-id=error-notification] .notification__content";

/// Deposit button inside the list item of the card with `owner_code`
pub fn deposit_button(owner_code: &str) -> String {
    format!("[data-test-id='{}'] [data-test-id=action-deposit]", owner_code)
}

/// Inverse of [`deposit_button`]
pub fn parse_deposit_button(selector: &str) -> Option<&str> {
    selector
        .strip_prefix("[data-test-id='")?
        .strip_suffix("'] [data-test-id=action-deposit]")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deposit_button_selector_round_trips_owner_code() {
        let selector = deposit_button("92df3f1c-a033-48e6-8390-206f6b1f56c0");
        assert_eq!(
            selector,
            "[data-test-id='92df3f1c-a033-48e6-8390-206f6b1f56c0'] [data-test-id=action-deposit]"
        );
        assert_eq!(
            parse_deposit_button(&selector),
            Some("92df3f1c-a033-48e6-8390-206f6b1f56c0")
        );
        assert_eq!(parse_deposit_button(AMOUNT_FIELD), None);
    }
}
