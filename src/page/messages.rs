//! Notification texts shown by the bank application

/// The amount is larger than the balance of the source card
pub const AMOUNT_EXCEEDS_BALANCE: &str = "Сумма превода превышает остаток на карте списания";
/// The amount field was submitted empty
pub const EMPTY_AMOUNT: &str = "Поле 'Сумма' не заполнено";
/// The amount is zero or negative
pub const AMOUNT_BELOW_MINIMUM: &str = "Сумма превода не может быть меньше 1";
/// Anything else, e.g. an unknown or empty source card
pub const GENERIC_ERROR: &str = "Ошибка! Произошла ошибка";
