//! Test data: card and credential records, fixtures and amount generation

mod helper;
mod model;

pub use helper::{parse_amount, DataHelper, Fixtures};
pub use model::{AuthInfo, CardInfo};
