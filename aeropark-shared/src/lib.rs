pub mod money;

pub use money::{parse_amount, round_display, MoneyError};
