use rust_decimal::{Decimal, RoundingStrategy};

/// Money values are `Decimal` end-to-end. Binary floating point never touches
/// a currency amount; request payloads carry amounts as decimal strings.

#[derive(Debug, thiserror::Error)]
pub enum MoneyError {
    #[error("Invalid decimal amount: {0}")]
    InvalidAmount(String),

    #[error("Amount must not be negative: {0}")]
    NegativeAmount(Decimal),
}

/// Round a monetary amount to 2 decimal places for display and storage,
/// midpoint rounding away from zero.
pub fn round_display(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Parse a non-negative decimal string into an exact amount.
pub fn parse_amount(raw: &str) -> Result<Decimal, MoneyError> {
    let amount: Decimal = raw
        .trim()
        .parse()
        .map_err(|_| MoneyError::InvalidAmount(raw.to_string()))?;

    if amount.is_sign_negative() {
        return Err(MoneyError::NegativeAmount(amount));
    }

    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_display_midpoint() {
        assert_eq!(round_display(dec!(8.755)), dec!(8.76));
        assert_eq!(round_display(dec!(18.99)), dec!(18.99));
        assert_eq!(round_display(dec!(100)), dec!(100.00));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("18.99").unwrap(), dec!(18.99));
        assert_eq!(parse_amount(" 25 ").unwrap(), dec!(25));
        assert!(matches!(
            parse_amount("eighteen"),
            Err(MoneyError::InvalidAmount(_))
        ));
        assert!(matches!(
            parse_amount("-3.50"),
            Err(MoneyError::NegativeAmount(_))
        ));
    }
}
