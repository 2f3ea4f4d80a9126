use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aeropark_shared::money::round_display;

/// Rate record granularity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateType {
    Daily,
    Weekly,
    Monthly,
}

impl RateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateType::Daily => "DAILY",
            RateType::Weekly => "WEEKLY",
            RateType::Monthly => "MONTHLY",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "DAILY" => Some(RateType::Daily),
            "WEEKLY" => Some(RateType::Weekly),
            "MONTHLY" => Some(RateType::Monthly),
            _ => None,
        }
    }
}

/// Per-lot rate record with a validity window. At most one active rate may
/// exist per (lot, rate_type, region); the store enforces that inside the
/// create transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rate {
    pub id: Uuid,
    pub lot_id: Uuid,
    pub rate_type: RateType,
    pub price: Decimal,
    pub currency: String,
    pub tax_rate: Decimal,
    pub region: String,
    pub valid_from: DateTime<Utc>,
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Rate {
    pub fn is_valid_at(&self, instant: DateTime<Utc>) -> bool {
        self.is_active
            && self.valid_from <= instant
            && self.valid_until.map_or(true, |until| instant < until)
    }
}

/// Named pricing defaults, applied whenever a lot has no active rate or a
/// request omits a parameter. Populated from `[business_rules]` config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    pub default_price_per_day: Decimal,
    pub default_tax_rate: Decimal,
    pub default_currency: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            default_price_per_day: Decimal::new(1899, 2), // 18.99
            default_tax_rate: Decimal::new(875, 4),       // 0.0875
            default_currency: "USD".to_string(),
        }
    }
}

/// A priced stay: subtotal, tax and total, display-rounded to 2dp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Quote {
    pub price_per_day: Decimal,
    pub total_days: i64,
    pub tax_rate: Decimal,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub currency: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("Stay length must be positive, got {0} days")]
    InvalidStayLength(i64),

    #[error("Price per day must not be negative, got {0}")]
    NegativePrice(Decimal),

    #[error("Tax rate must not be negative, got {0}")]
    NegativeTaxRate(Decimal),

    #[error("Conflicting active rates for lot {lot_id}: {rate_type:?} in region {region:?}")]
    ConflictingActiveRates {
        lot_id: Uuid,
        rate_type: RateType,
        region: String,
    },
}

/// Pricing calculator for customer-facing totals.
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    /// subtotal = price_per_day x total_days; tax = subtotal x tax_rate;
    /// total = subtotal + tax. Exact decimal arithmetic, components rounded
    /// to 2dp for display and storage.
    pub fn quote(
        &self,
        price_per_day: Decimal,
        total_days: i64,
        tax_rate: Decimal,
        currency: &str,
    ) -> Result<Quote, PricingError> {
        if total_days <= 0 {
            return Err(PricingError::InvalidStayLength(total_days));
        }
        if price_per_day.is_sign_negative() {
            return Err(PricingError::NegativePrice(price_per_day));
        }
        if tax_rate.is_sign_negative() {
            return Err(PricingError::NegativeTaxRate(tax_rate));
        }

        let subtotal = round_display(price_per_day * Decimal::from(total_days));
        let tax_amount = round_display(subtotal * tax_rate);
        let total_amount = subtotal + tax_amount;

        Ok(Quote {
            price_per_day,
            total_days,
            tax_rate,
            subtotal,
            tax_amount,
            total_amount,
            currency: currency.to_string(),
        })
    }

    /// Quote a stay with configured defaults for any omitted parameter.
    pub fn quote_with_defaults(
        &self,
        price_per_day: Option<Decimal>,
        total_days: i64,
        tax_rate: Option<Decimal>,
        currency: Option<&str>,
    ) -> Result<Quote, PricingError> {
        self.quote(
            price_per_day.unwrap_or(self.config.default_price_per_day),
            total_days,
            tax_rate.unwrap_or(self.config.default_tax_rate),
            currency.unwrap_or(&self.config.default_currency),
        )
    }

    /// Resolve the single active rate for (rate_type, region) at `instant`.
    /// More than one match means the application-layer invariant was broken
    /// upstream; refuse to pick one silently.
    pub fn resolve_active_rate<'a>(
        &self,
        rates: &'a [Rate],
        rate_type: RateType,
        region: &str,
        instant: DateTime<Utc>,
    ) -> Result<Option<&'a Rate>, PricingError> {
        let mut matches = rates.iter().filter(|r| {
            r.rate_type == rate_type && r.region == region && r.is_valid_at(instant)
        });

        let first = matches.next();
        if let Some(rate) = first {
            if matches.next().is_some() {
                return Err(PricingError::ConflictingActiveRates {
                    lot_id: rate.lot_id,
                    rate_type,
                    region: region.to_string(),
                });
            }
        }

        Ok(first)
    }
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::new(PricingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn rate(rate_type: RateType, region: &str, active: bool) -> Rate {
        let now = Utc::now();
        Rate {
            id: Uuid::new_v4(),
            lot_id: Uuid::new_v4(),
            rate_type,
            price: dec!(18.99),
            currency: "USD".to_string(),
            tax_rate: dec!(0.0875),
            region: region.to_string(),
            valid_from: now - Duration::days(1),
            valid_until: None,
            is_active: active,
            created_at: now,
        }
    }

    #[test]
    fn test_quote_example() {
        let engine = PricingEngine::default();
        let quote = engine.quote(dec!(25), 4, dec!(0.0875), "USD").unwrap();

        assert_eq!(quote.subtotal, dec!(100.00));
        assert_eq!(quote.tax_amount, dec!(8.75));
        assert_eq!(quote.total_amount, dec!(108.75));
    }

    #[test]
    fn test_quote_total_is_subtotal_plus_tax() {
        let engine = PricingEngine::default();
        for (price, days, tax) in [
            (dec!(18.99), 1, dec!(0.0875)),
            (dec!(0), 10, dec!(0.0875)),
            (dec!(33.33), 7, dec!(0)),
            (dec!(12.49), 30, dec!(0.1)),
        ] {
            let q = engine.quote(price, days, tax, "USD").unwrap();
            assert_eq!(q.total_amount, q.subtotal + q.tax_amount);
            assert_eq!(q.subtotal, round_display(price * Decimal::from(days)));
        }
    }

    #[test]
    fn test_quote_rejects_bad_inputs() {
        let engine = PricingEngine::default();
        assert!(matches!(
            engine.quote(dec!(10), 0, dec!(0.1), "USD"),
            Err(PricingError::InvalidStayLength(0))
        ));
        assert!(matches!(
            engine.quote(dec!(-10), 2, dec!(0.1), "USD"),
            Err(PricingError::NegativePrice(_))
        ));
        assert!(matches!(
            engine.quote(dec!(10), 2, dec!(-0.1), "USD"),
            Err(PricingError::NegativeTaxRate(_))
        ));
    }

    #[test]
    fn test_defaults_applied_when_absent() {
        let engine = PricingEngine::default();
        let q = engine.quote_with_defaults(None, 3, None, None).unwrap();

        assert_eq!(q.price_per_day, dec!(18.99));
        assert_eq!(q.tax_rate, dec!(0.0875));
        assert_eq!(q.currency, "USD");
        assert_eq!(q.subtotal, dec!(56.97));
    }

    #[test]
    fn test_explicit_values_override_defaults() {
        let engine = PricingEngine::default();
        let q = engine
            .quote_with_defaults(Some(dec!(25)), 4, Some(dec!(0.0875)), Some("EUR"))
            .unwrap();

        assert_eq!(q.total_amount, dec!(108.75));
        assert_eq!(q.currency, "EUR");
    }

    #[test]
    fn test_resolve_active_rate() {
        let engine = PricingEngine::default();
        let now = Utc::now();
        let rates = vec![
            rate(RateType::Daily, "US-CA", true),
            rate(RateType::Weekly, "US-CA", true),
            rate(RateType::Daily, "US-CA", false),
        ];

        let found = engine
            .resolve_active_rate(&rates, RateType::Daily, "US-CA", now)
            .unwrap();
        assert!(found.is_some());

        let none = engine
            .resolve_active_rate(&rates, RateType::Monthly, "US-CA", now)
            .unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn test_double_active_rate_is_a_conflict() {
        let engine = PricingEngine::default();
        let rates = vec![
            rate(RateType::Daily, "US-CA", true),
            rate(RateType::Daily, "US-CA", true),
        ];

        assert!(matches!(
            engine.resolve_active_rate(&rates, RateType::Daily, "US-CA", Utc::now()),
            Err(PricingError::ConflictingActiveRates { .. })
        ));
    }

    #[test]
    fn test_expired_rate_not_valid() {
        let now = Utc::now();
        let mut r = rate(RateType::Daily, "US-CA", true);
        r.valid_until = Some(now - Duration::hours(1));
        assert!(!r.is_valid_at(now));
    }
}
