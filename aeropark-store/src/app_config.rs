use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;

use aeropark_catalog::PricingConfig;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
}

/// Named pricing defaults. These used to live as literals in the checkout
/// UI; they are configuration now, overridable per environment or via the
/// `business_rules` table.
#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    #[serde(default = "default_price_per_day")]
    pub default_price_per_day: Decimal,
    #[serde(default = "default_tax_rate")]
    pub default_tax_rate: Decimal,
    #[serde(default = "default_currency")]
    pub default_currency: String,
    #[serde(default = "default_region")]
    pub default_region: String,
}

fn default_price_per_day() -> Decimal {
    Decimal::new(1899, 2) // 18.99
}

fn default_tax_rate() -> Decimal {
    Decimal::new(875, 4) // 0.0875
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_region() -> String {
    "US".to_string()
}

impl Default for BusinessRules {
    fn default() -> Self {
        Self {
            default_price_per_day: default_price_per_day(),
            default_tax_rate: default_tax_rate(),
            default_currency: default_currency(),
            default_region: default_region(),
        }
    }
}

impl BusinessRules {
    pub fn pricing_config(&self) -> PricingConfig {
        PricingConfig {
            default_price_per_day: self.default_price_per_day,
            default_tax_rate: self.default_tax_rate,
            default_currency: self.default_currency.clone(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("AEROPARK").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_rule_defaults() {
        let rules = BusinessRules::default();
        assert_eq!(rules.default_price_per_day, Decimal::new(1899, 2));
        assert_eq!(rules.default_tax_rate, Decimal::new(875, 4));
        assert_eq!(rules.default_currency, "USD");
    }
}
