use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres, Row};
use std::time::Duration;
use tracing::{info, warn};

use aeropark_shared::money::parse_amount;

use crate::app_config::BusinessRules;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(connection_string: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations").run(&self.pool).await?;
        info!("Migrations completed successfully.");
        Ok(())
    }

    /// Overlay rule overrides from the `business_rules` table onto the
    /// configured defaults. Values are stored as `{"value": "..."}` with
    /// decimal amounts as strings; numeric JSON is ignored so currency never
    /// round-trips through binary floating point.
    pub async fn fetch_business_rules(
        &self,
        defaults: BusinessRules,
    ) -> Result<BusinessRules, sqlx::Error> {
        let rows = sqlx::query("SELECT rule_key, rule_value FROM business_rules")
            .fetch_all(&self.pool)
            .await?;

        let mut rules = defaults;

        for row in rows {
            let rule_key: String = row.try_get("rule_key")?;
            let rule_value: serde_json::Value = row.try_get("rule_value")?;

            let Some(value) = rule_value.get("value").and_then(|v| v.as_str()) else {
                warn!("Ignoring business rule {} without a string value", rule_key);
                continue;
            };

            match rule_key.as_str() {
                "default_price_per_day" => match parse_amount(value) {
                    Ok(price) => rules.default_price_per_day = price,
                    Err(e) => warn!("Ignoring default_price_per_day override: {}", e),
                },
                "default_tax_rate" => match parse_amount(value) {
                    Ok(rate) => rules.default_tax_rate = rate,
                    Err(e) => warn!("Ignoring default_tax_rate override: {}", e),
                },
                "default_currency" => rules.default_currency = value.to_string(),
                "default_region" => rules.default_region = value.to_string(),
                _ => {}
            }
        }

        Ok(rules)
    }
}
