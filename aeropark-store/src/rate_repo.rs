use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use aeropark_catalog::{Rate, RateType};

pub struct RateRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct RateRow {
    id: Uuid,
    lot_id: Uuid,
    rate_type: String,
    price: Decimal,
    currency: String,
    tax_rate: Decimal,
    region: String,
    valid_from: DateTime<Utc>,
    valid_until: Option<DateTime<Utc>>,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl RateRow {
    fn into_rate(self) -> Result<Rate, sqlx::Error> {
        let rate_type = RateType::parse(&self.rate_type).ok_or_else(|| {
            sqlx::Error::Decode(format!("unknown rate type {}", self.rate_type).into())
        })?;
        Ok(Rate {
            id: self.id,
            lot_id: self.lot_id,
            rate_type,
            price: self.price,
            currency: self.currency,
            tax_rate: self.tax_rate,
            region: self.region,
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            is_active: self.is_active,
            created_at: self.created_at,
        })
    }
}

impl RateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a rate, deactivating any previous active record for the same
    /// (lot, rate_type, region) in the same transaction. This is where the
    /// at-most-one-active invariant lives; the database does not enforce it.
    pub async fn create_rate(&self, rate: &Rate) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        if rate.is_active {
            sqlx::query(
                r#"
                UPDATE rates SET is_active = FALSE
                WHERE lot_id = $1 AND rate_type = $2 AND region = $3 AND is_active
                "#,
            )
            .bind(rate.lot_id)
            .bind(rate.rate_type.as_str())
            .bind(&rate.region)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO rates
                (id, lot_id, rate_type, price, currency, tax_rate, region,
                 valid_from, valid_until, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(rate.id)
        .bind(rate.lot_id)
        .bind(rate.rate_type.as_str())
        .bind(rate.price)
        .bind(&rate.currency)
        .bind(rate.tax_rate)
        .bind(&rate.region)
        .bind(rate.valid_from)
        .bind(rate.valid_until)
        .bind(rate.is_active)
        .bind(rate.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await
    }

    pub async fn list_for_lot(&self, lot_id: Uuid) -> Result<Vec<Rate>, sqlx::Error> {
        let rows = sqlx::query_as::<_, RateRow>(
            "SELECT * FROM rates WHERE lot_id = $1 ORDER BY created_at DESC",
        )
        .bind(lot_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(RateRow::into_rate).collect()
    }

    pub async fn get_rate(&self, id: Uuid) -> Result<Option<Rate>, sqlx::Error> {
        let row = sqlx::query_as::<_, RateRow>("SELECT * FROM rates WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(RateRow::into_rate).transpose()
    }

    pub async fn deactivate(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE rates SET is_active = FALSE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
