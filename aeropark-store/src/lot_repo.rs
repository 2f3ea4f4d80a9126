use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use aeropark_catalog::{Amenities, LotStatus, ParkingLot};

pub struct LotRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct LotRow {
    id: Uuid,
    supplier_id: Uuid,
    airport_code: String,
    name: String,
    address: String,
    capacity: i32,
    covered: bool,
    ev_charging: bool,
    shuttle: bool,
    cctv: bool,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LotRow {
    fn into_lot(self) -> Result<ParkingLot, sqlx::Error> {
        let status = LotStatus::parse(&self.status)
            .ok_or_else(|| sqlx::Error::Decode(format!("unknown lot status {}", self.status).into()))?;
        Ok(ParkingLot {
            id: self.id,
            supplier_id: self.supplier_id,
            airport_code: self.airport_code,
            name: self.name,
            address: self.address,
            capacity: self.capacity,
            amenities: Amenities {
                covered: self.covered,
                ev_charging: self.ev_charging,
                shuttle: self.shuttle,
                cctv: self.cctv,
            },
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// One search result: an active lot with availability across the whole stay.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AvailableLotRow {
    pub lot_id: Uuid,
    pub name: String,
    pub address: String,
    pub airport_code: String,
    pub covered: bool,
    pub ev_charging: bool,
    pub shuttle: bool,
    pub cctv: bool,
    pub min_available: i32,
    pub price_per_day: Decimal,
    pub currency: String,
}

/// Mutable lot fields; `None` leaves the column untouched.
#[derive(Debug, Default, Clone)]
pub struct LotUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub capacity: Option<i32>,
    pub amenities: Option<Amenities>,
}

impl LotRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_lot(&self, lot: &ParkingLot) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO parking_lots
                (id, supplier_id, airport_code, name, address, capacity,
                 covered, ev_charging, shuttle, cctv, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(lot.id)
        .bind(lot.supplier_id)
        .bind(&lot.airport_code)
        .bind(&lot.name)
        .bind(&lot.address)
        .bind(lot.capacity)
        .bind(lot.amenities.covered)
        .bind(lot.amenities.ev_charging)
        .bind(lot.amenities.shuttle)
        .bind(lot.amenities.cctv)
        .bind(lot.status.as_str())
        .bind(lot.created_at)
        .bind(lot.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_lot(&self, id: Uuid) -> Result<Option<ParkingLot>, sqlx::Error> {
        let row = sqlx::query_as::<_, LotRow>("SELECT * FROM parking_lots WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(LotRow::into_lot).transpose()
    }

    pub async fn list_for_supplier(&self, supplier_id: Uuid) -> Result<Vec<ParkingLot>, sqlx::Error> {
        let rows = sqlx::query_as::<_, LotRow>(
            "SELECT * FROM parking_lots WHERE supplier_id = $1 ORDER BY created_at DESC",
        )
        .bind(supplier_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(LotRow::into_lot).collect()
    }

    pub async fn update_lot(&self, id: Uuid, update: &LotUpdate) -> Result<bool, sqlx::Error> {
        let (covered, ev, shuttle, cctv) = match update.amenities {
            Some(a) => (Some(a.covered), Some(a.ev_charging), Some(a.shuttle), Some(a.cctv)),
            None => (None, None, None, None),
        };

        let result = sqlx::query(
            r#"
            UPDATE parking_lots SET
                name = COALESCE($2, name),
                address = COALESCE($3, address),
                capacity = COALESCE($4, capacity),
                covered = COALESCE($5, covered),
                ev_charging = COALESCE($6, ev_charging),
                shuttle = COALESCE($7, shuttle),
                cctv = COALESCE($8, cctv),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(update.name.as_deref())
        .bind(update.address.as_deref())
        .bind(update.capacity)
        .bind(covered)
        .bind(ev)
        .bind(shuttle)
        .bind(cctv)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Soft state change; lots are never deleted.
    pub async fn set_status(&self, id: Uuid, status: LotStatus) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE parking_lots SET status = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(status.as_str())
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Active lots at an airport with capacity on every day of the stay.
    /// A lot qualifies only when a slot row exists for each day and none of
    /// them is sold out. When per-day prices differ, the highest applies to
    /// the whole stay.
    pub async fn search_available(
        &self,
        airport_code: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        stay_days: i64,
    ) -> Result<Vec<AvailableLotRow>, sqlx::Error> {
        sqlx::query_as::<_, AvailableLotRow>(
            r#"
            SELECT
                l.id AS lot_id,
                l.name,
                l.address,
                l.airport_code,
                l.covered,
                l.ev_charging,
                l.shuttle,
                l.cctv,
                MIN(s.available_spaces) AS min_available,
                MAX(s.price_per_day) AS price_per_day,
                MIN(s.currency) AS currency
            FROM parking_lots l
            JOIN parking_slots s ON s.lot_id = l.id
            WHERE l.airport_code = $1
              AND l.status = 'ACTIVE'
              AND s.slot_date BETWEEN $2 AND $3
            GROUP BY l.id
            HAVING COUNT(s.id) = $4 AND MIN(s.available_spaces) > 0
            ORDER BY MAX(s.price_per_day) ASC
            "#,
        )
        .bind(airport_code)
        .bind(start_date)
        .bind(end_date)
        .bind(stay_days)
        .fetch_all(&self.pool)
        .await
    }
}
