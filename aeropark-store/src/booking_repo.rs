use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use aeropark_booking::{Booking, BookingStatus, LotSnapshot, VehicleInfo};

pub struct BookingRepository;

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    reference: String,
    customer_id: String,
    lot_id: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
    total_days: i64,
    price_per_day: Decimal,
    subtotal: Decimal,
    tax_amount: Decimal,
    total_amount: Decimal,
    currency: String,
    status: String,
    vehicle_make: String,
    vehicle_model: String,
    vehicle_color: String,
    vehicle_plate: String,
    lot_name: String,
    lot_airport_code: String,
    lot_address: String,
    lot_shuttle: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    cancelled_at: Option<DateTime<Utc>>,
}

impl BookingRow {
    fn into_booking(self) -> Result<Booking, sqlx::Error> {
        let status = BookingStatus::parse(&self.status).ok_or_else(|| {
            sqlx::Error::Decode(format!("unknown booking status {}", self.status).into())
        })?;
        Ok(Booking {
            id: self.id,
            reference: self.reference,
            customer_id: self.customer_id,
            lot_id: self.lot_id,
            start_date: self.start_date,
            end_date: self.end_date,
            total_days: self.total_days,
            price_per_day: self.price_per_day,
            subtotal: self.subtotal,
            tax_amount: self.tax_amount,
            total_amount: self.total_amount,
            currency: self.currency,
            status,
            vehicle: VehicleInfo {
                make: self.vehicle_make,
                model: self.vehicle_model,
                color: self.vehicle_color,
                plate: self.vehicle_plate,
            },
            lot_snapshot: LotSnapshot {
                lot_name: self.lot_name,
                airport_code: self.lot_airport_code,
                address: self.lot_address,
                shuttle: self.lot_shuttle,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
            cancelled_at: self.cancelled_at,
        })
    }
}

impl BookingRepository {
    /// Insert within the caller's transaction so the capacity decrement and
    /// the booking row commit or roll back together.
    pub async fn create_booking(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        booking: &Booking,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO bookings
                (id, reference, customer_id, lot_id, start_date, end_date, total_days,
                 price_per_day, subtotal, tax_amount, total_amount, currency, status,
                 vehicle_make, vehicle_model, vehicle_color, vehicle_plate,
                 lot_name, lot_airport_code, lot_address, lot_shuttle,
                 created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                    $14, $15, $16, $17, $18, $19, $20, $21, $22, $23)
            "#,
        )
        .bind(booking.id)
        .bind(&booking.reference)
        .bind(&booking.customer_id)
        .bind(booking.lot_id)
        .bind(booking.start_date)
        .bind(booking.end_date)
        .bind(booking.total_days)
        .bind(booking.price_per_day)
        .bind(booking.subtotal)
        .bind(booking.tax_amount)
        .bind(booking.total_amount)
        .bind(&booking.currency)
        .bind(booking.status.as_str())
        .bind(&booking.vehicle.make)
        .bind(&booking.vehicle.model)
        .bind(&booking.vehicle.color)
        .bind(&booking.vehicle.plate)
        .bind(&booking.lot_snapshot.lot_name)
        .bind(&booking.lot_snapshot.airport_code)
        .bind(&booking.lot_snapshot.address)
        .bind(booking.lot_snapshot.shuttle)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    pub async fn get_booking(pool: &PgPool, id: Uuid) -> Result<Option<Booking>, sqlx::Error> {
        let row = sqlx::query_as::<_, BookingRow>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        row.map(BookingRow::into_booking).transpose()
    }

    /// Fetch with a row lock inside a cancellation transaction.
    pub async fn get_booking_for_update(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Option<Booking>, sqlx::Error> {
        let row =
            sqlx::query_as::<_, BookingRow>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut **tx)
                .await?;

        row.map(BookingRow::into_booking).transpose()
    }

    pub async fn list_for_customer(
        pool: &PgPool,
        customer_id: &str,
    ) -> Result<Vec<Booking>, sqlx::Error> {
        let rows = sqlx::query_as::<_, BookingRow>(
            "SELECT * FROM bookings WHERE customer_id = $1 ORDER BY created_at DESC",
        )
        .bind(customer_id)
        .fetch_all(pool)
        .await?;

        rows.into_iter().map(BookingRow::into_booking).collect()
    }

    /// Status flip only; financial fields are immutable after creation.
    pub async fn mark_cancelled(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        id: Uuid,
        cancelled_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE bookings
            SET status = $2, cancelled_at = $3, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(BookingStatus::Cancelled.as_str())
        .bind(cancelled_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
