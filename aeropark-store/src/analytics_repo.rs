use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

pub struct AnalyticsRepository {
    pool: PgPool,
}

/// Platform-wide aggregates for the admin dashboard, all computed by SQL
/// against live data.
#[derive(Debug, Clone, Serialize)]
pub struct PlatformSummary {
    pub total_bookings: i64,
    pub confirmed_bookings: i64,
    pub cancelled_bookings: i64,
    pub total_revenue: Decimal,
    pub distinct_customers: i64,
    pub active_lots: i64,
    pub occupancy_rate: f64,
}

#[derive(sqlx::FromRow)]
struct BookingAgg {
    total: i64,
    confirmed: i64,
    cancelled: i64,
    revenue: Decimal,
    customers: i64,
}

#[derive(sqlx::FromRow)]
struct OccupancyAgg {
    reserved: i64,
    capacity: i64,
}

impl AnalyticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn summary(
        &self,
        occupancy_from: NaiveDate,
        occupancy_to: NaiveDate,
    ) -> Result<PlatformSummary, sqlx::Error> {
        let bookings = sqlx::query_as::<_, BookingAgg>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = 'CONFIRMED') AS confirmed,
                COUNT(*) FILTER (WHERE status = 'CANCELLED') AS cancelled,
                COALESCE(SUM(total_amount) FILTER (WHERE status = 'CONFIRMED'), 0) AS revenue,
                COUNT(DISTINCT customer_id) AS customers
            FROM bookings
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let active_lots: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM parking_lots WHERE status = 'ACTIVE'")
                .fetch_one(&self.pool)
                .await?;

        let occupancy = sqlx::query_as::<_, OccupancyAgg>(
            r#"
            SELECT
                COALESCE(SUM(total_spaces - available_spaces), 0) AS reserved,
                COALESCE(SUM(total_spaces), 0) AS capacity
            FROM parking_slots
            WHERE slot_date BETWEEN $1 AND $2
            "#,
        )
        .bind(occupancy_from)
        .bind(occupancy_to)
        .fetch_one(&self.pool)
        .await?;

        let occupancy_rate = if occupancy.capacity > 0 {
            occupancy.reserved as f64 / occupancy.capacity as f64
        } else {
            0.0
        };

        Ok(PlatformSummary {
            total_bookings: bookings.total,
            confirmed_bookings: bookings.confirmed,
            cancelled_bookings: bookings.cancelled,
            total_revenue: bookings.revenue,
            distinct_customers: bookings.customers,
            active_lots,
            occupancy_rate,
        })
    }
}
