use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres};
use tracing::info;
use uuid::Uuid;

use aeropark_catalog::{ParkingSlot, SlotDay};

pub struct SlotRepository {
    pool: PgPool,
}

/// Outcome of a bulk generation run. Days already present count as skipped,
/// never as overwrites.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct BulkInsertOutcome {
    pub created: u64,
    pub skipped: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ReserveError {
    #[error("No spaces left for {0}")]
    NoCapacity(NaiveDate),

    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

#[derive(sqlx::FromRow)]
struct SlotRow {
    id: Uuid,
    lot_id: Uuid,
    slot_date: NaiveDate,
    total_spaces: i32,
    available_spaces: i32,
    price_per_day: Decimal,
    currency: String,
}

impl From<SlotRow> for ParkingSlot {
    fn from(row: SlotRow) -> Self {
        ParkingSlot {
            id: row.id,
            lot_id: row.lot_id,
            slot_date: row.slot_date,
            total_spaces: row.total_spaces,
            available_spaces: row.available_spaces,
            price_per_day: row.price_per_day,
            currency: row.currency,
        }
    }
}

/// Mutable slot fields; availability follows a capacity change, keeping the
/// reserved count fixed.
#[derive(Debug, Default, Clone)]
pub struct SlotUpdate {
    pub total_spaces: Option<i32>,
    pub price_per_day: Option<Decimal>,
}

/// Partition a plan against the days already stored: the days to insert,
/// plus the collision count. Re-running a plan over its own output leaves
/// nothing to insert and reports every day as skipped.
fn split_new_days<'a>(
    plan: &'a [SlotDay],
    existing: &HashSet<(Uuid, NaiveDate)>,
) -> (Vec<&'a SlotDay>, u64) {
    let mut fresh = Vec::with_capacity(plan.len());
    let mut skipped = 0u64;

    for day in plan {
        if existing.contains(&(day.lot_id, day.slot_date)) {
            skipped += 1;
        } else {
            fresh.push(day);
        }
    }

    (fresh, skipped)
}

/// New availability after a capacity edit. The reserved count stays fixed:
/// added spaces go on sale, a shrink eats free capacity first and floors
/// availability at zero.
fn adjusted_availability(available: i32, old_total: i32, new_total: i32) -> i32 {
    (available + new_total - old_total).clamp(0, new_total)
}

impl SlotRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a generated plan in one transaction, all-or-nothing. Existing
    /// (lot, date) rows are left untouched and reported as skipped, so
    /// re-running a plan creates nothing.
    pub async fn bulk_insert(&self, plan: &[SlotDay]) -> Result<BulkInsertOutcome, sqlx::Error> {
        let Some(first) = plan.first() else {
            return Ok(BulkInsertOutcome {
                created: 0,
                skipped: 0,
            });
        };

        let mut tx = self.pool.begin().await?;

        // A plan covers a single lot; snapshot the days already stored in
        // its range.
        let from = plan.iter().map(|d| d.slot_date).min().unwrap_or(first.slot_date);
        let to = plan.iter().map(|d| d.slot_date).max().unwrap_or(first.slot_date);
        let existing: HashSet<(Uuid, NaiveDate)> = sqlx::query_as(
            "SELECT lot_id, slot_date FROM parking_slots WHERE lot_id = $1 AND slot_date BETWEEN $2 AND $3",
        )
        .bind(first.lot_id)
        .bind(from)
        .bind(to)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .collect();

        let (fresh, skipped) = split_new_days(plan, &existing);

        let mut created = 0u64;
        for day in &fresh {
            let result = sqlx::query(
                r#"
                INSERT INTO parking_slots
                    (id, lot_id, slot_date, total_spaces, available_spaces, price_per_day, currency)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (lot_id, slot_date) DO NOTHING
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(day.lot_id)
            .bind(day.slot_date)
            .bind(day.total_spaces)
            .bind(day.available_spaces)
            .bind(day.price_per_day)
            .bind(&day.currency)
            .execute(&mut *tx)
            .await?;

            created += result.rows_affected();
        }

        tx.commit().await?;

        // Rows a concurrent generator slipped in between the snapshot and
        // the insert hit the ON CONFLICT guard; count them as skipped too.
        let skipped = skipped + (fresh.len() as u64 - created);
        info!("Bulk slot insert: {} created, {} skipped", created, skipped);

        Ok(BulkInsertOutcome { created, skipped })
    }

    pub async fn list_slots(
        &self,
        lot_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ParkingSlot>, sqlx::Error> {
        let rows = sqlx::query_as::<_, SlotRow>(
            r#"
            SELECT id, lot_id, slot_date, total_spaces, available_spaces, price_per_day, currency
            FROM parking_slots
            WHERE lot_id = $1 AND slot_date BETWEEN $2 AND $3
            ORDER BY slot_date
            "#,
        )
        .bind(lot_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ParkingSlot::from).collect())
    }

    pub async fn get_slot(&self, slot_id: Uuid) -> Result<Option<ParkingSlot>, sqlx::Error> {
        let row = sqlx::query_as::<_, SlotRow>(
            r#"
            SELECT id, lot_id, slot_date, total_spaces, available_spaces, price_per_day, currency
            FROM parking_slots
            WHERE id = $1
            "#,
        )
        .bind(slot_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ParkingSlot::from))
    }

    /// Supplier edit. A capacity change carries the reserved count across:
    /// added spaces become sellable, a shrink eats free capacity first.
    pub async fn update_slot(&self, slot_id: Uuid, update: &SlotUpdate) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, SlotRow>(
            r#"
            SELECT id, lot_id, slot_date, total_spaces, available_spaces, price_per_day, currency
            FROM parking_slots
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(slot_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(slot) = row else {
            return Ok(false);
        };

        let new_total = update.total_spaces.unwrap_or(slot.total_spaces);
        let new_available =
            adjusted_availability(slot.available_spaces, slot.total_spaces, new_total);

        sqlx::query(
            r#"
            UPDATE parking_slots SET
                total_spaces = $2,
                available_spaces = $3,
                price_per_day = COALESCE($4, price_per_day),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(slot_id)
        .bind(new_total)
        .bind(new_available)
        .bind(update.price_per_day)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    pub async fn delete_slot(&self, slot_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM parking_slots WHERE id = $1")
            .bind(slot_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Reserve one space for every day of the stay, inside the caller's
    /// booking transaction. The decrement is conditional on capacity, so a
    /// concurrent booking taking the last space makes this fail rather than
    /// oversubscribe; the whole transaction rolls back.
    pub async fn reserve_stay(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        lot_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<(), ReserveError> {
        let mut date = start_date;
        while date <= end_date {
            let result = sqlx::query(
                r#"
                UPDATE parking_slots
                SET available_spaces = available_spaces - 1, updated_at = NOW()
                WHERE lot_id = $1 AND slot_date = $2 AND available_spaces >= 1
                "#,
            )
            .bind(lot_id)
            .bind(date)
            .execute(&mut **tx)
            .await?;

            if result.rows_affected() == 0 {
                return Err(ReserveError::NoCapacity(date));
            }

            date += chrono::Duration::days(1);
        }

        Ok(())
    }

    /// Give back one space per day on cancellation, capped at the slot's
    /// total. Days the supplier has since deleted are simply not restored.
    pub async fn release_stay(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        lot_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE parking_slots
            SET available_spaces = LEAST(available_spaces + 1, total_spaces), updated_at = NOW()
            WHERE lot_id = $1 AND slot_date BETWEEN $2 AND $3
            "#,
        )
        .bind(lot_id)
        .bind(start_date)
        .bind(end_date)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan_for(lot_id: Uuid, days: u64) -> Vec<SlotDay> {
        (0..days)
            .map(|offset| SlotDay {
                lot_id,
                slot_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
                    + chrono::Duration::days(offset as i64),
                total_spaces: 50,
                available_spaces: 50,
                price_per_day: Decimal::new(1899, 2),
                currency: "USD".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_fresh_plan_has_no_collisions() {
        let plan = plan_for(Uuid::new_v4(), 5);

        let (fresh, skipped) = split_new_days(&plan, &HashSet::new());
        assert_eq!(fresh.len(), 5);
        assert_eq!(skipped, 0);
    }

    #[test]
    fn test_rerun_skips_every_existing_day() {
        let plan = plan_for(Uuid::new_v4(), 5);
        let existing: HashSet<_> = plan.iter().map(|d| (d.lot_id, d.slot_date)).collect();

        let (fresh, skipped) = split_new_days(&plan, &existing);
        assert!(fresh.is_empty());
        assert_eq!(skipped, 5);
    }

    #[test]
    fn test_partial_overlap_splits_created_and_skipped() {
        let plan = plan_for(Uuid::new_v4(), 5);
        let existing: HashSet<_> = plan[..2].iter().map(|d| (d.lot_id, d.slot_date)).collect();

        let (fresh, skipped) = split_new_days(&plan, &existing);
        assert_eq!(fresh.len(), 3);
        assert_eq!(skipped, 2);
    }

    #[test]
    fn test_other_lot_days_do_not_collide() {
        let plan = plan_for(Uuid::new_v4(), 3);
        let other_lot = plan_for(Uuid::new_v4(), 3);
        let existing: HashSet<_> = other_lot.iter().map(|d| (d.lot_id, d.slot_date)).collect();

        let (fresh, skipped) = split_new_days(&plan, &existing);
        assert_eq!(fresh.len(), 3);
        assert_eq!(skipped, 0);
    }

    #[test]
    fn test_capacity_edit_keeps_reserved_count() {
        // 40 of 50 reserved; growing to 80 puts the added 30 on sale.
        assert_eq!(adjusted_availability(10, 50, 80), 40);
        // Shrinking to 45 eats free capacity first.
        assert_eq!(adjusted_availability(10, 50, 45), 5);
        // Shrinking below the reserved count floors at zero.
        assert_eq!(adjusted_availability(10, 50, 30), 0);
        // No capacity change leaves availability alone.
        assert_eq!(adjusted_availability(10, 50, 50), 10);
    }
}
