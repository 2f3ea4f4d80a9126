use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed public-holiday calendar: New Year's Day, Independence Day,
/// Christmas. Month/day pairs, applied to every year in the range.
const HOLIDAYS: [(u32, u32); 3] = [(1, 1), (7, 4), (12, 25)];

/// Bulk slot-generation request for one lot over a date range.
#[derive(Debug, Clone, Deserialize)]
pub struct SlotPlanRequest {
    pub lot_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_spaces: i32,
    pub price_per_day: Decimal,
    pub currency: String,
    #[serde(default)]
    pub skip_weekends: bool,
    #[serde(default)]
    pub skip_holidays: bool,
}

/// One day's worth of bookable capacity, ready for insertion.
#[derive(Debug, Clone, Serialize)]
pub struct SlotDay {
    pub lot_id: Uuid,
    pub slot_date: NaiveDate,
    pub total_spaces: i32,
    pub available_spaces: i32,
    pub price_per_day: Decimal,
    pub currency: String,
}

/// A persisted slot row: one day's capacity for one lot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkingSlot {
    pub id: Uuid,
    pub lot_id: Uuid,
    pub slot_date: NaiveDate,
    pub total_spaces: i32,
    pub available_spaces: i32,
    pub price_per_day: Decimal,
    pub currency: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SlotPlanError {
    #[error("Total spaces must be positive, got {0}")]
    InvalidCapacity(i32),

    #[error("Price per day must not be negative, got {0}")]
    NegativePrice(Decimal),

    #[error("Currency code must be 3 letters, got {0:?}")]
    InvalidCurrency(String),
}

pub fn is_holiday(date: NaiveDate) -> bool {
    HOLIDAYS.contains(&(date.month(), date.day()))
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Expand a request into one `SlotDay` per calendar day in
/// `[start_date, end_date]` inclusive, honoring the skip flags.
///
/// An inverted range (`end < start`) yields an empty plan rather than an
/// error; the booking UI treats that as "nothing to generate".
pub fn build_slot_plan(req: &SlotPlanRequest) -> Result<Vec<SlotDay>, SlotPlanError> {
    if req.total_spaces <= 0 {
        return Err(SlotPlanError::InvalidCapacity(req.total_spaces));
    }
    if req.price_per_day.is_sign_negative() {
        return Err(SlotPlanError::NegativePrice(req.price_per_day));
    }
    if req.currency.len() != 3 || !req.currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(SlotPlanError::InvalidCurrency(req.currency.clone()));
    }

    let mut plan = Vec::new();
    let mut date = req.start_date;

    while date <= req.end_date {
        let skipped = (req.skip_weekends && is_weekend(date))
            || (req.skip_holidays && is_holiday(date));

        if !skipped {
            plan.push(SlotDay {
                lot_id: req.lot_id,
                slot_date: date,
                total_spaces: req.total_spaces,
                available_spaces: req.total_spaces,
                price_per_day: req.price_per_day,
                currency: req.currency.clone(),
            });
        }

        date += Duration::days(1);
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request(start: NaiveDate, end: NaiveDate) -> SlotPlanRequest {
        SlotPlanRequest {
            lot_id: Uuid::new_v4(),
            start_date: start,
            end_date: end,
            total_spaces: 50,
            price_per_day: dec!(18.99),
            currency: "USD".to_string(),
            skip_weekends: false,
            skip_holidays: false,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_one_slot_per_day_inclusive() {
        let plan = build_slot_plan(&request(date(2025, 6, 1), date(2025, 6, 10))).unwrap();
        assert_eq!(plan.len(), 10);
        assert_eq!(plan[0].slot_date, date(2025, 6, 1));
        assert_eq!(plan[9].slot_date, date(2025, 6, 10));
        assert!(plan.iter().all(|s| s.available_spaces == s.total_spaces));
    }

    #[test]
    fn test_skip_weekends_mon_to_sun() {
        // 2025-06-02 is a Monday, 2025-06-08 the following Sunday.
        let mut req = request(date(2025, 6, 2), date(2025, 6, 8));
        req.skip_weekends = true;

        let plan = build_slot_plan(&req).unwrap();
        assert_eq!(plan.len(), 5);
        assert!(plan.iter().all(|s| !is_weekend(s.slot_date)));
    }

    #[test]
    fn test_skip_holidays_single_day() {
        let mut req = request(date(2025, 7, 4), date(2025, 7, 4));
        req.skip_holidays = true;

        let plan = build_slot_plan(&req).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_holidays_kept_when_flag_off() {
        let plan = build_slot_plan(&request(date(2025, 7, 4), date(2025, 7, 4))).unwrap();
        assert_eq!(plan.len(), 1);
    }

    #[test]
    fn test_christmas_and_new_year_skipped() {
        let mut req = request(date(2025, 12, 24), date(2026, 1, 2));
        req.skip_holidays = true;

        let plan = build_slot_plan(&req).unwrap();
        // 10 calendar days minus Dec 25 and Jan 1.
        assert_eq!(plan.len(), 8);
        assert!(!plan.iter().any(|s| s.slot_date == date(2025, 12, 25)));
        assert!(!plan.iter().any(|s| s.slot_date == date(2026, 1, 1)));
    }

    #[test]
    fn test_inverted_range_yields_empty_plan() {
        let plan = build_slot_plan(&request(date(2025, 6, 10), date(2025, 6, 1))).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn test_invalid_capacity_rejected() {
        let mut req = request(date(2025, 6, 1), date(2025, 6, 2));
        req.total_spaces = 0;
        assert!(matches!(
            build_slot_plan(&req),
            Err(SlotPlanError::InvalidCapacity(0))
        ));
    }

    #[test]
    fn test_negative_price_rejected() {
        let mut req = request(date(2025, 6, 1), date(2025, 6, 2));
        req.price_per_day = dec!(-1.00);
        assert!(matches!(
            build_slot_plan(&req),
            Err(SlotPlanError::NegativePrice(_))
        ));
    }

    #[test]
    fn test_bad_currency_rejected() {
        let mut req = request(date(2025, 6, 1), date(2025, 6, 2));
        req.currency = "US$".to_string();
        assert!(matches!(
            build_slot_plan(&req),
            Err(SlotPlanError::InvalidCurrency(_))
        ));
    }
}
