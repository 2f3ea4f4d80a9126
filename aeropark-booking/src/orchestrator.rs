use chrono::NaiveDate;
use uuid::Uuid;

use aeropark_catalog::Quote;

use crate::models::{Booking, LotSnapshot, VehicleInfo};

/// Everything the checkout form and search step contribute to a booking,
/// validated before any capacity is touched.
#[derive(Debug, Clone)]
pub struct BookingDraft {
    pub customer_id: String,
    pub lot_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub vehicle: VehicleInfo,
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Pick-up date {end} is before drop-off date {start}")]
    InvertedStay { start: NaiveDate, end: NaiveDate },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Quote covers {quoted} days but the stay is {actual} days")]
    StayMismatch { quoted: i64, actual: i64 },
}

/// Inclusive length of stay in days; a same-day drop-off/pick-up is one day.
pub fn stay_length_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

/// Combine the validated draft, the computed quote and the lot snapshot into
/// a persistable booking. Pure assembly; the capacity decrement and the
/// insert happen together in the store transaction.
pub fn assemble_booking(
    draft: BookingDraft,
    quote: Quote,
    lot_snapshot: LotSnapshot,
) -> Result<Booking, BookingError> {
    if draft.end_date < draft.start_date {
        return Err(BookingError::InvertedStay {
            start: draft.start_date,
            end: draft.end_date,
        });
    }
    if draft.vehicle.plate.trim().is_empty() {
        return Err(BookingError::MissingField("vehicle.plate"));
    }
    if draft.vehicle.make.trim().is_empty() {
        return Err(BookingError::MissingField("vehicle.make"));
    }

    let actual = stay_length_days(draft.start_date, draft.end_date);
    if quote.total_days != actual {
        return Err(BookingError::StayMismatch {
            quoted: quote.total_days,
            actual,
        });
    }

    Ok(Booking::new(
        draft.customer_id,
        draft.lot_id,
        draft.start_date,
        draft.end_date,
        quote,
        draft.vehicle,
        lot_snapshot,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn draft(start: NaiveDate, end: NaiveDate) -> BookingDraft {
        BookingDraft {
            customer_id: "customer-1".to_string(),
            lot_id: Uuid::new_v4(),
            start_date: start,
            end_date: end,
            vehicle: VehicleInfo {
                make: "Honda".to_string(),
                model: "Civic".to_string(),
                color: "Red".to_string(),
                plate: "8XYZ900".to_string(),
            },
        }
    }

    fn quote(days: i64) -> Quote {
        Quote {
            price_per_day: dec!(18.99),
            total_days: days,
            tax_rate: dec!(0.0875),
            subtotal: dec!(18.99) * rust_decimal::Decimal::from(days),
            tax_amount: dec!(0),
            total_amount: dec!(0),
            currency: "USD".to_string(),
        }
    }

    fn snapshot() -> LotSnapshot {
        LotSnapshot {
            lot_name: "EconoPark".to_string(),
            airport_code: "LAX".to_string(),
            address: "1 World Way".to_string(),
            shuttle: false,
        }
    }

    #[test]
    fn test_stay_length_inclusive() {
        assert_eq!(stay_length_days(date(2025, 6, 2), date(2025, 6, 5)), 4);
        assert_eq!(stay_length_days(date(2025, 6, 2), date(2025, 6, 2)), 1);
    }

    #[test]
    fn test_assemble_carries_quote_and_snapshot() {
        let booking =
            assemble_booking(draft(date(2025, 6, 2), date(2025, 6, 5)), quote(4), snapshot())
                .unwrap();
        assert_eq!(booking.total_days, 4);
        assert_eq!(booking.lot_snapshot.airport_code, "LAX");
        assert_eq!(booking.vehicle.plate, "8XYZ900");
    }

    #[test]
    fn test_inverted_stay_rejected() {
        let result =
            assemble_booking(draft(date(2025, 6, 5), date(2025, 6, 2)), quote(4), snapshot());
        assert!(matches!(result, Err(BookingError::InvertedStay { .. })));
    }

    #[test]
    fn test_missing_plate_rejected() {
        let mut d = draft(date(2025, 6, 2), date(2025, 6, 5));
        d.vehicle.plate = "  ".to_string();
        assert!(matches!(
            assemble_booking(d, quote(4), snapshot()),
            Err(BookingError::MissingField("vehicle.plate"))
        ));
    }

    #[test]
    fn test_quote_stay_mismatch_rejected() {
        let result =
            assemble_booking(draft(date(2025, 6, 2), date(2025, 6, 5)), quote(3), snapshot());
        assert!(matches!(
            result,
            Err(BookingError::StayMismatch { quoted: 3, actual: 4 })
        ));
    }
}
