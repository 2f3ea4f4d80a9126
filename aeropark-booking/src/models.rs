use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aeropark_catalog::Quote;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "CONFIRMED" => Some(BookingStatus::Confirmed),
            "CANCELLED" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }
}

/// Vehicle details collected on the checkout form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleInfo {
    pub make: String,
    pub model: String,
    pub color: String,
    pub plate: String,
}

/// Lot attributes frozen at checkout so the confirmation page renders the
/// lot as the customer booked it, regardless of later supplier edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotSnapshot {
    pub lot_name: String,
    pub airport_code: String,
    pub address: String,
    pub shuttle: bool,
}

/// A confirmed reservation. Financial fields are immutable after creation;
/// cancellation only touches status and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub reference: String,
    pub customer_id: String,
    pub lot_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_days: i64,
    pub price_per_day: Decimal,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub currency: String,
    pub status: BookingStatus,
    pub vehicle: VehicleInfo,
    pub lot_snapshot: LotSnapshot,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Booking {
    pub fn new(
        customer_id: String,
        lot_id: Uuid,
        start_date: NaiveDate,
        end_date: NaiveDate,
        quote: Quote,
        vehicle: VehicleInfo,
        lot_snapshot: LotSnapshot,
    ) -> Self {
        let now = Utc::now();
        let id = Uuid::new_v4();
        Self {
            id,
            reference: generate_reference(&id),
            customer_id,
            lot_id,
            start_date,
            end_date,
            total_days: quote.total_days,
            price_per_day: quote.price_per_day,
            subtotal: quote.subtotal,
            tax_amount: quote.tax_amount,
            total_amount: quote.total_amount,
            currency: quote.currency,
            status: BookingStatus::Confirmed,
            vehicle,
            lot_snapshot,
            created_at: now,
            updated_at: now,
            cancelled_at: None,
        }
    }

    /// CONFIRMED -> CANCELLED is the only transition.
    pub fn cancel(&mut self) -> Result<(), InvalidTransition> {
        if self.status != BookingStatus::Confirmed {
            return Err(InvalidTransition {
                from: self.status,
                to: BookingStatus::Cancelled,
            });
        }
        let now = Utc::now();
        self.status = BookingStatus::Cancelled;
        self.cancelled_at = Some(now);
        self.updated_at = now;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid booking transition: {from:?} -> {to:?}")]
pub struct InvalidTransition {
    pub from: BookingStatus,
    pub to: BookingStatus,
}

/// Human-presentable confirmation number: "PK-" followed by the first eight
/// hex characters of the booking id, uppercased.
pub fn generate_reference(id: &Uuid) -> String {
    let hex = id.simple().to_string();
    format!("PK-{}", hex[..8].to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_booking() -> Booking {
        let quote = Quote {
            price_per_day: dec!(25),
            total_days: 4,
            tax_rate: dec!(0.0875),
            subtotal: dec!(100.00),
            tax_amount: dec!(8.75),
            total_amount: dec!(108.75),
            currency: "USD".to_string(),
        };
        Booking::new(
            "customer-1".to_string(),
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 5).unwrap(),
            quote,
            VehicleInfo {
                make: "Toyota".to_string(),
                model: "Camry".to_string(),
                color: "Blue".to_string(),
                plate: "7ABC123".to_string(),
            },
            LotSnapshot {
                lot_name: "SkyPark Premium".to_string(),
                airport_code: "SFO".to_string(),
                address: "100 Airport Blvd".to_string(),
                shuttle: true,
            },
        )
    }

    #[test]
    fn test_reference_format() {
        let booking = sample_booking();
        assert_eq!(booking.reference.len(), 11);
        assert!(booking.reference.starts_with("PK-"));
        assert!(booking.reference[3..]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_new_booking_is_confirmed() {
        let booking = sample_booking();
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert!(booking.cancelled_at.is_none());
    }

    #[test]
    fn test_cancel_confirmed_booking() {
        let mut booking = sample_booking();
        booking.cancel().unwrap();
        assert_eq!(booking.status, BookingStatus::Cancelled);
        assert!(booking.cancelled_at.is_some());
    }

    #[test]
    fn test_cancel_twice_rejected() {
        let mut booking = sample_booking();
        booking.cancel().unwrap();
        assert!(booking.cancel().is_err());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [BookingStatus::Confirmed, BookingStatus::Cancelled] {
            assert_eq!(BookingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(BookingStatus::parse("PENDING"), None);
    }
}
