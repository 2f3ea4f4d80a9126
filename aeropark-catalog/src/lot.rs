use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a lot. Lots are never hard-deleted; closing a lot is
/// a status write so historical bookings keep a valid reference.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LotStatus {
    Active,
    Suspended,
    Closed,
}

impl LotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LotStatus::Active => "ACTIVE",
            LotStatus::Suspended => "SUSPENDED",
            LotStatus::Closed => "CLOSED",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "ACTIVE" => Some(LotStatus::Active),
            "SUSPENDED" => Some(LotStatus::Suspended),
            "CLOSED" => Some(LotStatus::Closed),
            _ => None,
        }
    }
}

/// Amenity flags shown to customers when comparing lots.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Amenities {
    pub covered: bool,
    pub ev_charging: bool,
    pub shuttle: bool,
    pub cctv: bool,
}

/// A parking facility operated by a supplier, serving one airport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkingLot {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub airport_code: String,
    pub name: String,
    pub address: String,
    pub capacity: i32,
    pub amenities: Amenities,
    pub status: LotStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ParkingLot {
    pub fn new(
        supplier_id: Uuid,
        airport_code: String,
        name: String,
        address: String,
        capacity: i32,
        amenities: Amenities,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            supplier_id,
            airport_code,
            name,
            address,
            capacity,
            amenities,
            status: LotStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Only active lots are bookable or searchable.
    pub fn is_bookable(&self) -> bool {
        self.status == LotStatus::Active
    }

    pub fn set_status(&mut self, status: LotStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lot_status_round_trip() {
        for status in [LotStatus::Active, LotStatus::Suspended, LotStatus::Closed] {
            assert_eq!(LotStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(LotStatus::parse("DELETED"), None);
    }

    #[test]
    fn test_closed_lot_not_bookable() {
        let mut lot = ParkingLot::new(
            Uuid::new_v4(),
            "SFO".to_string(),
            "SkyPark Premium".to_string(),
            "100 Airport Blvd".to_string(),
            200,
            Amenities::default(),
        );
        assert!(lot.is_bookable());

        lot.set_status(LotStatus::Closed);
        assert!(!lot.is_bookable());
    }
}
