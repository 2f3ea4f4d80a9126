pub mod lot;
pub mod pricing;
pub mod slots;

pub use lot::{Amenities, LotStatus, ParkingLot};
pub use pricing::{PricingConfig, PricingEngine, PricingError, Quote, Rate, RateType};
pub use slots::{build_slot_plan, ParkingSlot, SlotDay, SlotPlanError, SlotPlanRequest};
