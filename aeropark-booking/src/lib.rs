pub mod models;
pub mod orchestrator;

pub use models::{Booking, BookingStatus, LotSnapshot, VehicleInfo};
pub use orchestrator::{assemble_booking, stay_length_days, BookingDraft, BookingError};
