pub mod analytics_repo;
pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod lot_repo;
pub mod rate_repo;
pub mod slot_repo;

pub use analytics_repo::{AnalyticsRepository, PlatformSummary};
pub use booking_repo::BookingRepository;
pub use database::DbClient;
pub use lot_repo::{AvailableLotRow, LotRepository, LotUpdate};
pub use rate_repo::RateRepository;
pub use slot_repo::{BulkInsertOutcome, ReserveError, SlotRepository, SlotUpdate};
