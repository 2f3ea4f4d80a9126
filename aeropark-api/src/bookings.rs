use axum::{
    extract::{Extension, Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use aeropark_booking::{
    assemble_booking, stay_length_days, Booking, BookingDraft, LotSnapshot, VehicleInfo,
};
use aeropark_catalog::{PricingEngine, RateType};
use aeropark_store::{BookingRepository, LotRepository, RateRepository, ReserveError, SlotRepository};

use crate::error::AppError;
use crate::middleware::auth::{customer_auth_middleware, CustomerClaims};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub lot_id: Uuid,
    pub drop_off: NaiveDate,
    pub pick_up: NaiveDate,
    pub vehicle: VehicleInfo,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub booking_id: Uuid,
    pub reference: String,
    pub status: String,
    pub lot_name: String,
    pub airport_code: String,
    pub drop_off: NaiveDate,
    pub pick_up: NaiveDate,
    pub total_days: i64,
    pub price_per_day: rust_decimal::Decimal,
    pub subtotal: rust_decimal::Decimal,
    pub tax_amount: rust_decimal::Decimal,
    pub total_amount: rust_decimal::Decimal,
    pub currency: String,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            booking_id: b.id,
            reference: b.reference,
            status: b.status.as_str().to_string(),
            lot_name: b.lot_snapshot.lot_name,
            airport_code: b.lot_snapshot.airport_code,
            drop_off: b.start_date,
            pick_up: b.end_date,
            total_days: b.total_days,
            price_per_day: b.price_per_day,
            subtotal: b.subtotal,
            tax_amount: b.tax_amount,
            total_amount: b.total_amount,
            currency: b.currency,
        }
    }
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", post(create_booking).get(list_bookings))
        .route("/v1/bookings/{id}", get(get_booking))
        .route("/v1/bookings/{id}/cancel", post(cancel_booking))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            customer_auth_middleware,
        ))
}

/// Checkout. The capacity decrement and the booking insert share one
/// transaction: either every day of the stay is reserved and the booking
/// exists, or nothing changed.
async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    if req.pick_up < req.drop_off {
        return Err(AppError::ValidationError(
            "Pick-up date is before drop-off date".to_string(),
        ));
    }

    let lot_repo = LotRepository::new(state.db.pool.clone());
    let slot_repo = SlotRepository::new(state.db.pool.clone());
    let rate_repo = RateRepository::new(state.db.pool.clone());

    let lot = lot_repo
        .get_lot(req.lot_id)
        .await
        .map_err(AppError::from_db)?
        .ok_or_else(|| AppError::NotFoundError("Parking lot not found".to_string()))?;

    if !lot.is_bookable() {
        return Err(AppError::ValidationError(
            "Parking lot is not open for booking".to_string(),
        ));
    }

    let stay_days = stay_length_days(req.drop_off, req.pick_up);

    // A slot row must exist for every day of the stay; the highest per-day
    // price across the stay applies to the whole stay.
    let slots = slot_repo
        .list_slots(req.lot_id, req.drop_off, req.pick_up)
        .await
        .map_err(AppError::from_db)?;

    if slots.len() as i64 != stay_days {
        return Err(AppError::ConflictError(
            "Lot has no availability for part of the requested stay".to_string(),
        ));
    }

    let price_per_day = slots.iter().map(|s| s.price_per_day).max();
    let currency = slots.first().map(|s| s.currency.clone());

    let engine = PricingEngine::new(state.business_rules.pricing_config());
    let rates = rate_repo
        .list_for_lot(req.lot_id)
        .await
        .map_err(AppError::from_db)?;
    let tax_rate = engine
        .resolve_active_rate(
            &rates,
            RateType::Daily,
            &state.business_rules.default_region,
            Utc::now(),
        )
        .map_err(AppError::from_pricing)?
        .map(|rate| rate.tax_rate);
    let quote = engine
        .quote_with_defaults(price_per_day, stay_days, tax_rate, currency.as_deref())
        .map_err(AppError::from_pricing)?;

    let draft = BookingDraft {
        customer_id: claims.sub,
        lot_id: req.lot_id,
        start_date: req.drop_off,
        end_date: req.pick_up,
        vehicle: req.vehicle,
    };
    let snapshot = LotSnapshot {
        lot_name: lot.name.clone(),
        airport_code: lot.airport_code.clone(),
        address: lot.address.clone(),
        shuttle: lot.amenities.shuttle,
    };

    let booking = assemble_booking(draft, quote, snapshot)
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let mut tx = state.db.pool.begin().await.map_err(AppError::from_db)?;

    SlotRepository::reserve_stay(&mut tx, req.lot_id, req.drop_off, req.pick_up)
        .await
        .map_err(|e| match e {
            ReserveError::NoCapacity(date) => {
                AppError::ConflictError(format!("No spaces left for {}", date))
            }
            ReserveError::Db(err) => AppError::from_db(err),
        })?;

    BookingRepository::create_booking(&mut tx, &booking)
        .await
        .map_err(AppError::from_db)?;

    tx.commit().await.map_err(AppError::from_db)?;

    info!("Booking confirmed: {} ({})", booking.reference, booking.id);

    Ok(Json(BookingResponse::from(booking)))
}

async fn list_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let bookings = BookingRepository::list_for_customer(&state.db.pool, &claims.sub)
        .await
        .map_err(AppError::from_db)?;

    Ok(Json(bookings.into_iter().map(BookingResponse::from).collect()))
}

async fn get_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = BookingRepository::get_booking(&state.db.pool, booking_id)
        .await
        .map_err(AppError::from_db)?
        .ok_or_else(|| AppError::NotFoundError("Booking not found".to_string()))?;

    if booking.customer_id != claims.sub {
        return Err(AppError::AuthorizationError(
            "Booking does not belong to you".to_string(),
        ));
    }

    Ok(Json(BookingResponse::from(booking)))
}

/// Cancellation flips the status and gives the reserved space back for the
/// days that have not yet passed, in one transaction.
async fn cancel_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<CustomerClaims>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let mut tx = state.db.pool.begin().await.map_err(AppError::from_db)?;

    let mut booking = BookingRepository::get_booking_for_update(&mut tx, booking_id)
        .await
        .map_err(AppError::from_db)?
        .ok_or_else(|| AppError::NotFoundError("Booking not found".to_string()))?;

    if booking.customer_id != claims.sub {
        return Err(AppError::AuthorizationError(
            "Booking does not belong to you".to_string(),
        ));
    }

    booking
        .cancel()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let today = Utc::now().date_naive();
    let release_from = booking.start_date.max(today);
    if release_from <= booking.end_date {
        SlotRepository::release_stay(&mut tx, booking.lot_id, release_from, booking.end_date)
            .await
            .map_err(AppError::from_db)?;
    }

    let cancelled_at = booking.cancelled_at.unwrap_or_else(Utc::now);
    BookingRepository::mark_cancelled(&mut tx, booking.id, cancelled_at)
        .await
        .map_err(AppError::from_db)?;

    tx.commit().await.map_err(AppError::from_db)?;

    info!("Booking cancelled: {} ({})", booking.reference, booking.id);

    Ok(Json(BookingResponse::from(booking)))
}
