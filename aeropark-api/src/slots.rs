use axum::{
    extract::{Extension, Path, Query, State},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use aeropark_catalog::{build_slot_plan, ParkingSlot, SlotPlanRequest};
use aeropark_store::{BulkInsertOutcome, LotRepository, SlotRepository, SlotUpdate};

use crate::error::AppError;
use crate::middleware::auth::{supplier_auth_middleware, SupplierClaims};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BulkCreateSlotsRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_spaces: i32,
    pub price_per_day: Option<Decimal>,
    pub currency: Option<String>,
    #[serde(default)]
    pub skip_weekends: bool,
    #[serde(default)]
    pub skip_holidays: bool,
}

#[derive(Debug, Deserialize)]
pub struct SlotRangeQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSlotRequest {
    pub total_spaces: Option<i32>,
    pub price_per_day: Option<Decimal>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/supplier/lots/{id}/slots/bulk", post(bulk_create_slots))
        .route("/v1/supplier/lots/{id}/slots", get(list_slots))
        .route("/v1/supplier/slots/{id}", patch(update_slot).delete(delete_slot))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            supplier_auth_middleware,
        ))
}

async fn require_lot_ownership(
    state: &AppState,
    lot_id: Uuid,
    claims: &SupplierClaims,
) -> Result<(), AppError> {
    let lot = LotRepository::new(state.db.pool.clone())
        .get_lot(lot_id)
        .await
        .map_err(AppError::from_db)?
        .ok_or_else(|| AppError::NotFoundError("Parking lot not found".to_string()))?;

    if lot.supplier_id != claims.supplier_id {
        return Err(AppError::AuthorizationError(
            "Lot does not belong to your supplier account".to_string(),
        ));
    }

    Ok(())
}

/// Bulk availability generation: one slot per calendar day in the range,
/// optionally skipping weekends and holidays. Re-running over an existing
/// range reports the collisions as skipped instead of erroring; the insert
/// itself is all-or-nothing.
async fn bulk_create_slots(
    State(state): State<AppState>,
    Extension(claims): Extension<SupplierClaims>,
    Path(lot_id): Path<Uuid>,
    Json(req): Json<BulkCreateSlotsRequest>,
) -> Result<Json<BulkInsertOutcome>, AppError> {
    require_lot_ownership(&state, lot_id, &claims).await?;

    let plan_request = SlotPlanRequest {
        lot_id,
        start_date: req.start_date,
        end_date: req.end_date,
        total_spaces: req.total_spaces,
        price_per_day: req
            .price_per_day
            .unwrap_or(state.business_rules.default_price_per_day),
        currency: req
            .currency
            .unwrap_or_else(|| state.business_rules.default_currency.clone()),
        skip_weekends: req.skip_weekends,
        skip_holidays: req.skip_holidays,
    };

    let plan =
        build_slot_plan(&plan_request).map_err(|e| AppError::ValidationError(e.to_string()))?;

    if plan.is_empty() {
        return Ok(Json(BulkInsertOutcome {
            created: 0,
            skipped: 0,
        }));
    }

    let outcome = SlotRepository::new(state.db.pool.clone())
        .bulk_insert(&plan)
        .await
        .map_err(AppError::from_db)?;

    info!(
        "Generated slots for lot {}: {} created, {} skipped",
        lot_id, outcome.created, outcome.skipped
    );

    Ok(Json(outcome))
}

async fn list_slots(
    State(state): State<AppState>,
    Extension(claims): Extension<SupplierClaims>,
    Path(lot_id): Path<Uuid>,
    Query(range): Query<SlotRangeQuery>,
) -> Result<Json<Vec<ParkingSlot>>, AppError> {
    require_lot_ownership(&state, lot_id, &claims).await?;

    let slots = SlotRepository::new(state.db.pool.clone())
        .list_slots(lot_id, range.from, range.to)
        .await
        .map_err(AppError::from_db)?;

    Ok(Json(slots))
}

async fn owned_slot(
    state: &AppState,
    slot_id: Uuid,
    claims: &SupplierClaims,
) -> Result<ParkingSlot, AppError> {
    let slot = SlotRepository::new(state.db.pool.clone())
        .get_slot(slot_id)
        .await
        .map_err(AppError::from_db)?
        .ok_or_else(|| AppError::NotFoundError("Slot not found".to_string()))?;

    require_lot_ownership(state, slot.lot_id, claims).await?;

    Ok(slot)
}

async fn update_slot(
    State(state): State<AppState>,
    Extension(claims): Extension<SupplierClaims>,
    Path(slot_id): Path<Uuid>,
    Json(req): Json<UpdateSlotRequest>,
) -> Result<Json<ParkingSlot>, AppError> {
    if matches!(req.total_spaces, Some(t) if t <= 0) {
        return Err(AppError::ValidationError(
            "Total spaces must be positive".to_string(),
        ));
    }
    if matches!(req.price_per_day, Some(p) if p.is_sign_negative()) {
        return Err(AppError::ValidationError(
            "Price per day must not be negative".to_string(),
        ));
    }

    owned_slot(&state, slot_id, &claims).await?;

    let repo = SlotRepository::new(state.db.pool.clone());
    let update = SlotUpdate {
        total_spaces: req.total_spaces,
        price_per_day: req.price_per_day,
    };
    repo.update_slot(slot_id, &update)
        .await
        .map_err(AppError::from_db)?;

    let slot = repo
        .get_slot(slot_id)
        .await
        .map_err(AppError::from_db)?
        .ok_or_else(|| AppError::NotFoundError("Slot not found".to_string()))?;

    Ok(Json(slot))
}

async fn delete_slot(
    State(state): State<AppState>,
    Extension(claims): Extension<SupplierClaims>,
    Path(slot_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    owned_slot(&state, slot_id, &claims).await?;

    SlotRepository::new(state.db.pool.clone())
        .delete_slot(slot_id)
        .await
        .map_err(AppError::from_db)?;

    Ok(Json(serde_json::json!({ "deleted": true })))
}
