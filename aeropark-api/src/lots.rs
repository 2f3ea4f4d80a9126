use axum::{
    extract::{Extension, Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aeropark_catalog::{Amenities, LotStatus, ParkingLot};
use aeropark_store::{LotRepository, LotUpdate};

use crate::error::AppError;
use crate::middleware::auth::{supplier_auth_middleware, SupplierClaims};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateLotRequest {
    pub airport_code: String,
    pub name: String,
    pub address: String,
    pub capacity: i32,
    #[serde(default)]
    pub amenities: Amenities,
}

#[derive(Debug, Deserialize)]
pub struct UpdateLotRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub capacity: Option<i32>,
    pub amenities: Option<Amenities>,
}

#[derive(Debug, Deserialize)]
pub struct SetLotStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct LotResponse {
    pub id: Uuid,
    pub airport_code: String,
    pub name: String,
    pub address: String,
    pub capacity: i32,
    pub amenities: Amenities,
    pub status: String,
}

impl From<ParkingLot> for LotResponse {
    fn from(lot: ParkingLot) -> Self {
        Self {
            id: lot.id,
            airport_code: lot.airport_code,
            name: lot.name,
            address: lot.address,
            capacity: lot.capacity,
            amenities: lot.amenities,
            status: lot.status.as_str().to_string(),
        }
    }
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/supplier/lots", post(create_lot).get(list_lots))
        .route("/v1/supplier/lots/{id}", get(get_lot).patch(update_lot))
        .route("/v1/supplier/lots/{id}/status", post(set_lot_status))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            supplier_auth_middleware,
        ))
}

/// Fetch a lot and verify the caller's supplier owns it.
async fn owned_lot(
    repo: &LotRepository,
    lot_id: Uuid,
    claims: &SupplierClaims,
) -> Result<ParkingLot, AppError> {
    let lot = repo
        .get_lot(lot_id)
        .await
        .map_err(AppError::from_db)?
        .ok_or_else(|| AppError::NotFoundError("Parking lot not found".to_string()))?;

    if lot.supplier_id != claims.supplier_id {
        return Err(AppError::AuthorizationError(
            "Lot does not belong to your supplier account".to_string(),
        ));
    }

    Ok(lot)
}

async fn create_lot(
    State(state): State<AppState>,
    Extension(claims): Extension<SupplierClaims>,
    Json(req): Json<CreateLotRequest>,
) -> Result<Json<LotResponse>, AppError> {
    if req.capacity <= 0 {
        return Err(AppError::ValidationError(
            "Capacity must be positive".to_string(),
        ));
    }
    if req.name.trim().is_empty() {
        return Err(AppError::ValidationError("Lot name is required".to_string()));
    }

    let lot = ParkingLot::new(
        claims.supplier_id,
        req.airport_code,
        req.name,
        req.address,
        req.capacity,
        req.amenities,
    );

    LotRepository::new(state.db.pool.clone())
        .create_lot(&lot)
        .await
        .map_err(AppError::from_db)?;

    Ok(Json(LotResponse::from(lot)))
}

async fn list_lots(
    State(state): State<AppState>,
    Extension(claims): Extension<SupplierClaims>,
) -> Result<Json<Vec<LotResponse>>, AppError> {
    let lots = LotRepository::new(state.db.pool.clone())
        .list_for_supplier(claims.supplier_id)
        .await
        .map_err(AppError::from_db)?;

    Ok(Json(lots.into_iter().map(LotResponse::from).collect()))
}

async fn get_lot(
    State(state): State<AppState>,
    Extension(claims): Extension<SupplierClaims>,
    Path(lot_id): Path<Uuid>,
) -> Result<Json<LotResponse>, AppError> {
    let repo = LotRepository::new(state.db.pool.clone());
    let lot = owned_lot(&repo, lot_id, &claims).await?;
    Ok(Json(LotResponse::from(lot)))
}

async fn update_lot(
    State(state): State<AppState>,
    Extension(claims): Extension<SupplierClaims>,
    Path(lot_id): Path<Uuid>,
    Json(req): Json<UpdateLotRequest>,
) -> Result<Json<LotResponse>, AppError> {
    if matches!(req.capacity, Some(c) if c <= 0) {
        return Err(AppError::ValidationError(
            "Capacity must be positive".to_string(),
        ));
    }

    let repo = LotRepository::new(state.db.pool.clone());
    owned_lot(&repo, lot_id, &claims).await?;

    let update = LotUpdate {
        name: req.name,
        address: req.address,
        capacity: req.capacity,
        amenities: req.amenities,
    };
    repo.update_lot(lot_id, &update)
        .await
        .map_err(AppError::from_db)?;

    let lot = owned_lot(&repo, lot_id, &claims).await?;
    Ok(Json(LotResponse::from(lot)))
}

/// Lots are never deleted; suspension and closure are status writes.
async fn set_lot_status(
    State(state): State<AppState>,
    Extension(claims): Extension<SupplierClaims>,
    Path(lot_id): Path<Uuid>,
    Json(req): Json<SetLotStatusRequest>,
) -> Result<Json<LotResponse>, AppError> {
    let status = LotStatus::parse(&req.status)
        .ok_or_else(|| AppError::ValidationError(format!("Unknown lot status: {}", req.status)))?;

    let repo = LotRepository::new(state.db.pool.clone());
    owned_lot(&repo, lot_id, &claims).await?;

    repo.set_status(lot_id, status)
        .await
        .map_err(AppError::from_db)?;

    let lot = owned_lot(&repo, lot_id, &claims).await?;
    Ok(Json(LotResponse::from(lot)))
}
