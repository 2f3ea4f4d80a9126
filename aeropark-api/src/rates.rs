use axum::{
    extract::{Extension, Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use aeropark_catalog::{Rate, RateType};
use aeropark_store::{LotRepository, RateRepository};

use crate::error::AppError;
use crate::middleware::auth::{supplier_auth_middleware, SupplierClaims};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateRateRequest {
    pub rate_type: String,
    pub price: Decimal,
    pub currency: Option<String>,
    pub tax_rate: Option<Decimal>,
    pub region: Option<String>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/supplier/lots/{id}/rates", post(create_rate).get(list_rates))
        .route("/v1/supplier/rates/{id}/deactivate", post(deactivate_rate))
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

/// Creating an active rate retires the previous active record for the same
/// (lot, rate_type, region); there is never more than one.
async fn create_rate(
    State(state): State<AppState>,
    Extension(claims): Extension<SupplierClaims>,
    Path(lot_id): Path<Uuid>,
    Json(req): Json<CreateRateRequest>,
) -> Result<Json<Rate>, AppError> {
    require_lot_ownership(&state, lot_id, &claims).await?;

    let rate_type = RateType::parse(&req.rate_type)
        .ok_or_else(|| AppError::ValidationError(format!("Unknown rate type: {}", req.rate_type)))?;

    if req.price.is_sign_negative() {
        return Err(AppError::ValidationError(
            "Price must not be negative".to_string(),
        ));
    }
    if matches!(req.tax_rate, Some(t) if t.is_sign_negative()) {
        return Err(AppError::ValidationError(
            "Tax rate must not be negative".to_string(),
        ));
    }

    let valid_from = req.valid_from.unwrap_or_else(Utc::now);
    if matches!(req.valid_until, Some(until) if until <= valid_from) {
        return Err(AppError::ValidationError(
            "Validity window ends before it starts".to_string(),
        ));
    }

    let rate = Rate {
        id: Uuid::new_v4(),
        lot_id,
        rate_type,
        price: req.price,
        currency: req
            .currency
            .unwrap_or_else(|| state.business_rules.default_currency.clone()),
        tax_rate: req.tax_rate.unwrap_or(state.business_rules.default_tax_rate),
        region: req
            .region
            .unwrap_or_else(|| state.business_rules.default_region.clone()),
        valid_from,
        valid_until: req.valid_until,
        is_active: true,
        created_at: Utc::now(),
    };

    RateRepository::new(state.db.pool.clone())
        .create_rate(&rate)
        .await
        .map_err(AppError::from_db)?;

    Ok(Json(rate))
}

async fn list_rates(
    State(state): State<AppState>,
    Extension(claims): Extension<SupplierClaims>,
    Path(lot_id): Path<Uuid>,
) -> Result<Json<Vec<Rate>>, AppError> {
    require_lot_ownership(&state, lot_id, &claims).await?;

    let rates = RateRepository::new(state.db.pool.clone())
        .list_for_lot(lot_id)
        .await
        .map_err(AppError::from_db)?;

    Ok(Json(rates))
}

async fn deactivate_rate(
    State(state): State<AppState>,
    Extension(claims): Extension<SupplierClaims>,
    Path(rate_id): Path<Uuid>,
) -> Result<Json<Rate>, AppError> {
    let repo = RateRepository::new(state.db.pool.clone());

    let rate = repo
        .get_rate(rate_id)
        .await
        .map_err(AppError::from_db)?
        .ok_or_else(|| AppError::NotFoundError("Rate not found".to_string()))?;

    require_lot_ownership(&state, rate.lot_id, &claims).await?;

    repo.deactivate(rate_id).await.map_err(AppError::from_db)?;

    let rate = repo
        .get_rate(rate_id)
        .await
        .map_err(AppError::from_db)?
        .ok_or_else(|| AppError::NotFoundError("Rate not found".to_string()))?;

    Ok(Json(rate))
}
