use axum::{extract::State, routing::post, Json, Router};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use aeropark_booking::stay_length_days;
use aeropark_catalog::{Amenities, PricingEngine, Quote, RateType};
use aeropark_store::{LotRepository, RateRepository};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub airport_code: String,
    pub drop_off: NaiveDate,
    pub pick_up: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct SearchResult {
    pub lot_id: Uuid,
    pub name: String,
    pub address: String,
    pub airport_code: String,
    pub amenities: Amenities,
    pub spaces_left: i32,
    pub quote: Quote,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/search", post(search_lots))
}

/// Public comparison search: active lots at the airport with capacity on
/// every day of the stay, each with a quote for the whole stay.
async fn search_lots(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<Vec<SearchResult>>, AppError> {
    // An inverted range is a no-results search, not an error.
    if req.pick_up < req.drop_off {
        return Ok(Json(Vec::new()));
    }

    let stay_days = stay_length_days(req.drop_off, req.pick_up);

    let lot_repo = LotRepository::new(state.db.pool.clone());
    let rate_repo = RateRepository::new(state.db.pool.clone());
    let engine = PricingEngine::new(state.business_rules.pricing_config());

    let rows = lot_repo
        .search_available(&req.airport_code, req.drop_off, req.pick_up, stay_days)
        .await
        .map_err(AppError::from_db)?;

    let now = Utc::now();
    let mut results = Vec::with_capacity(rows.len());
    for row in rows {
        let rates = rate_repo
            .list_for_lot(row.lot_id)
            .await
            .map_err(AppError::from_db)?;
        let tax_rate = engine
            .resolve_active_rate(&rates, RateType::Daily, &state.business_rules.default_region, now)
            .map_err(AppError::from_pricing)?
            .map(|rate| rate.tax_rate);

        let quote = engine
            .quote_with_defaults(Some(row.price_per_day), stay_days, tax_rate, Some(&row.currency))
            .map_err(AppError::from_pricing)?;

        results.push(SearchResult {
            lot_id: row.lot_id,
            name: row.name,
            address: row.address,
            airport_code: row.airport_code,
            amenities: Amenities {
                covered: row.covered,
                ev_charging: row.ev_charging,
                shuttle: row.shuttle,
                cctv: row.cctv,
            },
            spaces_left: row.min_available,
            quote,
        });
    }

    Ok(Json(results))
}
