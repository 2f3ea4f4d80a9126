use axum::{extract::State, routing::get, Json, Router};
use chrono::{Duration, Utc};

use aeropark_store::{AnalyticsRepository, PlatformSummary};

use crate::error::AppError;
use crate::middleware::auth::admin_auth_middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/v1/admin/analytics/summary", get(summary))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            admin_auth_middleware,
        ))
}

/// Platform-wide aggregates; occupancy is computed over the next 30 days of
/// slot inventory.
async fn summary(State(state): State<AppState>) -> Result<Json<PlatformSummary>, AppError> {
    let today = Utc::now().date_naive();
    let summary = AnalyticsRepository::new(state.db.pool.clone())
        .summary(today, today + Duration::days(30))
        .await
        .map_err(AppError::from_db)?;

    Ok(Json(summary))
}
