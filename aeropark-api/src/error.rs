use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use aeropark_catalog::PricingError;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl AppError {
    /// Map database failures onto the HTTP taxonomy. Unique and check
    /// violations (duplicate slot date, capacity bounds) are client-visible
    /// conflicts, not opaque 500s.
    pub fn from_db(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() || db_err.is_check_violation() {
                return AppError::ConflictError(db_err.message().to_string());
            }
        }
        AppError::InternalServerError(err.to_string())
    }

    /// Pricing failures: conflicting active rate records are a data
    /// conflict, everything else is bad input.
    pub fn from_pricing(err: PricingError) -> Self {
        match err {
            PricingError::ConflictingActiveRates { .. } => {
                AppError::ConflictError(err.to_string())
            }
            _ => AppError::ValidationError(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::AuthenticationError("x".into()), StatusCode::UNAUTHORIZED),
            (AppError::AuthorizationError("x".into()), StatusCode::FORBIDDEN),
            (AppError::ValidationError("x".into()), StatusCode::BAD_REQUEST),
            (AppError::NotFoundError("x".into()), StatusCode::NOT_FOUND),
            (AppError::ConflictError("x".into()), StatusCode::CONFLICT),
            (
                AppError::InternalServerError("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_internal_error_message_is_masked() {
        let response = AppError::InternalServerError("connection string leaked".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_row_not_found_is_internal() {
        let err = AppError::from_db(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::InternalServerError(_)));
    }

    #[test]
    fn test_conflicting_rates_map_to_conflict() {
        let err = PricingError::ConflictingActiveRates {
            lot_id: uuid::Uuid::new_v4(),
            rate_type: aeropark_catalog::RateType::Daily,
            region: "US".to_string(),
        };
        let response = AppError::from_pricing(err).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_pricing_validation_maps_to_bad_request() {
        let err = PricingError::InvalidStayLength(0);
        let response = AppError::from_pricing(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
