pub mod currency;

use crate::core::error::StoreError;
use crate::service::CurrencyService;
use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::sync::Arc;
use tracing::error;

pub type AppState = Arc<CurrencyService>;

pub fn router(service: Arc<CurrencyService>) -> Router {
    Router::new()
        .nest("/api/currencies", currency::routes())
        .with_state(service)
}

/// Error returned by handlers, rendered as `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    Store(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Store(e) => {
                error!(error = %e, "Currency store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
