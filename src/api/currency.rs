use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use tracing::{debug, instrument};

use super::{ApiError, AppState};
use crate::core::currency::CurrencyRecord;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_currencies))
        .route("/:code", get(get_exchange_rate).post(add_currency))
}

#[instrument(skip(service))]
async fn get_currencies(
    State(service): State<AppState>,
) -> Result<Json<Vec<CurrencyRecord>>, ApiError> {
    let currencies = service.list_currencies().await?;
    debug!(count = currencies.len(), "Listing currencies");
    Ok(Json(currencies))
}

/// Cached record for the code, `null` when it has not been refreshed yet.
#[instrument(skip(service))]
async fn get_exchange_rate(
    State(service): State<AppState>,
    Path(code): Path<String>,
) -> Json<Option<CurrencyRecord>> {
    Json(service.get_exchange_rate(&code))
}

#[instrument(skip(service))]
async fn add_currency(
    State(service): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<CurrencyRecord>, ApiError> {
    Ok(Json(service.add_currency(&code).await?))
}
