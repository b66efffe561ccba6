use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::catalog::repo::{self, Barber, Service};
use crate::error::ApiError;
use crate::state::AppState;

pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/barberos", get(list_barbers))
        .route("/barberos/:id", get(get_barber))
        .route("/servicios", get(list_services))
        .route("/servicios/:id", get(get_service))
}

#[instrument(skip(state))]
pub async fn list_barbers(State(state): State<AppState>) -> Result<Json<Vec<Barber>>, ApiError> {
    let barbers = repo::list_available_barbers(&state.db).await?;
    Ok(Json(barbers))
}

#[instrument(skip(state))]
pub async fn get_barber(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Barber>, ApiError> {
    let barber = repo::find_barber(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("barber not found"))?;
    Ok(Json(barber))
}

#[instrument(skip(state))]
pub async fn list_services(State(state): State<AppState>) -> Result<Json<Vec<Service>>, ApiError> {
    let services = repo::list_available_services(&state.db).await?;
    Ok(Json(services))
}

#[instrument(skip(state))]
pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Service>, ApiError> {
    let service = repo::find_service(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("service not found"))?;
    Ok(Json(service))
}
