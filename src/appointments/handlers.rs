use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};

use crate::appointments::dto::{CitaCreated, CitaDetails, CreateCitaRequest, MessageResponse};
use crate::appointments::policy::{self, CitaScope};
use crate::appointments::repo;
use crate::appointments::service;
use crate::auth::jwt::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

pub fn cita_routes() -> Router<AppState> {
    Router::new()
        .route("/citas", get(list_citas).post(create_cita))
        .route("/citas/:id", get(get_cita).delete(delete_cita))
        .route("/citas/:id/pagar", put(mark_paid))
}

#[instrument(skip(state))]
pub async fn list_citas(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<Vec<CitaDetails>>, ApiError> {
    let rows = match policy::list_scope(&caller) {
        CitaScope::All => repo::list_all(&state.db).await?,
        CitaScope::OwnedBy(user_id) => repo::list_by_owner(&state.db, user_id).await?,
    };
    let citas = rows
        .into_iter()
        .map(|row| CitaDetails::from_row(row, true))
        .collect();
    Ok(Json(citas))
}

#[instrument(skip(state))]
pub async fn get_cita(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<CitaDetails>, ApiError> {
    let row = repo::find_joined(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("appointment not found"))?;
    policy::owner_or_admin(&caller, row.owner_id)?;
    Ok(Json(CitaDetails::from_row(row, false)))
}

#[instrument(skip(state, payload))]
pub async fn create_cita(
    State(state): State<AppState>,
    caller: Option<AuthUser>,
    Json(payload): Json<CreateCitaRequest>,
) -> Result<(StatusCode, HeaderMap, Json<CitaCreated>), ApiError> {
    let cita_id = service::create_cita(&state, caller.as_ref(), &payload).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::LOCATION,
        format!("/api/citas/{cita_id}").parse().unwrap(),
    );

    Ok((
        StatusCode::CREATED,
        headers,
        Json(CitaCreated {
            message: "appointment created".into(),
            cita_id,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn delete_cita(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let owner_id = repo::find_owner_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("appointment not found"))?;
    policy::owner_or_admin(&caller, owner_id)?;

    repo::delete(&state.db, id).await?;
    info!(cita_id = %id, user_id = %caller.id, "appointment deleted");
    Ok(Json(MessageResponse {
        message: "appointment deleted".into(),
    }))
}

#[instrument(skip(state))]
pub async fn mark_paid(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let owner_id = repo::find_owner_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found("appointment not found"))?;
    policy::owner_or_admin(&caller, owner_id)?;

    repo::mark_paid(&state.db, id).await?;
    info!(cita_id = %id, user_id = %caller.id, "appointment marked as paid");
    Ok(Json(MessageResponse {
        message: "appointment marked as paid".into(),
    }))
}
