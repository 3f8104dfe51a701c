// src/handlers/accounts.rs
//
// Cadastro de contratadas, equipes e admins. Tudo aqui é só de admin.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AdminUser, i18n::Locale},
    models::account::{
        Admin, Contractor, ContractorWithTeams, NewAccountPayload, NewTeamPayload, Team,
    },
};

// =============================================================================
//  CONTRATADAS
// =============================================================================

// GET /api/contractors
pub async fn list_contractors(
    State(app_state): State<AppState>,
    _admin: AdminUser,
) -> Json<Vec<ContractorWithTeams>> {
    Json(app_state.account_service.list_contractors().await)
}

// POST /api/contractors
pub async fn create_contractor(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    Json(payload): Json<NewAccountPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let contractor = app_state
        .account_service
        .create_contractor(payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(contractor)))
}

// PATCH /api/contractors/{id}
pub async fn update_contractor(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(partial): Json<Value>,
) -> Result<Json<Contractor>, ApiError> {
    let contractor = app_state
        .account_service
        .update_contractor(id, partial)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(contractor))
}

// DELETE /api/contractors/{id}  (equipes e 除外日 vão junto)
pub async fn delete_contractor(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .account_service
        .delete_contractor(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  EQUIPES
// =============================================================================

// GET /api/contractors/{id}/teams
pub async fn list_teams(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    Path(contractor_id): Path<Uuid>,
) -> Result<Json<Vec<Team>>, ApiError> {
    let teams = app_state
        .account_service
        .list_teams(contractor_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(teams))
}

// POST /api/contractors/{id}/teams
pub async fn create_team(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    Path(contractor_id): Path<Uuid>,
    Json(payload): Json<NewTeamPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let team = app_state
        .account_service
        .create_team(contractor_id, payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(team)))
}

// PATCH /api/teams/{id}
pub async fn update_team(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(partial): Json<Value>,
) -> Result<Json<Team>, ApiError> {
    let team = app_state
        .account_service
        .update_team(id, partial)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(team))
}

// DELETE /api/teams/{id}
pub async fn delete_team(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .account_service
        .delete_team(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ADMINS
// =============================================================================

// GET /api/admins
pub async fn list_admins(State(app_state): State<AppState>, _admin: AdminUser) -> Json<Vec<Admin>> {
    Json(app_state.account_service.list_admins().await)
}

// POST /api/admins
pub async fn create_admin(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    Json(payload): Json<NewAccountPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let admin = app_state
        .account_service
        .create_admin(payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(admin)))
}

// PATCH /api/admins/{id}
pub async fn update_admin(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(partial): Json<Value>,
) -> Result<Json<Admin>, ApiError> {
    let admin = app_state
        .account_service
        .update_admin(id, partial)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(admin))
}

// DELETE /api/admins/{id}
pub async fn delete_admin(
    State(app_state): State<AppState>,
    locale: Locale,
    AdminUser(session): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .account_service
        .delete_admin(&session, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
