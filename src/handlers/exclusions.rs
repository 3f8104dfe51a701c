// src/handlers/exclusions.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::exclusion::{ExclusionEntry, ExclusionQuery, NewExclusionPayload},
};

// GET /api/exclusions?from=&to=&teamId=&contractorId=
pub async fn list_exclusions(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    Query(query): Query<ExclusionQuery>,
) -> Json<Vec<ExclusionEntry>> {
    Json(app_state.exclusion_service.list(&session, &query).await)
}

// POST /api/exclusions
pub async fn create_exclusion(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
    Json(payload): Json<NewExclusionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = app_state
        .exclusion_service
        .create(&session, payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(entry)))
}

// PATCH /api/exclusions/{id}
pub async fn update_exclusion(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(partial): Json<Value>,
) -> Result<Json<ExclusionEntry>, ApiError> {
    let entry = app_state
        .exclusion_service
        .update(&session, id, partial)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(entry))
}

// DELETE /api/exclusions/{id}
pub async fn delete_exclusion(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .exclusion_service
        .delete(&session, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
