// src/handlers/applications.rs
//
// Os mesmos handlers servem 調査 / 共架 / 工事: a variante vem do tipo genérico,
// montado em `routes::<T>()`.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    common::{error::ApiError, formatters::content_disposition},
    config::AppState,
    middleware::{
        auth::{AdminUser, AuthenticatedUser},
        i18n::Locale,
    },
    models::{
        application::{Application, NewApplication, ProgressReport},
        order::FileUploadPayload,
    },
    services::application_filters::ApplicationFilters,
};

pub fn routes<T: Application>() -> Router<AppState> {
    Router::new()
        .route("/", get(list_applications::<T>).post(create_application::<T>))
        .route("/{id}", get(get_application::<T>).patch(edit_application::<T>))
        .route("/{id}/progress", post(report_progress::<T>))
        .route("/{id}/attachments", post(upload_attachment::<T>))
        .route("/{id}/attachments/{file_id}", get(download_attachment::<T>))
}

// GET /api/applications/{kind}?orderNumber=...&status=...
// Os pares são reaplicados na ordem, com as mesmas limpezas da tela.
pub async fn list_applications<T: Application>(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    Query(pairs): Query<Vec<(String, String)>>,
) -> impl IntoResponse {
    let filters =
        ApplicationFilters::from_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    let items = app_state
        .application_service
        .list::<T>(&session, &filters)
        .await;

    Json(json!({
        "total": items.len(),
        "items": items,
        "activeFilterCount": filters.active_filter_count(),
        "filters": filters,
    }))
}

// GET /api/applications/{kind}/{id}
pub async fn get_application<T: Application>(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<T>, ApiError> {
    let item = app_state
        .application_service
        .get::<T>(&session, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(item))
}

// POST /api/applications/{kind}  (modal 新規依頼, só admin)
pub async fn create_application<T: Application>(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    Json(payload): Json<NewApplication<T::Details>>,
) -> Result<impl IntoResponse, ApiError> {
    let created = app_state
        .application_service
        .create::<T>(payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(created)))
}

// PATCH /api/applications/{kind}/{id}  (merge raso; objetos aninhados vão inteiros)
pub async fn edit_application<T: Application>(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(partial): Json<Value>,
) -> Result<Json<T>, ApiError> {
    let updated = app_state
        .application_service
        .edit::<T>(id, partial)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(updated))
}

// POST /api/applications/{kind}/{id}/progress  (未完了 / 完了)
pub async fn report_progress<T: Application>(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(report): Json<ProgressReport>,
) -> Result<Json<T>, ApiError> {
    let updated = app_state
        .application_service
        .report_progress::<T>(&session, id, report)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(updated))
}

// POST /api/applications/{kind}/{id}/attachments
pub async fn upload_attachment<T: Application>(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(upload): Json<FileUploadPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = app_state
        .application_service
        .add_attachment::<T>(&session, id, upload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(updated)))
}

// GET /api/applications/{kind}/{id}/attachments/{file_id}
pub async fn download_attachment<T: Application>(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
    Path((id, file_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let (file, bytes) = app_state
        .application_service
        .get_attachment::<T>(&session, id, file_id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        [
            (header::CONTENT_TYPE, file.content_type),
            (header::CONTENT_DISPOSITION, content_disposition(&file.file_name)),
        ],
        bytes,
    ))
}
