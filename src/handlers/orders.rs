// src/handlers/orders.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        auth::{AdminUser, AuthenticatedUser},
        i18n::Locale,
    },
    models::order::{FileUploadPayload, ImportOrderPayload, OrderData, OrderFile, OrderSearchQuery},
};

// GET /api/orders/search?q=  (modal de seleção de pedido)
pub async fn search_orders(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<OrderSearchQuery>,
) -> Json<Vec<OrderData>> {
    Json(app_state.order_service.search(&query.q).await)
}

// POST /api/orders  (importação em lote, upsert pelo número)
pub async fn import_orders(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    Json(payload): Json<Vec<ImportOrderPayload>>,
) -> Result<impl IntoResponse, ApiError> {
    let imported = app_state
        .order_service
        .import(payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(json!({ "imported": imported }))))
}

// GET /api/orders/{order_number}
pub async fn get_order(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(order_number): Path<String>,
) -> Result<Json<OrderData>, ApiError> {
    let order = app_state
        .order_service
        .get(&order_number)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(order))
}

// GET /api/orders/{order_number}/files
pub async fn list_order_files(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(order_number): Path<String>,
) -> Result<Json<Vec<OrderFile>>, ApiError> {
    let files = app_state
        .order_service
        .list_files(&order_number)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(files))
}

// POST /api/orders/{order_number}/files
pub async fn upload_order_file(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    Path(order_number): Path<String>,
    Json(upload): Json<FileUploadPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let file = app_state
        .order_service
        .add_file(&order_number, upload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(file)))
}
