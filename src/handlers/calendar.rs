// src/handlers/calendar.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        auth::{AdminUser, AuthenticatedUser},
        i18n::Locale,
    },
    models::{
        calendar::{AvailabilityQuery, CalendarGrid, CalendarQuery, DayDetail, TeamAvailability},
        schedule::{NewSchedulePayload, ScheduleItem, ScheduleQuery},
    },
};

// GET /api/calendar/month?date=2024-03-15&selected=...&navigate=next
pub async fn month_view(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    Query(query): Query<CalendarQuery>,
) -> Json<CalendarGrid> {
    Json(app_state.calendar_service.month_view(&session, &query).await)
}

// GET /api/calendar/week
pub async fn week_view(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    Query(query): Query<CalendarQuery>,
) -> Json<CalendarGrid> {
    Json(app_state.calendar_service.week_view(&session, &query).await)
}

// GET /api/calendar/day
pub async fn day_view(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    Query(query): Query<CalendarQuery>,
) -> Json<DayDetail> {
    Json(app_state.calendar_service.day_view(&session, &query).await)
}

// GET /api/calendar/availability?date=2024-03-15&timeSlot=09:00-12:00
pub async fn availability(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<TeamAvailability>>, ApiError> {
    let teams = app_state
        .calendar_service
        .availability(&session, query.date, &query.time_slot)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(teams))
}

// GET /api/schedules?from=&to=&teamId=
pub async fn list_schedules(
    State(app_state): State<AppState>,
    AuthenticatedUser(session): AuthenticatedUser,
    Query(query): Query<ScheduleQuery>,
) -> Json<Vec<ScheduleItem>> {
    Json(app_state.calendar_service.list_schedules(&session, &query).await)
}

// POST /api/schedules
pub async fn create_schedule(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    Json(payload): Json<NewSchedulePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let item = app_state
        .calendar_service
        .create_schedule(payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(item)))
}

// DELETE /api/schedules/{id}
pub async fn delete_schedule(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .calendar_service
        .delete_schedule(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
