// src/models/calendar.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    common::date_utils::{Direction, ViewUnit},
    models::{exclusion::ExclusionEntry, schedule::ScheduleItem},
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub is_current_month: bool,
    pub is_today: bool,
    pub is_selected: bool,
    pub schedule_count: usize,
    pub exclusion_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarGrid {
    /// Data de referência depois da navegação
    pub date: NaiveDate,
    pub title: String,
    pub days: Vec<CalendarDay>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayDetail {
    pub date: NaiveDate,
    pub title: String,
    pub schedules: Vec<ScheduleItem>,
    pub exclusions: Vec<ExclusionEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamAvailability {
    pub team_id: Uuid,
    pub team_name: String,
    pub contractor_id: Uuid,
    pub available: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarQuery {
    pub date: Option<NaiveDate>,
    pub selected: Option<NaiveDate>,
    pub navigate: Option<Direction>,
    pub unit: Option<ViewUnit>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
    pub time_slot: String,
}
