// src/models/schedule.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{db::collection::Record, models::application::AssigneeType};

/// Trabalho já atribuído a uma equipe num dia/horário.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    pub id: Uuid,
    pub assigned_date: NaiveDate,
    // "09:00-12:00"
    pub time_slot: String,
    pub assignee_type: AssigneeType,
    pub contractor_id: Option<Uuid>,
    #[serde(default)]
    pub contractor_name: String,
    pub team_id: Option<Uuid>,
    #[serde(default)]
    pub team_name: String,
    #[serde(default)]
    pub customer_code: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub work_type: String,
}

impl Record for ScheduleItem {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewSchedulePayload {
    pub assigned_date: NaiveDate,
    #[validate(length(min = 1, message = "時間帯を入力してください"))]
    pub time_slot: String,
    pub team_id: Uuid,
    #[serde(default)]
    pub customer_code: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub work_type: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub team_id: Option<Uuid>,
}
