// src/models/exclusion.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{common::validators::parse_time, db::collection::Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeType {
    AllDay,
    Am,
    Pm,
    Custom,
}

impl TimeType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::AllDay => "終日",
            Self::Am => "午前",
            Self::Pm => "午後",
            Self::Custom => "時間指定",
        }
    }
}

/// Dia (ou parte dele) em que uma equipe não pode receber trabalho.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExclusionEntry {
    pub id: Uuid,
    pub date: NaiveDate,
    pub team_id: Uuid,
    #[serde(default)]
    pub team_name: String,
    pub contractor_id: Uuid,
    pub time_type: TimeType,
    // "HH:MM", só com time_type == Custom
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[serde(default)]
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl Record for ExclusionEntry {
    fn id(&self) -> Uuid {
        self.id
    }
}

const NOON_SECONDS: u32 = 12 * 3600;

/// "09:00-12:00" ou "09:00〜12:00"
pub fn parse_time_slot(slot: &str) -> Option<(NaiveTime, NaiveTime)> {
    let (start, end) = slot.split_once('-').or_else(|| slot.split_once('〜'))?;
    Some((parse_time(start.trim())?, parse_time(end.trim())?))
}

impl ExclusionEntry {
    pub fn custom_range(&self) -> Option<(NaiveTime, NaiveTime)> {
        Some((
            parse_time(self.start_time.as_deref()?)?,
            parse_time(self.end_time.as_deref()?)?,
        ))
    }

    pub fn time_label(&self) -> String {
        match (self.time_type, &self.start_time, &self.end_time) {
            (TimeType::Custom, Some(start), Some(end)) => format!("{start}〜{end}"),
            (time_type, _, _) => time_type.label().to_string(),
        }
    }

    /// A entrada bloqueia o horário de agendamento? Horário ilegível é tratado como dia todo.
    pub fn blocks(&self, time_slot: &str) -> bool {
        let Some((slot_start, slot_end)) = parse_time_slot(time_slot) else {
            return true;
        };
        match self.time_type {
            TimeType::AllDay => true,
            TimeType::Am => slot_start.num_seconds_from_midnight() < NOON_SECONDS,
            TimeType::Pm => slot_end.num_seconds_from_midnight() > NOON_SECONDS,
            TimeType::Custom => match self.custom_range() {
                Some((start, end)) => slot_start < end && start < slot_end,
                None => true,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewExclusionPayload {
    pub date: NaiveDate,
    pub team_id: Uuid,
    pub time_type: TimeType,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[serde(default)]
    #[validate(length(max = 200, message = "理由は200文字以内で入力してください"))]
    pub reason: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExclusionQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub team_id: Option<Uuid>,
    pub contractor_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(time_type: TimeType, start: Option<&str>, end: Option<&str>) -> ExclusionEntry {
        ExclusionEntry {
            id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            team_id: Uuid::new_v4(),
            team_name: "1班".into(),
            contractor_id: Uuid::new_v4(),
            time_type,
            start_time: start.map(String::from),
            end_time: end.map(String::from),
            reason: "研修".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn half_days_block_their_side_of_noon() {
        let am = entry(TimeType::Am, None, None);
        assert!(am.blocks("09:00-12:00"));
        assert!(!am.blocks("13:00-17:00"));
        let pm = entry(TimeType::Pm, None, None);
        assert!(!pm.blocks("09:00-12:00"));
        assert!(pm.blocks("13:00-17:00"));
        assert!(entry(TimeType::AllDay, None, None).blocks("13:00-17:00"));
    }

    #[test]
    fn custom_blocks_overlapping_slots_only() {
        let e = entry(TimeType::Custom, Some("10:00"), Some("11:30"));
        assert!(e.blocks("09:00-10:30"));
        assert!(!e.blocks("11:30-12:00"));
        assert!(!e.blocks("08:00-10:00"));
        assert_eq!(e.time_label(), "10:00〜11:30");
    }

    #[test]
    fn serializes_snake_case_time_type() {
        let value = serde_json::to_value(entry(TimeType::AllDay, None, None)).unwrap();
        assert_eq!(value["timeType"], "all_day");
        assert_eq!(value["teamName"], "1班");
    }
}
