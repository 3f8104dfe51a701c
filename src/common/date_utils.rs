// src/common/date_utils.rs
//
// Grade do calendário (mês/semana) e navegação. Funções puras, sem validação:
// o chrono já garante datas válidas.

use chrono::{Datelike, Duration, Local, Months, NaiveDate};
use serde::Deserialize;

pub const MONTH_GRID_DAYS: usize = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Prev,
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewUnit {
    Month,
    Week,
    Day,
}

fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// 6 semanas completas (42 dias), começando no domingo anterior ao dia 1.
pub fn month_days(date: NaiveDate) -> Vec<NaiveDate> {
    let first = date - Duration::days(date.day0() as i64);
    start_of_week(first).iter_days().take(MONTH_GRID_DAYS).collect()
}

/// Domingo a sábado da semana da data.
pub fn week_days(date: NaiveDate) -> Vec<NaiveDate> {
    start_of_week(date).iter_days().take(7).collect()
}

/// Dia 31 + 1 mês cai no último dia do mês seguinte.
pub fn navigate_month(date: NaiveDate, direction: Direction) -> NaiveDate {
    let shifted = match direction {
        Direction::Prev => date.checked_sub_months(Months::new(1)),
        Direction::Next => date.checked_add_months(Months::new(1)),
    };
    shifted.unwrap_or(date)
}

pub fn navigate_week(date: NaiveDate, direction: Direction) -> NaiveDate {
    shift_days(date, direction, 7)
}

pub fn navigate_day(date: NaiveDate, direction: Direction) -> NaiveDate {
    shift_days(date, direction, 1)
}

pub fn navigate(date: NaiveDate, unit: ViewUnit, direction: Direction) -> NaiveDate {
    match unit {
        ViewUnit::Month => navigate_month(date, direction),
        ViewUnit::Week => navigate_week(date, direction),
        ViewUnit::Day => navigate_day(date, direction),
    }
}

fn shift_days(date: NaiveDate, direction: Direction, days: i64) -> NaiveDate {
    let delta = match direction {
        Direction::Prev => Duration::days(-days),
        Direction::Next => Duration::days(days),
    };
    date.checked_add_signed(delta).unwrap_or(date)
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn is_today(date: NaiveDate) -> bool {
    date == today()
}

pub fn is_current_month(date: NaiveDate, reference: NaiveDate) -> bool {
    date.year() == reference.year() && date.month() == reference.month()
}

pub fn is_selected_date(date: NaiveDate, selected: Option<NaiveDate>) -> bool {
    selected == Some(date)
}
