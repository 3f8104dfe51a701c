// src/services/calendar_service.rs

use chrono::NaiveDate;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        date_utils::{
            is_current_month, is_selected_date, is_today, month_days, navigate, today, week_days,
            ViewUnit,
        },
        error::AppError,
        formatters::format_date_jp,
    },
    db::{AccountRepository, ExclusionRepository, ScheduleRepository},
    models::{
        application::AssigneeType,
        auth::Session,
        calendar::{CalendarDay, CalendarGrid, CalendarQuery, DayDetail, TeamAvailability},
        exclusion::{parse_time_slot, ExclusionEntry},
        schedule::{NewSchedulePayload, ScheduleItem, ScheduleQuery},
    },
};

#[derive(Clone)]
pub struct CalendarService {
    schedules: ScheduleRepository,
    exclusions: ExclusionRepository,
    accounts: AccountRepository,
}

impl CalendarService {
    pub fn new(
        schedules: ScheduleRepository,
        exclusions: ExclusionRepository,
        accounts: AccountRepository,
    ) -> Self {
        Self {
            schedules,
            exclusions,
            accounts,
        }
    }

    /// Data de referência: `date` (ou hoje), deslocada se vier `navigate`.
    fn reference_date(query: &CalendarQuery, default_unit: ViewUnit) -> NaiveDate {
        let date = query.date.unwrap_or_else(today);
        match query.navigate {
            Some(direction) => navigate(date, query.unit.unwrap_or(default_unit), direction),
            None => date,
        }
    }

    pub async fn month_view(&self, session: &Session, query: &CalendarQuery) -> CalendarGrid {
        let date = Self::reference_date(query, ViewUnit::Month);
        let days = month_days(date);
        let title = format!("{}年{}月", date.format("%Y"), date.format("%-m"));
        self.grid(session, date, title, days, query.selected)
            .await
    }

    pub async fn week_view(&self, session: &Session, query: &CalendarQuery) -> CalendarGrid {
        let date = Self::reference_date(query, ViewUnit::Week);
        let days = week_days(date);
        let title = match (days.first(), days.last()) {
            (Some(first), Some(last)) => {
                format!("{} 〜 {}", format_date_jp(*first), format_date_jp(*last))
            }
            _ => format_date_jp(date),
        };
        self.grid(session, date, title, days, query.selected).await
    }

    pub async fn day_view(&self, session: &Session, query: &CalendarQuery) -> DayDetail {
        let date = Self::reference_date(query, ViewUnit::Day);
        let mut schedules = scoped_schedules(session, self.schedules.get_by_date(date).await);
        schedules.sort_by(|a, b| a.time_slot.cmp(&b.time_slot));

        DayDetail {
            date,
            title: format_date_jp(date),
            schedules,
            exclusions: scoped_exclusions(session, self.exclusions.get_by_date(date).await),
        }
    }

    async fn grid(
        &self,
        session: &Session,
        date: NaiveDate,
        title: String,
        days: Vec<NaiveDate>,
        selected: Option<NaiveDate>,
    ) -> CalendarGrid {
        let (Some(&from), Some(&to)) = (days.first(), days.last()) else {
            return CalendarGrid {
                date,
                title,
                days: Vec::new(),
            };
        };
        let schedules = scoped_schedules(session, self.schedules.get_in_range(from, to).await);
        let exclusions = scoped_exclusions(session, self.exclusions.get_in_range(from, to).await);

        let days = days
            .into_iter()
            .map(|day| CalendarDay {
                date: day,
                is_current_month: is_current_month(day, date),
                is_today: is_today(day),
                is_selected: is_selected_date(day, selected),
                schedule_count: schedules.iter().filter(|s| s.assigned_date == day).count(),
                exclusion_count: exclusions.iter().filter(|e| e.date == day).count(),
            })
            .collect();

        CalendarGrid { date, title, days }
    }

    /// Equipes ativas e se estão livres no horário
    /// (sem 除外日 que bloqueie e sem agenda sobreposta).
    pub async fn availability(
        &self,
        session: &Session,
        date: NaiveDate,
        time_slot: &str,
    ) -> Result<Vec<TeamAvailability>, AppError> {
        let slot = parse_time_slot(time_slot)
            .ok_or_else(|| AppError::InvalidInput(format!("time slot '{time_slot}'")))?;
        let exclusions = self.exclusions.get_by_date(date).await;
        let schedules = self.schedules.get_by_date(date).await;

        let teams = self
            .accounts
            .get_teams()
            .await
            .into_iter()
            .filter(|t| t.is_active && session.can_access_contractor(Some(t.contractor_id)));

        Ok(teams
            .map(|team| {
                let excluded = exclusions
                    .iter()
                    .any(|e| e.team_id == team.id && e.blocks(time_slot));
                let booked = schedules.iter().any(|s| {
                    s.team_id == Some(team.id)
                        && parse_time_slot(&s.time_slot)
                            .map_or(true, |(start, end)| start < slot.1 && slot.0 < end)
                });
                TeamAvailability {
                    team_id: team.id,
                    team_name: team.team_name,
                    contractor_id: team.contractor_id,
                    available: !excluded && !booked,
                }
            })
            .collect())
    }

    // =========================================================================
    //  AGENDA
    // =========================================================================

    pub async fn list_schedules(
        &self,
        session: &Session,
        query: &ScheduleQuery,
    ) -> Vec<ScheduleItem> {
        let items = match (query.from, query.to) {
            (Some(from), Some(to)) => self.schedules.get_in_range(from, to).await,
            _ => self.schedules.get_all().await,
        };
        let mut items: Vec<ScheduleItem> = scoped_schedules(session, items)
            .into_iter()
            .filter(|s| query.from.map_or(true, |from| s.assigned_date >= from))
            .filter(|s| query.to.map_or(true, |to| s.assigned_date <= to))
            .filter(|s| query.team_id.map_or(true, |team| s.team_id == Some(team)))
            .collect();
        items.sort_by(|a, b| {
            a.assigned_date
                .cmp(&b.assigned_date)
                .then_with(|| a.time_slot.cmp(&b.time_slot))
        });
        items
    }

    pub async fn create_schedule(
        &self,
        payload: NewSchedulePayload,
    ) -> Result<ScheduleItem, AppError> {
        payload.validate()?;
        if parse_time_slot(&payload.time_slot).is_none() {
            return Err(AppError::InvalidInput(format!("time slot '{}'", payload.time_slot)));
        }

        let team = self
            .accounts
            .get_team(payload.team_id)
            .await
            .ok_or_else(|| AppError::ResourceNotFound(format!("team {}", payload.team_id)))?;
        let contractor = self
            .accounts
            .get_contractor(team.contractor_id)
            .await
            .ok_or_else(|| {
                AppError::ResourceNotFound(format!("contractor {}", team.contractor_id))
            })?;

        let assignee_type = if contractor.is_internal() {
            AssigneeType::Internal
        } else {
            AssigneeType::Contractor
        };

        self.schedules
            .add(ScheduleItem {
                id: Uuid::new_v4(),
                assigned_date: payload.assigned_date,
                time_slot: payload.time_slot,
                assignee_type,
                contractor_id: Some(contractor.id),
                contractor_name: contractor.name,
                team_id: Some(team.id),
                team_name: team.team_name,
                customer_code: payload.customer_code,
                customer_name: payload.customer_name,
                address: payload.address,
                work_type: payload.work_type,
            })
            .await
    }

    pub async fn delete_schedule(&self, id: Uuid) -> Result<(), AppError> {
        if !self.schedules.delete(id).await? {
            return Err(AppError::ResourceNotFound(format!("schedule {id}")));
        }
        Ok(())
    }
}

fn scoped_schedules(session: &Session, items: Vec<ScheduleItem>) -> Vec<ScheduleItem> {
    items
        .into_iter()
        .filter(|s| session.can_access_contractor(s.contractor_id))
        .collect()
}

fn scoped_exclusions(session: &Session, items: Vec<ExclusionEntry>) -> Vec<ExclusionEntry> {
    items
        .into_iter()
        .filter(|e| session.can_access_contractor(Some(e.contractor_id)))
        .collect()
}
