// src/services/exclusion_service.rs

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, formatters::format_date, validators::parse_time},
    db::{collection::shallow_merge, AccountRepository, ExclusionRepository},
    models::{
        account::Team,
        auth::Session,
        exclusion::{ExclusionEntry, ExclusionQuery, NewExclusionPayload, TimeType},
    },
};

#[derive(Clone)]
pub struct ExclusionService {
    repo: ExclusionRepository,
    accounts: AccountRepository,
}

impl ExclusionService {
    pub fn new(repo: ExclusionRepository, accounts: AccountRepository) -> Self {
        Self { repo, accounts }
    }

    /// Ordenado por data; contratadas só veem as próprias equipes.
    pub async fn list(&self, session: &Session, query: &ExclusionQuery) -> Vec<ExclusionEntry> {
        let contractor_filter = session.contractor_scope().or(query.contractor_id);

        let entries = match contractor_filter {
            Some(contractor_id) => self.repo.get_by_contractor(contractor_id).await,
            None => self.repo.get_all().await,
        };
        let mut entries: Vec<ExclusionEntry> = entries
            .into_iter()
            .filter(|e| query.from.map_or(true, |from| e.date >= from))
            .filter(|e| query.to.map_or(true, |to| e.date <= to))
            .filter(|e| query.team_id.map_or(true, |team| e.team_id == team))
            .collect();
        entries.sort_by(|a, b| a.date.cmp(&b.date));
        entries
    }

    pub async fn create(
        &self,
        session: &Session,
        payload: NewExclusionPayload,
    ) -> Result<ExclusionEntry, AppError> {
        payload.validate()?;
        let team = self.owned_team(session, payload.team_id).await?;

        let mut entry = ExclusionEntry {
            id: Uuid::new_v4(),
            date: payload.date,
            team_id: team.id,
            team_name: team.team_name,
            contractor_id: team.contractor_id,
            time_type: payload.time_type,
            start_time: payload.start_time,
            end_time: payload.end_time,
            reason: payload.reason,
            created_at: Utc::now(),
        };
        normalize_times(&mut entry)?;

        let created = self.repo.add(entry).await?;
        tracing::info!(
            "⛔ 除外日 {} para '{}' ({})",
            format_date(created.date),
            created.team_name,
            created.time_label()
        );
        Ok(created)
    }

    /// Merge raso e revalidação. Nome da equipe e contratada sempre vêm da equipe.
    pub async fn update(
        &self,
        session: &Session,
        id: Uuid,
        partial: Value,
    ) -> Result<ExclusionEntry, AppError> {
        let existing = self.owned_entry(session, id).await?;
        let mut merged: ExclusionEntry = shallow_merge(&existing, partial)?;

        let team = self.owned_team(session, merged.team_id).await?;
        merged.team_name = team.team_name;
        merged.contractor_id = team.contractor_id;
        merged.created_at = existing.created_at;
        normalize_times(&mut merged)?;

        self.repo
            .replace(merged)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("exclusion {id}")))
    }

    pub async fn delete(&self, session: &Session, id: Uuid) -> Result<(), AppError> {
        self.owned_entry(session, id).await?;
        self.repo.delete(id).await?;
        Ok(())
    }

    async fn owned_entry(&self, session: &Session, id: Uuid) -> Result<ExclusionEntry, AppError> {
        let entry = self
            .repo
            .get_by_id(id)
            .await
            .ok_or_else(|| AppError::ResourceNotFound(format!("exclusion {id}")))?;
        if !session.can_access_contractor(Some(entry.contractor_id)) {
            return Err(AppError::Forbidden);
        }
        Ok(entry)
    }

    async fn owned_team(&self, session: &Session, team_id: Uuid) -> Result<Team, AppError> {
        let team = self
            .accounts
            .get_team(team_id)
            .await
            .ok_or_else(|| AppError::ResourceNotFound(format!("team {team_id}")))?;
        if !session.can_access_contractor(Some(team.contractor_id)) {
            return Err(AppError::Forbidden);
        }
        Ok(team)
    }
}

/// Horários só existem para `custom`, e aí precisam ser "HH:MM" com início < fim.
fn normalize_times(entry: &mut ExclusionEntry) -> Result<(), AppError> {
    if entry.time_type != TimeType::Custom {
        entry.start_time = None;
        entry.end_time = None;
        return Ok(());
    }

    let start = entry.start_time.as_deref().and_then(parse_time);
    let end = entry.end_time.as_deref().and_then(parse_time);
    match (start, end) {
        (Some(start), Some(end)) if start < end => Ok(()),
        (Some(_), Some(_)) => Err(AppError::InvalidInput(
            "開始時刻は終了時刻より前にしてください".into(),
        )),
        _ => Err(AppError::MissingFields(vec!["開始時刻".into(), "終了時刻".into()])),
    }
}
