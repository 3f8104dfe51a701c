// src/db/exclusion_repo.rs

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        collection::Collection,
        store::{CollectionStore, StorageKey},
    },
    models::exclusion::ExclusionEntry,
};

#[derive(Clone)]
pub struct ExclusionRepository {
    exclusions: Collection<ExclusionEntry>,
}

impl ExclusionRepository {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self {
            exclusions: Collection::new(store, StorageKey::Exclusions),
        }
    }

    pub async fn get_all(&self) -> Vec<ExclusionEntry> {
        self.exclusions.get_all().await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Option<ExclusionEntry> {
        self.exclusions.get_by_id(id).await
    }

    pub async fn get_by_date(&self, date: NaiveDate) -> Vec<ExclusionEntry> {
        self.exclusions.find_by(|e| e.date == date).await
    }

    pub async fn get_by_contractor(&self, contractor_id: Uuid) -> Vec<ExclusionEntry> {
        self.exclusions.find_by(|e| e.contractor_id == contractor_id).await
    }

    /// Intervalo fechado [from, to]
    pub async fn get_in_range(&self, from: NaiveDate, to: NaiveDate) -> Vec<ExclusionEntry> {
        self.exclusions
            .find_by(|e| e.date >= from && e.date <= to)
            .await
    }

    pub async fn add(&self, entry: ExclusionEntry) -> Result<ExclusionEntry, AppError> {
        self.exclusions.add(entry).await
    }

    pub async fn replace(&self, entry: ExclusionEntry) -> Result<Option<ExclusionEntry>, AppError> {
        self.exclusions.replace(entry).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        self.exclusions.delete(id).await
    }

    /// Usado quando uma equipe é apagada.
    pub async fn delete_by_team(&self, team_id: Uuid) -> Result<usize, AppError> {
        self.exclusions.delete_where(|e| e.team_id == team_id).await
    }
}
