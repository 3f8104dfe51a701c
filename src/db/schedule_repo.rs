// src/db/schedule_repo.rs

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        collection::Collection,
        store::{CollectionStore, StorageKey},
    },
    models::schedule::ScheduleItem,
};

#[derive(Clone)]
pub struct ScheduleRepository {
    schedules: Collection<ScheduleItem>,
}

impl ScheduleRepository {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self {
            schedules: Collection::new(store, StorageKey::Schedules),
        }
    }

    pub async fn get_all(&self) -> Vec<ScheduleItem> {
        self.schedules.get_all().await
    }

    pub async fn get_by_date(&self, date: NaiveDate) -> Vec<ScheduleItem> {
        self.schedules.find_by(|s| s.assigned_date == date).await
    }

    pub async fn get_in_range(&self, from: NaiveDate, to: NaiveDate) -> Vec<ScheduleItem> {
        self.schedules
            .find_by(|s| s.assigned_date >= from && s.assigned_date <= to)
            .await
    }

    pub async fn add(&self, item: ScheduleItem) -> Result<ScheduleItem, AppError> {
        self.schedules.add(item).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        self.schedules.delete(id).await
    }
}
