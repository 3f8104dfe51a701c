// src/db/application_repo.rs

use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{collection::Collection, store::CollectionStore},
    models::application::Application,
};

/// As três coleções de solicitações (調査 / 共架 / 工事); a variante escolhe a chave.
#[derive(Clone)]
pub struct ApplicationRepository {
    store: Arc<dyn CollectionStore>,
}

impl ApplicationRepository {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self { store }
    }

    fn collection<T: Application>(&self) -> Collection<T> {
        Collection::new(self.store.clone(), T::KEY)
    }

    pub async fn get_all<T: Application>(&self) -> Vec<T> {
        self.collection::<T>().get_all().await
    }

    pub async fn get_by_id<T: Application>(&self, id: Uuid) -> Option<T> {
        self.collection::<T>().get_by_id(id).await
    }

    pub async fn get_by_contractor<T: Application>(&self, contractor_id: Uuid) -> Vec<T> {
        self.collection::<T>()
            .find_by(|item| item.core().contractor_id == Some(contractor_id))
            .await
    }

    pub async fn next_serial_number<T: Application>(&self) -> Result<u32, AppError> {
        self.collection::<T>()
            .load_for_write()
            .await?
            .iter()
            .map(|item| item.core().serial_number)
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| {
                AppError::InternalServerError(anyhow::anyhow!(
                    "Números de série esgotados em '{}'",
                    T::KEY.as_str()
                ))
            })
    }

    pub async fn add<T: Application>(&self, item: T) -> Result<T, AppError> {
        self.collection::<T>().add(item).await
    }

    /// Merge raso: objetos aninhados precisam vir inteiros.
    pub async fn update<T: Application>(
        &self,
        id: Uuid,
        partial: Value,
    ) -> Result<Option<T>, AppError> {
        self.collection::<T>().update(id, partial).await
    }

    pub async fn replace<T: Application>(&self, item: T) -> Result<Option<T>, AppError> {
        self.collection::<T>().replace(item).await
    }
}
