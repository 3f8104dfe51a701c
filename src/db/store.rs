// src/db/store.rs

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{types::Json, PgPool};
use tokio::sync::RwLock;

use crate::common::error::AppError;

/// Chaves fixas das coleções persistidas (uma por entidade).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Users,
    Admins,
    Contractors,
    Teams,
    Schedules,
    Exclusions,
    SurveyApplications,
    AttachmentApplications,
    ConstructionApplications,
    Orders,
    OrderFiles,
}

impl StorageKey {
    pub const ALL: [StorageKey; 11] = [
        Self::Users,
        Self::Admins,
        Self::Contractors,
        Self::Teams,
        Self::Schedules,
        Self::Exclusions,
        Self::SurveyApplications,
        Self::AttachmentApplications,
        Self::ConstructionApplications,
        Self::Orders,
        Self::OrderFiles,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Admins => "admins",
            Self::Contractors => "contractors",
            Self::Teams => "teams",
            Self::Schedules => "schedules",
            Self::Exclusions => "exclusions",
            Self::SurveyApplications => "surveyApplications",
            Self::AttachmentApplications => "attachmentApplications",
            Self::ConstructionApplications => "constructionApplications",
            Self::Orders => "orders",
            Self::OrderFiles => "orderFiles",
        }
    }
}

/// Onde os arrays JSON moram. Leitura devolve `None` se a chave nunca foi gravada.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    async fn load(&self, key: StorageKey) -> Result<Option<Value>, AppError>;
    async fn store(&self, key: StorageKey, data: Value) -> Result<(), AppError>;
}

/// Grava `[]` nas chaves que ainda não existem. Coleções já gravadas ficam intactas.
pub async fn initialize_collections(store: &dyn CollectionStore) -> Result<usize, AppError> {
    let mut created = 0;
    for key in StorageKey::ALL {
        if store.load(key).await?.is_none() {
            store.store(key, Value::Array(Vec::new())).await?;
            created += 1;
        }
    }
    Ok(created)
}

// =========================================================================
//  POSTGRES (uma linha JSONB por coleção)
// =========================================================================

#[derive(Clone)]
pub struct PgCollectionStore {
    pool: PgPool,
}

impl PgCollectionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CollectionStore for PgCollectionStore {
    async fn load(&self, key: StorageKey) -> Result<Option<Value>, AppError> {
        let row = sqlx::query_as::<_, (Json<Value>,)>("SELECT data FROM collections WHERE key = $1")
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(Json(data),)| data))
    }

    async fn store(&self, key: StorageKey, data: Value) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO collections (key, data, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (key)
            DO UPDATE SET data = EXCLUDED.data, updated_at = NOW()
            "#,
        )
        .bind(key.as_str())
        .bind(Json(data))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =========================================================================
//  MEMÓRIA (sem DATABASE_URL, e nos testes)
// =========================================================================

#[derive(Default)]
pub struct MemoryCollectionStore {
    collections: RwLock<HashMap<StorageKey, Value>>,
}

impl MemoryCollectionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CollectionStore for MemoryCollectionStore {
    async fn load(&self, key: StorageKey) -> Result<Option<Value>, AppError> {
        Ok(self.collections.read().await.get(&key).cloned())
    }

    async fn store(&self, key: StorageKey, data: Value) -> Result<(), AppError> {
        self.collections.write().await.insert(key, data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn memory_store_keeps_collections_apart() {
        let store = MemoryCollectionStore::new();
        assert!(store.load(StorageKey::Teams).await.unwrap().is_none());

        store.store(StorageKey::Teams, json!([{ "id": 1 }])).await.unwrap();
        assert_eq!(store.load(StorageKey::Teams).await.unwrap(), Some(json!([{ "id": 1 }])));
        assert!(store.load(StorageKey::Contractors).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn initialize_creates_only_missing_keys() {
        let store = MemoryCollectionStore::new();
        store.store(StorageKey::Orders, json!([{ "id": 1 }])).await.unwrap();

        assert_eq!(initialize_collections(&store).await.unwrap(), StorageKey::ALL.len() - 1);
        assert_eq!(store.load(StorageKey::Users).await.unwrap(), Some(json!([])));
        assert_eq!(store.load(StorageKey::Orders).await.unwrap(), Some(json!([{ "id": 1 }])));
        assert_eq!(initialize_collections(&store).await.unwrap(), 0);
    }
}
