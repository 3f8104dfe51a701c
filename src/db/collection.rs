// src/db/collection.rs

use std::{marker::PhantomData, sync::Arc};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{CollectionStore, StorageKey},
};

/// Registro guardado numa coleção nomeada.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;
}

/// `{...existing, ...partial}`: chaves de topo do patch substituem as do registro.
///
/// O merge é RASO. Um objeto aninhado (`attachments`, `constructionResult`)
/// enviado pela metade substitui o objeto inteiro e os campos omitidos se
/// perdem. Quem chama deve mandar o objeto aninhado completo.
/// A chave `id` do patch é ignorada.
pub fn shallow_merge<T: Record>(existing: &T, partial: Value) -> Result<T, AppError> {
    let Value::Object(patch) = partial else {
        return Err(AppError::InvalidInput("patch must be a JSON object".into()));
    };

    let mut merged = serde_json::to_value(existing)?;
    if let Value::Object(fields) = &mut merged {
        for (key, value) in patch {
            if key != "id" {
                fields.insert(key, value);
            }
        }
    }

    Ok(serde_json::from_value(merged)?)
}

/// Adaptador de uma coleção: get-all / save-all / add / update / delete / get-by.
/// Cada operação é um ciclo ler-modificar-gravar sem trava (último a gravar vence).
pub struct Collection<T> {
    store: Arc<dyn CollectionStore>,
    key: StorageKey,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            key: self.key,
            _marker: PhantomData,
        }
    }
}

impl<T: Record> Collection<T> {
    pub fn new(store: Arc<dyn CollectionStore>, key: StorageKey) -> Self {
        Self {
            store,
            key,
            _marker: PhantomData,
        }
    }

    /// Falha de leitura vira coleção vazia (com log), nunca erro.
    pub async fn get_all(&self) -> Vec<T> {
        let raw = match self.store.load(self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::error!("🔥 Falha ao ler a coleção '{}': {}", self.key.as_str(), e);
                return Vec::new();
            }
        };

        match serde_json::from_value(raw) {
            Ok(items) => items,
            Err(e) => {
                tracing::error!("🔥 Coleção '{}' ilegível, usando vazio: {}", self.key.as_str(), e);
                Vec::new()
            }
        }
    }

    /// Leitura dos ciclos de escrita: erro do store ou JSON ilegível propaga.
    pub(crate) async fn load_for_write(&self) -> Result<Vec<T>, AppError> {
        match self.store.load(self.key).await? {
            Some(raw) => Ok(serde_json::from_value(raw)?),
            None => Ok(Vec::new()),
        }
    }

    pub async fn save_all(&self, items: &[T]) -> Result<(), AppError> {
        let data = serde_json::to_value(items)?;
        self.store.store(self.key, data).await
    }

    pub async fn add(&self, item: T) -> Result<T, AppError> {
        let mut items = self.load_for_write().await?;
        items.push(item.clone());
        self.save_all(&items).await?;
        Ok(item)
    }

    /// Merge raso (ver [`shallow_merge`]). `None` se o id não existe.
    pub async fn update(&self, id: Uuid, partial: Value) -> Result<Option<T>, AppError> {
        let mut items = self.load_for_write().await?;
        let Some(slot) = items.iter_mut().find(|item| item.id() == id) else {
            return Ok(None);
        };

        let merged = shallow_merge(slot, partial)?;
        *slot = merged.clone();
        self.save_all(&items).await?;
        Ok(Some(merged))
    }

    /// Troca o registro inteiro. `None` se o id não existe.
    pub async fn replace(&self, item: T) -> Result<Option<T>, AppError> {
        let mut items = self.load_for_write().await?;
        let Some(slot) = items.iter_mut().find(|existing| existing.id() == item.id()) else {
            return Ok(None);
        };

        *slot = item.clone();
        self.save_all(&items).await?;
        Ok(Some(item))
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.delete_where(|item| item.id() == id).await? > 0)
    }

    /// Remove tudo que casar com o predicado; devolve quantos saíram.
    pub async fn delete_where<F>(&self, predicate: F) -> Result<usize, AppError>
    where
        F: Fn(&T) -> bool,
    {
        let mut items = self.load_for_write().await?;
        let before = items.len();
        items.retain(|item| !predicate(item));
        let removed = before - items.len();

        if removed > 0 {
            self.save_all(&items).await?;
        }
        Ok(removed)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Option<T> {
        self.get_all().await.into_iter().find(|item| item.id() == id)
    }

    pub async fn find_by<F>(&self, predicate: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        self.get_all()
            .await
            .into_iter()
            .filter(|item| predicate(item))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use serde::Deserialize;
    use serde_json::json;

    use crate::db::store::MemoryCollectionStore;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Note {
        id: Uuid,
        title: String,
        meta: Meta,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Meta {
        #[serde(default)]
        color: String,
        #[serde(default)]
        pinned: bool,
    }

    impl Record for Note {
        fn id(&self) -> Uuid {
            self.id
        }
    }

    fn note(title: &str) -> Note {
        Note {
            id: Uuid::new_v4(),
            title: title.into(),
            meta: Meta {
                color: "red".into(),
                pinned: true,
            },
        }
    }

    fn collection(store: Arc<dyn CollectionStore>) -> Collection<Note> {
        Collection::new(store, StorageKey::Orders)
    }

    #[tokio::test]
    async fn add_update_delete_cycle() {
        let notes = collection(Arc::new(MemoryCollectionStore::new()));
        let a = notes.add(note("a")).await.unwrap();
        let b = notes.add(note("b")).await.unwrap();

        let updated = notes.update(a.id, json!({ "title": "a2" })).await.unwrap().unwrap();
        assert_eq!(updated.title, "a2");
        assert_eq!(updated.meta, a.meta);

        assert!(notes.delete(b.id).await.unwrap());
        assert!(!notes.delete(b.id).await.unwrap());
        assert_eq!(notes.get_all().await, vec![updated]);
        assert!(notes.update(b.id, json!({ "title": "x" })).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_is_shallow_for_nested_objects() {
        let notes = collection(Arc::new(MemoryCollectionStore::new()));
        let a = notes.add(note("a")).await.unwrap();

        // Só "color" enviado: "pinned" volta ao default, não ao valor antigo.
        let updated = notes
            .update(a.id, json!({ "meta": { "color": "blue" } }))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.meta, Meta {
            color: "blue".into(),
            pinned: false,
        });
    }

    #[tokio::test]
    async fn update_never_changes_id() {
        let notes = collection(Arc::new(MemoryCollectionStore::new()));
        let a = notes.add(note("a")).await.unwrap();
        let updated = notes
            .update(a.id, json!({ "id": Uuid::new_v4(), "title": "z" }))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, a.id);
    }

    #[tokio::test]
    async fn unreadable_collection_falls_back_to_empty() {
        let store: Arc<dyn CollectionStore> = Arc::new(MemoryCollectionStore::new());
        store.store(StorageKey::Orders, json!({ "not": "an array" })).await.unwrap();
        assert!(collection(store).get_all().await.is_empty());
    }

    /// Store em memória cuja próxima leitura falha uma vez.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryCollectionStore,
        fail_next_load: AtomicBool,
    }

    #[async_trait]
    impl CollectionStore for FlakyStore {
        async fn load(&self, key: StorageKey) -> Result<Option<Value>, AppError> {
            if self.fail_next_load.swap(false, Ordering::SeqCst) {
                return Err(AppError::InternalServerError(anyhow::anyhow!("pool timed out")));
            }
            self.inner.load(key).await
        }

        async fn store(&self, key: StorageKey, data: Value) -> Result<(), AppError> {
            self.inner.store(key, data).await
        }
    }

    #[tokio::test]
    async fn failed_load_aborts_writes_instead_of_wiping() {
        let store = Arc::new(FlakyStore::default());
        let notes = collection(store.clone());
        let a = notes.add(note("a")).await.unwrap();
        let b = notes.add(note("b")).await.unwrap();
        notes.add(note("c")).await.unwrap();

        store.fail_next_load.store(true, Ordering::SeqCst);
        assert!(notes.add(note("d")).await.is_err());
        store.fail_next_load.store(true, Ordering::SeqCst);
        assert!(notes.update(a.id, json!({ "title": "x" })).await.is_err());
        store.fail_next_load.store(true, Ordering::SeqCst);
        assert!(notes.delete(b.id).await.is_err());

        assert_eq!(notes.get_all().await.len(), 3);
    }

    #[tokio::test]
    async fn failed_load_reads_as_empty() {
        let store = Arc::new(FlakyStore::default());
        let notes = collection(store.clone());
        notes.add(note("a")).await.unwrap();

        store.fail_next_load.store(true, Ordering::SeqCst);
        assert!(notes.get_all().await.is_empty());
        assert_eq!(notes.get_all().await.len(), 1);
    }

    #[tokio::test]
    async fn unreadable_collection_rejects_writes() {
        let store: Arc<dyn CollectionStore> = Arc::new(MemoryCollectionStore::new());
        store.store(StorageKey::Orders, json!({ "not": "an array" })).await.unwrap();
        let notes = collection(store.clone());

        assert!(notes.add(note("a")).await.is_err());
        assert_eq!(
            store.load(StorageKey::Orders).await.unwrap(),
            Some(json!({ "not": "an array" }))
        );
    }

    #[test]
    fn non_object_patch_is_rejected() {
        let err = shallow_merge(&note("a"), json!(["x"])).unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
