// src/db/order_repo.rs

use std::sync::Arc;

use crate::{
    common::{error::AppError, filter_utils::matches_text},
    db::{
        collection::Collection,
        store::{CollectionStore, StorageKey},
    },
    models::order::{OrderData, OrderFile},
};

const SEARCH_LIMIT: usize = 50;

#[derive(Clone)]
pub struct OrderRepository {
    orders: Collection<OrderData>,
    files: Collection<OrderFile>,
}

impl OrderRepository {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self {
            orders: Collection::new(store.clone(), StorageKey::Orders),
            files: Collection::new(store, StorageKey::OrderFiles),
        }
    }

    pub async fn get_by_order_number(&self, order_number: &str) -> Option<OrderData> {
        self.orders
            .find_by(|o| o.order_number == order_number)
            .await
            .into_iter()
            .next()
    }

    /// Busca do modal de seleção: número do pedido, códigos ou nomes (kana-insensível).
    pub async fn search(&self, query: &str) -> Vec<OrderData> {
        let query = query.trim();
        let mut found = if query.is_empty() {
            self.orders.get_all().await
        } else {
            self.orders
                .find_by(|o| {
                    o.order_number.contains(query)
                        || matches_text(&o.customer_code, query)
                        || matches_text(&o.customer_name, query)
                        || matches_text(&o.collective_code, query)
                        || matches_text(&o.collective_housing_name, query)
                })
                .await
        };
        found.truncate(SEARCH_LIMIT);
        found
    }

    /// Insere ou substitui pelo número do pedido.
    pub async fn upsert_many(&self, incoming: Vec<OrderData>) -> Result<usize, AppError> {
        let mut orders = self.orders.load_for_write().await?;
        let count = incoming.len();
        for order in incoming {
            match orders.iter_mut().find(|o| o.order_number == order.order_number) {
                Some(existing) => {
                    *existing = OrderData {
                        id: existing.id,
                        ..order
                    };
                }
                None => orders.push(order),
            }
        }
        self.orders.save_all(&orders).await?;
        Ok(count)
    }

    pub async fn get_files(&self, order_number: &str) -> Vec<OrderFile> {
        self.files.find_by(|f| f.order_number == order_number).await
    }

    pub async fn add_file(&self, file: OrderFile) -> Result<OrderFile, AppError> {
        self.files.add(file).await
    }
}
