// src/services/order_service.rs

use base64::{engine::general_purpose::STANDARD as B64, Engine};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::OrderRepository,
    models::order::{FileUploadPayload, ImportOrderPayload, OrderData, OrderFile},
};

#[derive(Clone)]
pub struct OrderService {
    repo: OrderRepository,
}

impl OrderService {
    pub fn new(repo: OrderRepository) -> Self {
        Self { repo }
    }

    pub async fn search(&self, query: &str) -> Vec<OrderData> {
        self.repo.search(query).await
    }

    pub async fn get(&self, order_number: &str) -> Result<OrderData, AppError> {
        self.repo
            .get_by_order_number(order_number)
            .await
            .ok_or_else(|| AppError::ResourceNotFound(format!("order {order_number}")))
    }

    /// Lote vindo do sistema de vendas. Tudo ou nada: um número inválido rejeita o lote.
    pub async fn import(&self, payloads: Vec<ImportOrderPayload>) -> Result<usize, AppError> {
        for payload in &payloads {
            payload.validate()?;
        }

        let orders = payloads
            .into_iter()
            .map(|p| OrderData {
                id: Uuid::new_v4(),
                order_number: p.order_number,
                customer_code: p.customer_code,
                customer_name: p.customer_name,
                collective_code: p.collective_code,
                collective_housing_name: p.collective_housing_name,
                address: p.address,
                phone_number: p.phone_number,
                work_type: p.work_type,
                ordered_at: p.ordered_at,
            })
            .collect();

        let count = self.repo.upsert_many(orders).await?;
        tracing::info!("📦 {} pedido(s) importado(s).", count);
        Ok(count)
    }

    pub async fn list_files(&self, order_number: &str) -> Result<Vec<OrderFile>, AppError> {
        self.get(order_number).await?;
        Ok(self.repo.get_files(order_number).await)
    }

    pub async fn add_file(
        &self,
        order_number: &str,
        upload: FileUploadPayload,
    ) -> Result<OrderFile, AppError> {
        upload.validate()?;
        B64.decode(upload.data.as_bytes())
            .map_err(|_| AppError::InvalidInput("file data is not valid base64".into()))?;
        self.get(order_number).await?;

        self.repo
            .add_file(OrderFile {
                id: Uuid::new_v4(),
                order_number: order_number.to_string(),
                file_name: upload.file_name,
                content_type: upload.content_type,
                data: upload.data,
                uploaded_at: Utc::now(),
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::db::MemoryCollectionStore;

    fn order(number: &str, name: &str) -> ImportOrderPayload {
        ImportOrderPayload {
            order_number: number.into(),
            customer_code: "C001".into(),
            customer_name: name.into(),
            collective_code: String::new(),
            collective_housing_name: String::new(),
            address: "東京都千代田区".into(),
            phone_number: "03-1234-5678".into(),
            work_type: "引込".into(),
            ordered_at: None,
        }
    }

    fn service() -> OrderService {
        OrderService::new(OrderRepository::new(Arc::new(MemoryCollectionStore::default())))
    }

    #[tokio::test]
    async fn import_upserts_by_order_number() {
        let service = service();
        service.import(vec![order("2024031500001", "ヤマダ")]).await.unwrap();
        let first = service.get("2024031500001").await.unwrap();

        service
            .import(vec![order("2024031500001", "ヤマダ タロウ"), order("2024031500002", "スズキ")])
            .await
            .unwrap();
        let updated = service.get("2024031500001").await.unwrap();
        assert_eq!(updated.id, first.id);
        assert_eq!(updated.customer_name, "ヤマダ タロウ");

        // ひらがなでもカタカナの名前に当たる
        assert_eq!(service.search("すずき").await.len(), 1);
    }

    #[tokio::test]
    async fn rejects_invalid_batch_and_bad_files() {
        let service = service();
        assert!(service.import(vec![order("123", "ヤマダ")]).await.is_err());
        assert!(service.search("").await.is_empty());

        service.import(vec![order("2024031500001", "ヤマダ")]).await.unwrap();
        let bad = FileUploadPayload {
            file_name: "図面.pdf".into(),
            content_type: "application/pdf".into(),
            data: "***".into(),
        };
        assert!(matches!(
            service.add_file("2024031500001", bad).await,
            Err(AppError::InvalidInput(_))
        ));

        let good = FileUploadPayload {
            file_name: "図面.pdf".into(),
            content_type: "application/pdf".into(),
            data: B64.encode(b"%PDF"),
        };
        service.add_file("2024031500001", good).await.unwrap();
        assert_eq!(service.list_files("2024031500001").await.unwrap().len(), 1);
        assert!(service.list_files("2024031599999").await.is_err());
    }
}
