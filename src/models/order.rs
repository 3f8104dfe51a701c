// src/models/order.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::db::collection::Record;

/// Pedido vindo do sistema de vendas; serve para preencher o modal de nova solicitação.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderData {
    pub id: Uuid,
    pub order_number: String,
    #[serde(default)]
    pub customer_code: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub collective_code: String,
    #[serde(default)]
    pub collective_housing_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub work_type: String,
    pub ordered_at: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFile {
    pub id: Uuid,
    pub order_number: String,
    pub file_name: String,
    pub content_type: String,
    pub data: String,
    pub uploaded_at: DateTime<Utc>,
}

impl Record for OrderData {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for OrderFile {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Importação: mesmo formato do pedido, sem id.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ImportOrderPayload {
    #[validate(custom(function = "crate::common::validators::validate_order_number"))]
    pub order_number: String,
    #[serde(default)]
    pub customer_code: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub collective_code: String,
    #[serde(default)]
    pub collective_housing_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub work_type: String,
    pub ordered_at: Option<NaiveDate>,
}

/// Upload de arquivo (anexo de solicitação ou arquivo de pedido).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FileUploadPayload {
    #[validate(length(min = 1, max = 255, message = "ファイル名が不正です"))]
    pub file_name: String,
    #[serde(default = "default_content_type")]
    #[validate(custom(function = "crate::common::validators::validate_content_type"))]
    pub content_type: String,
    #[validate(length(min = 1, message = "ファイルが空です"))]
    pub data: String,
}

fn default_content_type() -> String {
    "application/octet-stream".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderSearchQuery {
    pub q: String,
}
