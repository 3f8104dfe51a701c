// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Equivalente ao alert() que lista os campos obrigatórios vazios
    #[error("Campos obrigatórios ausentes: {0:?}")]
    MissingFields(Vec<String>),

    #[error("Entrada inválida: {0}")]
    InvalidInput(String),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado")]
    Forbidden,

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de serialização: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

/// Resposta de erro já traduzida para o idioma do cliente.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<Value>,
}

impl AppError {
    fn status_and_key(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "validation"),
            AppError::MissingFields(_) => (StatusCode::BAD_REQUEST, "missing_fields"),
            AppError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
            // Patch com tipo errado para o campo também é culpa do cliente
            AppError::SerializationError(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
            AppError::InvalidToken | AppError::JwtError(_) => {
                (StatusCode::UNAUTHORIZED, "invalid_token")
            }
            AppError::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
            AppError::ResourceNotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::UniqueConstraintViolation(_) => (StatusCode::CONFLICT, "conflict"),
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                Some(json!(details))
            }
            AppError::MissingFields(fields) => Some(json!(fields)),
            AppError::InvalidInput(reason) => Some(json!(reason)),
            AppError::SerializationError(e) => Some(json!(e.to_string())),
            AppError::ResourceNotFound(what) => Some(json!(what)),
            AppError::UniqueConstraintViolation(what) => Some(json!(what)),
            _ => None,
        }
    }

    pub fn to_api_error(&self, locale: &Locale, i18n_store: &I18nStore) -> ApiError {
        let (status, key) = self.status_and_key();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Erro Interno do Servidor: {}", self);
        }
        ApiError {
            status,
            message: i18n_store.translate(&locale.0, key),
            details: self.details(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.message, "details": details }),
            None => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

// Usado pelos extratores, que não têm acesso ao Locale da requisição.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let locale = Locale::default();
        self.to_api_error(&locale, &I18nStore::new()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_are_reported_as_bad_request_with_details() {
        let err = AppError::MissingFields(vec!["受注番号".into(), "住所".into()]);
        let api = err.to_api_error(&Locale("ja".into()), &I18nStore::new());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.details, Some(json!(["受注番号", "住所"])));
    }

    #[test]
    fn message_follows_locale() {
        let store = I18nStore::new();
        let ja = AppError::Forbidden.to_api_error(&Locale("ja".into()), &store);
        let en = AppError::Forbidden.to_api_error(&Locale("en".into()), &store);
        assert_eq!(ja.status, StatusCode::FORBIDDEN);
        assert_ne!(ja.message, en.message);
    }
}
