// src/common/validators.rs

use axum::http::HeaderValue;
use chrono::NaiveTime;
use validator::ValidationError;

use crate::common::{error::AppError, formatters::digits_only};

pub fn is_valid_phone(value: &str) -> bool {
    let stripped: String = value.chars().filter(|c| *c != '-').collect();
    let digits = digits_only(&stripped);
    digits.len() == stripped.len()
        && (10..=11).contains(&digits.len())
        && digits.starts_with('0')
}

/// Número de pedido: 13 dígitos (ex: 2024031500001)
pub fn is_valid_order_number(value: &str) -> bool {
    value.len() == 13 && value.chars().all(|c| c.is_ascii_digit())
}

pub fn is_valid_username(value: &str) -> bool {
    (3..=32).contains(&value.len())
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// `tipo/subtipo[; parâmetros]` que cabe num header `Content-Type`.
pub fn is_valid_content_type(value: &str) -> bool {
    let essence = value.split(';').next().unwrap_or_default().trim();
    let shaped = matches!(
        essence.split_once('/'),
        Some((kind, subtype)) if !kind.is_empty() && !subtype.is_empty()
    );
    shaped && HeaderValue::from_str(value).is_ok()
}

pub fn parse_time(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

/// Lista os rótulos dos campos vazios, na ordem recebida.
pub fn require_fields(fields: &[(&str, &str)]) -> Result<(), AppError> {
    let missing: Vec<String> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(label, _)| label.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::MissingFields(missing))
    }
}

// --- Adaptadores para #[validate(custom(...))] ---

// Telefone é opcional nos formulários: vazio passa.
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || is_valid_phone(value) {
        Ok(())
    } else {
        Err(ValidationError::new("phone").with_message("電話番号の形式が正しくありません".into()))
    }
}

pub fn validate_order_number(value: &str) -> Result<(), ValidationError> {
    if is_valid_order_number(value) {
        Ok(())
    } else {
        Err(ValidationError::new("order_number")
            .with_message("受注番号は13桁の数字で入力してください".into()))
    }
}

pub fn validate_username(value: &str) -> Result<(), ValidationError> {
    if is_valid_username(value) {
        Ok(())
    } else {
        Err(ValidationError::new("username")
            .with_message("ユーザー名の形式が正しくありません".into()))
    }
}

pub fn validate_content_type(value: &str) -> Result<(), ValidationError> {
    if is_valid_content_type(value) {
        Ok(())
    } else {
        Err(ValidationError::new("content_type").with_message("ファイル形式が不正です".into()))
    }
}
