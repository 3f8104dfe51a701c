// src/models/auth.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Contractor,
}

// Dados para login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "ユーザー名を入力してください"))]
    pub username: String,
    #[validate(length(min = 1, message = "パスワードを入力してください"))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub role: Role,
    pub name: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: Uuid, // ID do admin ou da contratada
    pub role: Role,
    pub name: String,
    pub exp: usize,
    pub iat: usize,
}

/// Quem está logado. Para contratadas, `sub` é o próprio id da contratada.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub account_id: Uuid,
    pub role: Role,
    pub name: String,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Contratada logada; `None` para admins (que veem tudo).
    pub fn contractor_scope(&self) -> Option<Uuid> {
        match self.role {
            Role::Admin => None,
            Role::Contractor => Some(self.account_id),
        }
    }

    pub fn can_access_contractor(&self, contractor_id: Option<Uuid>) -> bool {
        match self.contractor_scope() {
            None => true,
            Some(own) => contractor_id == Some(own),
        }
    }
}
