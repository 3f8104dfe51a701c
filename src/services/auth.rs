// src/services/auth.rs

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::AccountRepository,
    models::auth::{AuthResponse, Claims, Role, Session},
};

#[derive(Clone)]
pub struct AuthService {
    accounts: AccountRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(accounts: AccountRepository, jwt_secret: String) -> Self {
        Self {
            accounts,
            jwt_secret,
        }
    }

    /// Admins primeiro, depois contratadas. Senha comparada em texto puro, como está gravada.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, AppError> {
        if let Some(admin) = self.accounts.get_admin_by_username(username).await {
            if admin.is_active && admin.password == password {
                tracing::info!("🔑 Login de admin: {}", admin.username);
                return self.respond(admin.id, Role::Admin, admin.name);
            }
        }

        if let Some(contractor) = self.accounts.get_contractor_by_username(username).await {
            if contractor.is_active && contractor.password == password {
                tracing::info!("🔑 Login de contratada: {}", contractor.username);
                return self.respond(contractor.id, Role::Contractor, contractor.name);
            }
        }

        tracing::warn!("Tentativa de login inválida para '{}'", username);
        Err(AppError::InvalidCredentials)
    }

    /// Token válido E conta ainda ativa.
    pub async fn validate_token(&self, token: &str) -> Result<Session, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;
        let claims = token_data.claims;

        let active = match claims.role {
            Role::Admin => self.accounts.get_admin(claims.sub).await.map(|a| a.is_active),
            Role::Contractor => self.accounts.get_contractor(claims.sub).await.map(|c| c.is_active),
        };
        if active != Some(true) {
            return Err(AppError::InvalidToken);
        }

        Ok(Session {
            account_id: claims.sub,
            role: claims.role,
            name: claims.name,
        })
    }

    fn respond(
        &self,
        account_id: Uuid,
        role: Role,
        name: String,
    ) -> Result<AuthResponse, AppError> {
        let token = self.create_token(account_id, role, &name)?;
        Ok(AuthResponse { token, role, name })
    }

    fn create_token(&self, account_id: Uuid, role: Role, name: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: account_id,
            role,
            name: name.to_string(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
