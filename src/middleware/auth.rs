// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{common::error::AppError, config::AppState, models::auth::Session};

// O middleware em si: valida o Bearer e pendura a Session nos extensions
pub async fn auth_guard(
    State(app_state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AppError::InvalidToken)?;

    let session = app_state.auth_service.validate_token(bearer.token()).await?;
    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}

// Extrator para obter a sessão autenticada diretamente nos handlers
pub struct AuthenticatedUser(pub Session);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AppError::InvalidToken)
    }
}

// Rotas só de admin (contas, edição de solicitações, importação de pedidos)
pub struct AdminUser(pub Session);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(session) = AuthenticatedUser::from_request_parts(parts, state).await?;
        if !session.is_admin() {
            return Err(AppError::Forbidden);
        }
        Ok(AdminUser(session))
    }
}
