// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::{
    common::error::AppError,
    config::AppState,
    models::{auth::Identidade, clinica::Usuario},
};

// Identidade dona do JWT
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identidade);

// Usuário ativo da clínica (só existe nas rotas com tenant_guard)
#[derive(Debug, Clone)]
pub struct UsuarioContext(pub Usuario);

async fn identidade_do_token(app_state: &AppState, headers: &HeaderMap) -> Result<Identidade, AppError> {
    let bearer = headers
        .typed_get::<Authorization<Bearer>>()
        .ok_or(AppError::InvalidToken)?;
    app_state.auth_service.validate_token(bearer.token()).await
}

// ---
// Middleware: exige um JWT válido
// ---
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identidade = identidade_do_token(&app_state, request.headers()).await?;
    request.extensions_mut().insert(AuthenticatedUser(identidade));
    Ok(next.run(request).await)
}

// ---
// Middleware: JWT válido + usuário ativo numa clínica
// ---
pub async fn tenant_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identidade = identidade_do_token(&app_state, request.headers()).await?;
    let usuario = app_state.equipe_service.usuario_ativo(identidade.id).await?;

    request.extensions_mut().insert(AuthenticatedUser(identidade));
    request.extensions_mut().insert(UsuarioContext(usuario));
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::InvalidToken)
    }
}

impl<S> FromRequestParts<S> for UsuarioContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<UsuarioContext>()
            .cloned()
            .ok_or_else(|| AppError::Forbidden("Contexto da clínica não encontrado.".into()))
    }
}
