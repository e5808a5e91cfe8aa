// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::{
        auth::{
            AuthResponse, LoginPayload, RegisterPayload, RegisterResponse, SignupPayload,
            SignupResponse,
        },
        convite::{AceitarConviteFundadorPayload, AceitarConvitePayload, ConviteAceito},
    },
};

// ---
// Handler: register (auto-cadastro da clínica)
// ---
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterPayload,
    responses(
        (status = 201, description = "Clínica e administrador criados", body = RegisterResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "E-mail já cadastrado")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let resposta = app_state
        .auth_service
        .register(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(resposta)))
}

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = "Auth",
    request_body = SignupPayload,
    responses(
        (status = 201, description = "Identidade criada", body = SignupResponse),
        (status = 409, description = "E-mail já cadastrado")
    )
)]
pub async fn signup(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<SignupPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let resposta = app_state
        .auth_service
        .signup(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(resposta)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Login bem-sucedido", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let resposta = app_state
        .auth_service
        .login(&payload.email, &payload.password)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(resposta)))
}

// ---
// Handler: accept_founder_invite (onboarding da clínica)
// ---
#[utoipa::path(
    post,
    path = "/api/auth/accept-founder-invite",
    tag = "Auth",
    request_body = AceitarConviteFundadorPayload,
    responses(
        (status = 200, description = "Clínica criada e convite consumido", body = ConviteAceito),
        (status = 400, description = "Convite já utilizado"),
        (status = 403, description = "userId diferente do usuário autenticado"),
        (status = 404, description = "Convite ou identidade não encontrados"),
        (status = 409, description = "Identidade já vinculada a uma clínica"),
        (status = 410, description = "Convite expirado")
    ),
    security(("api_jwt" = []))
)]
pub async fn accept_founder_invite(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<AceitarConviteFundadorPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let aceito = app_state
        .convite_service
        .aceitar_convite_fundador(user.0.id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(aceito)))
}

#[utoipa::path(
    post,
    path = "/api/auth/accept-invite",
    tag = "Auth",
    request_body = AceitarConvitePayload,
    responses(
        (status = 200, description = "Usuário adicionado à clínica", body = ConviteAceito),
        (status = 400, description = "Convite já utilizado"),
        (status = 404, description = "Convite não encontrado"),
        (status = 409, description = "Identidade já vinculada a uma clínica"),
        (status = 410, description = "Convite expirado")
    ),
    security(("api_jwt" = []))
)]
pub async fn accept_invite(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<AceitarConvitePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let aceito = app_state
        .convite_service
        .aceitar_convite(user.0.id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(aceito)))
}
