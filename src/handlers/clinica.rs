// src/handlers/clinica.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        auth::UsuarioContext,
        i18n::Locale,
        rbac::{PermClinicaWrite, RequirePermission},
    },
    models::clinica::{AtualizarClinica, Clinica},
};

#[utoipa::path(
    get,
    path = "/api/clinica",
    tag = "Clínica",
    responses(
        (status = 200, description = "Perfil da clínica do usuário", body = Clinica)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_clinica(
    State(app_state): State<AppState>,
    locale: Locale,
    usuario: UsuarioContext,
) -> Result<impl IntoResponse, ApiError> {
    let clinica = app_state
        .clinica_service
        .obter(usuario.0.clinica_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(clinica)))
}

#[utoipa::path(
    put,
    path = "/api/clinica",
    tag = "Clínica",
    request_body = AtualizarClinica,
    responses(
        (status = 200, description = "Perfil atualizado", body = Clinica),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_clinica(
    State(app_state): State<AppState>,
    locale: Locale,
    usuario: UsuarioContext,
    _guard: RequirePermission<PermClinicaWrite>,
    Json(payload): Json<AtualizarClinica>,
) -> Result<impl IntoResponse, ApiError> {
    let clinica = app_state
        .clinica_service
        .atualizar(usuario.0.clinica_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(clinica)))
}
