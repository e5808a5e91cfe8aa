// src/handlers/pacientes.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::UsuarioContext,
        i18n::Locale,
        rbac::{PermPacientesRead, PermPacientesWrite, RequirePermission},
    },
    models::paciente::{BuscaPacientes, DadosPaciente, Paciente},
};

#[utoipa::path(
    post,
    path = "/api/pacientes",
    tag = "Pacientes",
    request_body = DadosPaciente,
    responses(
        (status = 201, description = "Paciente cadastrado", body = Paciente),
        (status = 409, description = "CPF já cadastrado na clínica")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_paciente(
    State(app_state): State<AppState>,
    locale: Locale,
    usuario: UsuarioContext,
    _guard: RequirePermission<PermPacientesWrite>,
    Json(payload): Json<DadosPaciente>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let paciente = app_state
        .paciente_service
        .criar(usuario.0.clinica_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(paciente)))
}

#[utoipa::path(
    get,
    path = "/api/pacientes",
    tag = "Pacientes",
    params(("busca" = Option<String>, Query, description = "Trecho do nome ou do CPF")),
    responses(
        (status = 200, description = "Pacientes ativos", body = Vec<Paciente>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_pacientes(
    State(app_state): State<AppState>,
    locale: Locale,
    usuario: UsuarioContext,
    _guard: RequirePermission<PermPacientesRead>,
    Query(query): Query<BuscaPacientes>,
) -> Result<impl IntoResponse, ApiError> {
    let pacientes = app_state
        .paciente_service
        .listar(usuario.0.clinica_id, query.busca.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(pacientes)))
}

#[utoipa::path(
    get,
    path = "/api/pacientes/{id}",
    tag = "Pacientes",
    params(("id" = Uuid, Path, description = "ID do paciente")),
    responses(
        (status = 200, description = "Paciente", body = Paciente),
        (status = 404, description = "Paciente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_paciente(
    State(app_state): State<AppState>,
    locale: Locale,
    usuario: UsuarioContext,
    _guard: RequirePermission<PermPacientesRead>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let paciente = app_state
        .paciente_service
        .obter(usuario.0.clinica_id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(paciente)))
}

#[utoipa::path(
    put,
    path = "/api/pacientes/{id}",
    tag = "Pacientes",
    request_body = DadosPaciente,
    params(("id" = Uuid, Path, description = "ID do paciente")),
    responses(
        (status = 200, description = "Paciente atualizado", body = Paciente),
        (status = 404, description = "Paciente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_paciente(
    State(app_state): State<AppState>,
    locale: Locale,
    usuario: UsuarioContext,
    _guard: RequirePermission<PermPacientesWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<DadosPaciente>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let paciente = app_state
        .paciente_service
        .atualizar(usuario.0.clinica_id, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(paciente)))
}

#[utoipa::path(
    delete,
    path = "/api/pacientes/{id}",
    tag = "Pacientes",
    params(("id" = Uuid, Path, description = "ID do paciente")),
    responses(
        (status = 200, description = "Paciente desativado", body = Paciente),
        (status = 404, description = "Paciente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn deactivate_paciente(
    State(app_state): State<AppState>,
    locale: Locale,
    usuario: UsuarioContext,
    _guard: RequirePermission<PermPacientesWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let paciente = app_state
        .paciente_service
        .desativar(usuario.0.clinica_id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(paciente)))
}
