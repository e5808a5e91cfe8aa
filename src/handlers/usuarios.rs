// src/handlers/usuarios.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        auth::UsuarioContext,
        i18n::Locale,
        rbac::{PermEquipeRead, PermEquipeWrite, RequirePermission},
    },
    models::clinica::{AlterarPapelPayload, PerfilUsuario, Usuario},
};

#[utoipa::path(
    get,
    path = "/api/usuarios/me",
    tag = "Equipe",
    responses(
        (status = 200, description = "Usuário logado e sua clínica", body = PerfilUsuario),
        (status = 403, description = "Conta sem clínica ou desativada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(
    State(app_state): State<AppState>,
    locale: Locale,
    usuario: UsuarioContext,
) -> Result<impl IntoResponse, ApiError> {
    let perfil = app_state
        .equipe_service
        .perfil(&usuario.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(perfil)))
}

#[utoipa::path(
    get,
    path = "/api/usuarios",
    tag = "Equipe",
    responses(
        (status = 200, description = "Membros da clínica", body = Vec<Usuario>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_usuarios(
    State(app_state): State<AppState>,
    locale: Locale,
    usuario: UsuarioContext,
    _guard: RequirePermission<PermEquipeRead>,
) -> Result<impl IntoResponse, ApiError> {
    let usuarios = app_state
        .equipe_service
        .listar(usuario.0.clinica_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(usuarios)))
}

#[utoipa::path(
    patch,
    path = "/api/usuarios/{id}/papel",
    tag = "Equipe",
    request_body = AlterarPapelPayload,
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Papel alterado", body = Usuario),
        (status = 400, description = "Alteração do próprio papel ou do último admin"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_papel(
    State(app_state): State<AppState>,
    locale: Locale,
    usuario: UsuarioContext,
    _guard: RequirePermission<PermEquipeWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AlterarPapelPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let alterado = app_state
        .equipe_service
        .alterar_papel(&usuario.0, id, payload.papel)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(alterado)))
}

#[utoipa::path(
    delete,
    path = "/api/usuarios/{id}",
    tag = "Equipe",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Usuário desativado", body = Usuario),
        (status = 400, description = "Desativação de si mesmo ou do último admin"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn deactivate_usuario(
    State(app_state): State<AppState>,
    locale: Locale,
    usuario: UsuarioContext,
    _guard: RequirePermission<PermEquipeWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let desativado = app_state
        .equipe_service
        .desativar(&usuario.0, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(desativado)))
}
