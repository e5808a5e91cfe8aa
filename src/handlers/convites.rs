// src/handlers/convites.rs

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
        auth::{AuthenticatedUser, UsuarioContext},
        i18n::Locale,
        rbac::{PermEquipeRead, PermEquipeWrite, RequirePermission, RequirePlatformAdmin},
    },
    models::convite::{
        Convite, ConviteEmitido, ConviteFundador, ConviteValidado, CriarConviteFundadorPayload,
        CriarConvitePayload, ReenviarConvitePayload, TokenQuery,
    },
};

// ---
// Convites de fundador (administração da plataforma)
// ---

#[utoipa::path(
    post,
    path = "/api/convites-fundador",
    tag = "Convites",
    request_body = CriarConviteFundadorPayload,
    responses(
        (status = 201, description = "Convite emitido", body = ConviteEmitido),
        (status = 403, description = "Apenas administradores da plataforma"),
        (status = 409, description = "Já existe convite pendente para o e-mail")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_founder_invite(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePlatformAdmin,
    user: AuthenticatedUser,
    Json(payload): Json<CriarConviteFundadorPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let emitido = app_state
        .convite_service
        .emitir_convite_fundador(&payload.email, Some(user.0.id))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(emitido)))
}

#[utoipa::path(
    get,
    path = "/api/convites-fundador",
    tag = "Convites",
    responses(
        (status = 200, description = "Convites com status efetivo", body = Vec<ConviteFundador>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_founder_invites(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePlatformAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let convites = app_state
        .convite_service
        .listar_convites_fundador()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(convites)))
}

#[utoipa::path(
    get,
    path = "/api/convites-fundador/validar",
    tag = "Convites",
    params(("token" = Uuid, Query, description = "Token do convite")),
    responses(
        (status = 200, description = "Situação do convite", body = ConviteValidado),
        (status = 404, description = "Convite não encontrado")
    )
)]
pub async fn validate_founder_invite(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<TokenQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let validado = app_state
        .convite_service
        .validar_convite_fundador(query.token)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(validado)))
}

// ---
// Convites de equipe (admin da clínica)
// ---

#[utoipa::path(
    post,
    path = "/api/convites",
    tag = "Convites",
    request_body = CriarConvitePayload,
    responses(
        (status = 201, description = "Convite emitido", body = ConviteEmitido),
        (status = 409, description = "Já existe convite pendente para o e-mail")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_invite(
    State(app_state): State<AppState>,
    locale: Locale,
    usuario: UsuarioContext,
    _guard: RequirePermission<PermEquipeWrite>,
    Json(payload): Json<CriarConvitePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let emitido = app_state
        .convite_service
        .emitir_convite(usuario.0.clinica_id, &payload.email, payload.papel, usuario.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(emitido)))
}

#[utoipa::path(
    get,
    path = "/api/convites",
    tag = "Convites",
    responses(
        (status = 200, description = "Convites da clínica com status efetivo", body = Vec<Convite>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_invites(
    State(app_state): State<AppState>,
    locale: Locale,
    usuario: UsuarioContext,
    _guard: RequirePermission<PermEquipeRead>,
) -> Result<impl IntoResponse, ApiError> {
    let convites = app_state
        .convite_service
        .listar_convites(usuario.0.clinica_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(convites)))
}

#[utoipa::path(
    put,
    path = "/api/convites",
    tag = "Convites",
    request_body = ReenviarConvitePayload,
    responses(
        (status = 200, description = "Convite renovado e reenviado", body = ConviteEmitido),
        (status = 400, description = "Convite já utilizado ou revogado"),
        (status = 404, description = "Convite não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn resend_invite(
    State(app_state): State<AppState>,
    locale: Locale,
    usuario: UsuarioContext,
    _guard: RequirePermission<PermEquipeWrite>,
    Json(payload): Json<ReenviarConvitePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let emitido = app_state
        .convite_service
        .reenviar_convite(usuario.0.clinica_id, payload.convite_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(emitido)))
}

#[utoipa::path(
    delete,
    path = "/api/convites/{id}",
    tag = "Convites",
    params(("id" = Uuid, Path, description = "ID do convite")),
    responses(
        (status = 200, description = "Convite revogado", body = Convite),
        (status = 400, description = "Convite já utilizado ou revogado"),
        (status = 404, description = "Convite não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn revoke_invite(
    State(app_state): State<AppState>,
    locale: Locale,
    usuario: UsuarioContext,
    _guard: RequirePermission<PermEquipeWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let convite = app_state
        .convite_service
        .revogar_convite(usuario.0.clinica_id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(convite)))
}

#[utoipa::path(
    get,
    path = "/api/convites/validar",
    tag = "Convites",
    params(("token" = Uuid, Query, description = "Token do convite")),
    responses(
        (status = 200, description = "Situação do convite", body = ConviteValidado),
        (status = 404, description = "Convite não encontrado")
    )
)]
pub async fn validate_invite(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<TokenQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let validado = app_state
        .convite_service
        .validar_convite(query.token)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(validado)))
}
