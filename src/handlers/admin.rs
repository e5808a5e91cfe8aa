// src/handlers/admin.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{i18n::Locale, rbac::RequirePlatformAdmin},
    models::auth::Identidade,
};

// Contas cadastradas no provedor de identidades
#[utoipa::path(
    get,
    path = "/api/admin/identidades",
    tag = "Plataforma",
    responses(
        (status = 200, description = "Identidades cadastradas", body = Vec<Identidade>),
        (status = 403, description = "Apenas administradores da plataforma")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_identidades(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePlatformAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let identidades = app_state
        .identity
        .listar_identidades()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(identidades)))
}
