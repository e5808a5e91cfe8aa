// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::{AuthenticatedUser, UsuarioContext},
        i18n::Locale,
    },
    models::clinica::Papel,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permissao {
    PacientesLer,
    PacientesEscrever,
    FinanceiroLer,
    FinanceiroEscrever,
    EquipeLer,
    EquipeGerenciar,
    ClinicaGerenciar,
}

impl Permissao {
    pub fn slug(&self) -> &'static str {
        match self {
            Permissao::PacientesLer => "pacientes:read",
            Permissao::PacientesEscrever => "pacientes:write",
            Permissao::FinanceiroLer => "financeiro:read",
            Permissao::FinanceiroEscrever => "financeiro:write",
            Permissao::EquipeLer => "equipe:read",
            Permissao::EquipeGerenciar => "equipe:write",
            Permissao::ClinicaGerenciar => "clinica:write",
        }
    }
}

/// Matriz papel x permissão.
pub fn papel_permite(papel: Papel, permissao: Permissao) -> bool {
    use Permissao::*;
    match papel {
        Papel::Admin => true,
        Papel::Recepcionista => matches!(
            permissao,
            PacientesLer | PacientesEscrever | FinanceiroLer | FinanceiroEscrever | EquipeLer
        ),
        Papel::Dentista => matches!(
            permissao,
            PacientesLer | PacientesEscrever | FinanceiroLer | EquipeLer
        ),
        Papel::Assistente => matches!(permissao, PacientesLer | EquipeLer),
    }
}

/// O Trait que define o que é uma Permissão
pub trait PermissionDef: Send + Sync + 'static {
    fn permissao() -> Permissao;
}

/// O Extractor (Guardião). Roda antes do corpo do handler.
pub struct RequirePermission<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let Ok(locale) = Locale::from_request_parts(parts, state).await;

        let usuario = UsuarioContext::from_request_parts(parts, state)
            .await
            .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

        let permissao = T::permissao();
        if !papel_permite(usuario.0.papel, permissao) {
            return Err(AppError::Forbidden(format!(
                "O papel '{}' não tem a permissão '{}'.",
                usuario.0.papel.as_str(),
                permissao.slug()
            ))
            .to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequirePermission(PhantomData))
    }
}

/// Administração da plataforma (identidade listada em PLATFORM_ADMIN_IDS).
pub struct RequirePlatformAdmin;

impl<S> FromRequestParts<S> for RequirePlatformAdmin
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let Ok(locale) = Locale::from_request_parts(parts, state).await;

        let user = AuthenticatedUser::from_request_parts(parts, state)
            .await
            .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

        if !app_state.settings.is_platform_admin(user.0.id) {
            return Err(AppError::Forbidden(
                "Apenas administradores da plataforma podem realizar esta ação.".into(),
            )
            .to_api_error(&locale, &app_state.i18n_store));
        }
        Ok(RequirePlatformAdmin)
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

pub struct PermPacientesRead;
impl PermissionDef for PermPacientesRead {
    fn permissao() -> Permissao { Permissao::PacientesLer }
}

pub struct PermPacientesWrite;
impl PermissionDef for PermPacientesWrite {
    fn permissao() -> Permissao { Permissao::PacientesEscrever }
}

pub struct PermFinanceiroRead;
impl PermissionDef for PermFinanceiroRead {
    fn permissao() -> Permissao { Permissao::FinanceiroLer }
}

pub struct PermFinanceiroWrite;
impl PermissionDef for PermFinanceiroWrite {
    fn permissao() -> Permissao { Permissao::FinanceiroEscrever }
}

pub struct PermEquipeRead;
impl PermissionDef for PermEquipeRead {
    fn permissao() -> Permissao { Permissao::EquipeLer }
}

pub struct PermEquipeWrite;
impl PermissionDef for PermEquipeWrite {
    fn permissao() -> Permissao { Permissao::EquipeGerenciar }
}

pub struct PermClinicaWrite;
impl PermissionDef for PermClinicaWrite {
    fn permissao() -> Permissao { Permissao::ClinicaGerenciar }
}
