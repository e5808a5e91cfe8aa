// src/handlers/finance.rs

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
        rbac::{PermFinanceiroRead, PermFinanceiroWrite, RequirePermission},
    },
    models::finance::{
        ContaBancaria, CriarContaBancariaPayload, CriarTransacaoPayload, FiltroTransacoes,
        PagarParcelaPayload, ParcelaAtualizada, Transacao, TransacaoDetalhe,
    },
};

// ---
// Contas bancárias
// ---

#[utoipa::path(
    post,
    path = "/api/contas-bancarias",
    tag = "Financeiro",
    request_body = CriarContaBancariaPayload,
    responses(
        (status = 201, description = "Conta criada", body = ContaBancaria)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_conta(
    State(app_state): State<AppState>,
    locale: Locale,
    usuario: UsuarioContext,
    _guard: RequirePermission<PermFinanceiroWrite>,
    Json(payload): Json<CriarContaBancariaPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let conta = app_state
        .finance_service
        .criar_conta(usuario.0.clinica_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(conta)))
}

#[utoipa::path(
    get,
    path = "/api/contas-bancarias",
    tag = "Financeiro",
    responses(
        (status = 200, description = "Contas da clínica", body = Vec<ContaBancaria>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_contas(
    State(app_state): State<AppState>,
    locale: Locale,
    usuario: UsuarioContext,
    _guard: RequirePermission<PermFinanceiroRead>,
) -> Result<impl IntoResponse, ApiError> {
    let contas = app_state
        .finance_service
        .listar_contas(usuario.0.clinica_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(contas)))
}

// ---
// Transações
// ---

#[utoipa::path(
    post,
    path = "/api/transacoes",
    tag = "Financeiro",
    request_body = CriarTransacaoPayload,
    responses(
        (status = 201, description = "Transação criada com as parcelas", body = TransacaoDetalhe),
        (status = 400, description = "Valores inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_transacao(
    State(app_state): State<AppState>,
    locale: Locale,
    usuario: UsuarioContext,
    _guard: RequirePermission<PermFinanceiroWrite>,
    Json(payload): Json<CriarTransacaoPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let detalhe = app_state
        .finance_service
        .criar_transacao(usuario.0.clinica_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(detalhe)))
}

#[utoipa::path(
    get,
    path = "/api/transacoes",
    tag = "Financeiro",
    params(
        ("tipo" = Option<String>, Query, description = "receita | despesa"),
        ("status" = Option<String>, Query, description = "pendente | pago | cancelado | estornado")
    ),
    responses(
        (status = 200, description = "Transações da clínica", body = Vec<Transacao>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_transacoes(
    State(app_state): State<AppState>,
    locale: Locale,
    usuario: UsuarioContext,
    _guard: RequirePermission<PermFinanceiroRead>,
    Query(filtro): Query<FiltroTransacoes>,
) -> Result<impl IntoResponse, ApiError> {
    let transacoes = app_state
        .finance_service
        .listar_transacoes(usuario.0.clinica_id, &filtro)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(transacoes)))
}

#[utoipa::path(
    get,
    path = "/api/transacoes/{id}",
    tag = "Financeiro",
    params(("id" = Uuid, Path, description = "ID da transação")),
    responses(
        (status = 200, description = "Transação com parcelas", body = TransacaoDetalhe),
        (status = 404, description = "Transação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_transacao(
    State(app_state): State<AppState>,
    locale: Locale,
    usuario: UsuarioContext,
    _guard: RequirePermission<PermFinanceiroRead>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detalhe = app_state
        .finance_service
        .detalhar_transacao(usuario.0.clinica_id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detalhe)))
}

#[utoipa::path(
    post,
    path = "/api/transacoes/{id}/reconciliar",
    tag = "Financeiro",
    params(("id" = Uuid, Path, description = "ID da transação")),
    responses(
        (status = 200, description = "Status recalculado a partir das parcelas", body = Transacao),
        (status = 404, description = "Transação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn reconcile_transacao(
    State(app_state): State<AppState>,
    locale: Locale,
    usuario: UsuarioContext,
    _guard: RequirePermission<PermFinanceiroWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let transacao = app_state
        .finance_service
        .reconciliar(usuario.0.clinica_id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(transacao)))
}

#[utoipa::path(
    post,
    path = "/api/transacoes/{id}/estornar",
    tag = "Financeiro",
    params(("id" = Uuid, Path, description = "ID da transação")),
    responses(
        (status = 200, description = "Transação estornada", body = TransacaoDetalhe),
        (status = 400, description = "Apenas transações pagas podem ser estornadas"),
        (status = 404, description = "Transação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn refund_transacao(
    State(app_state): State<AppState>,
    locale: Locale,
    usuario: UsuarioContext,
    _guard: RequirePermission<PermFinanceiroWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detalhe = app_state
        .finance_service
        .estornar(usuario.0.clinica_id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detalhe)))
}

// ---
// Parcelas
// ---

#[utoipa::path(
    post,
    path = "/api/parcelas/{id}/pagar",
    tag = "Financeiro",
    params(("id" = Uuid, Path, description = "ID da parcela")),
    request_body(content = PagarParcelaPayload, description = "Corpo opcional"),
    responses(
        (status = 200, description = "Parcela paga e transação reconciliada", body = ParcelaAtualizada),
        (status = 400, description = "Parcela não está pendente"),
        (status = 404, description = "Parcela não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn pay_parcela(
    State(app_state): State<AppState>,
    locale: Locale,
    usuario: UsuarioContext,
    _guard: RequirePermission<PermFinanceiroWrite>,
    Path(id): Path<Uuid>,
    payload: Option<Json<PagarParcelaPayload>>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    let atualizada = app_state
        .finance_service
        .pagar_parcela(usuario.0.clinica_id, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(atualizada)))
}

#[utoipa::path(
    post,
    path = "/api/parcelas/{id}/cancelar",
    tag = "Financeiro",
    params(("id" = Uuid, Path, description = "ID da parcela")),
    responses(
        (status = 200, description = "Parcela cancelada e transação reconciliada", body = ParcelaAtualizada),
        (status = 400, description = "Parcela não está pendente"),
        (status = 404, description = "Parcela não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_parcela(
    State(app_state): State<AppState>,
    locale: Locale,
    usuario: UsuarioContext,
    _guard: RequirePermission<PermFinanceiroWrite>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let atualizada = app_state
        .finance_service
        .cancelar_parcela(usuario.0.clinica_id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(atualizada)))
}
