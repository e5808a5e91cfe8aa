// src/models/convite.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        texto::{validar_nome_clinica, validar_nome_pessoa},
    },
    models::clinica::Papel,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "status_convite", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StatusConvite {
    Pendente,
    Aceito,
    Expirado,
}

/// Regra de resgate comum aos dois tipos de convite: o token só vale uma vez,
/// enquanto o status for `pendente` e a expiração estiver no futuro.
pub fn verificar_resgate(
    status: StatusConvite,
    data_expiracao: DateTime<Utc>,
    agora: DateTime<Utc>,
) -> Result<(), AppError> {
    match status {
        StatusConvite::Aceito => Err(AppError::ConviteJaUtilizado),
        StatusConvite::Expirado => Err(AppError::ConviteExpirado),
        StatusConvite::Pendente if data_expiracao <= agora => Err(AppError::ConviteExpirado),
        StatusConvite::Pendente => Ok(()),
    }
}

/// Expiração é preguiçosa: a linha continua `pendente` no banco, mas é
/// apresentada como `expirado` depois do prazo.
pub fn status_efetivo(
    status: StatusConvite,
    data_expiracao: DateTime<Utc>,
    agora: DateTime<Utc>,
) -> StatusConvite {
    match status {
        StatusConvite::Pendente if data_expiracao <= agora => StatusConvite::Expirado,
        outro => outro,
    }
}

// ---
// Convite de fundador (cria uma clínica nova)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConviteFundador {
    pub id: Uuid,
    pub email: String,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub token: Uuid,

    pub status: StatusConvite,
    pub data_expiracao: DateTime<Utc>,
    pub clinica_criada_id: Option<Uuid>,
    pub aceito_em: Option<DateTime<Utc>>,
    pub criado_por: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl ConviteFundador {
    pub fn verificar_resgate(&self, agora: DateTime<Utc>) -> Result<(), AppError> {
        verificar_resgate(self.status, self.data_expiracao, agora)
    }

    pub fn com_status_efetivo(mut self, agora: DateTime<Utc>) -> Self {
        self.status = status_efetivo(self.status, self.data_expiracao, agora);
        self
    }
}

// ---
// Convite de equipe (entrar numa clínica existente)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Convite {
    pub id: Uuid,
    pub clinica_id: Uuid,
    pub email: String,
    pub papel: Papel,

    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub token: Uuid,

    pub status: StatusConvite,
    pub data_expiracao: DateTime<Utc>,
    pub convidado_por: Option<Uuid>,
    pub usuario_criado_id: Option<Uuid>,
    pub aceito_em: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Convite {
    pub fn verificar_resgate(&self, agora: DateTime<Utc>) -> Result<(), AppError> {
        verificar_resgate(self.status, self.data_expiracao, agora)
    }

    pub fn com_status_efetivo(mut self, agora: DateTime<Utc>) -> Self {
        self.status = status_efetivo(self.status, self.data_expiracao, agora);
        self
    }
}

// ---
// Payloads e respostas
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CriarConviteFundadorPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "fundador@clinica.com")]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CriarConvitePayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "dentista@clinica.com")]
    pub email: String,
    pub papel: Papel,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReenviarConvitePayload {
    pub convite_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConviteEmitido {
    pub invite_id: Uuid,
    #[schema(example = "https://app.exemplo.com/convite?token=550e8400-e29b-41d4-a716-446655440000")]
    pub invite_url: String,
    pub email_enviado: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AceitarConviteFundadorPayload {
    pub token: Uuid,
    #[validate(custom(function = "validar_nome_clinica"))]
    #[schema(example = "Clínica X")]
    pub clinica_nome: String,
    pub user_id: Uuid,
    #[validate(custom(function = "validar_nome_pessoa"))]
    pub user_name: String,
    #[validate(email(message = "O e-mail da clínica é inválido."))]
    pub clinica_email: Option<String>,
    pub telefone: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AceitarConvitePayload {
    pub token: Uuid,
    pub user_id: Uuid,
    #[validate(custom(function = "validar_nome_pessoa"))]
    pub user_name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConviteAceito {
    pub clinica_id: Uuid,
    pub usuario_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Uuid,
}

// Pré-validação pública do link de convite
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConviteValidado {
    pub email: String,
    pub status: StatusConvite,
    pub data_expiracao: DateTime<Utc>,
    pub clinica_nome: Option<String>,
    pub papel: Option<Papel>,
}
