// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// O erro de domínio, usado por repositórios e serviços.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Regra de negócio violada: {0}")]
    RegraNegocio(String),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado: {0}")]
    Forbidden(String),

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    #[error("Convite não encontrado")]
    ConviteNaoEncontrado,

    #[error("Convite já utilizado")]
    ConviteJaUtilizado,

    #[error("Convite expirado")]
    ConviteExpirado,

    #[error("Convite não pode ser alterado no status atual")]
    ConviteInvalido,

    #[error("Já existe um convite pendente para este e-mail")]
    ConvitePendenteExistente,

    #[error("Esta identidade já está vinculada a uma clínica")]
    UsuarioJaVinculado,

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// O erro que sai pela API (já traduzido)
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::RegraNegocio(_)
            | AppError::ConviteJaUtilizado
            | AppError::ConviteInvalido => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::ResourceNotFound(_) | AppError::ConviteNaoEncontrado => StatusCode::NOT_FOUND,
            AppError::EmailAlreadyExists
            | AppError::ConvitePendenteExistente
            | AppError::UsuarioJaVinculado
            | AppError::UniqueConstraintViolation(_) => StatusCode::CONFLICT,
            AppError::ConviteExpirado => StatusCode::GONE,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Chave estável da mensagem no I18nStore.
    pub fn codigo(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_error",
            AppError::RegraNegocio(_) => "business_rule",
            AppError::EmailAlreadyExists => "email_already_exists",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::InvalidToken => "invalid_token",
            AppError::Forbidden(_) => "forbidden",
            AppError::ResourceNotFound(_) => "resource_not_found",
            AppError::ConviteNaoEncontrado => "invite_not_found",
            AppError::ConviteJaUtilizado => "invite_already_used",
            AppError::ConviteExpirado => "invite_expired",
            AppError::ConviteInvalido => "invite_invalid_status",
            AppError::ConvitePendenteExistente => "invite_already_pending",
            AppError::UsuarioJaVinculado => "user_already_linked",
            AppError::UniqueConstraintViolation(_) => "unique_violation",
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => "internal_error",
        }
    }

    /// Converte o erro de domínio no erro da API, traduzindo a mensagem.
    /// Erros 5xx são logados aqui e nunca vazam detalhes para o cliente.
    pub fn to_api_error(self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let status = self.status();
        let error = i18n.mensagem(&locale.0, self.codigo());

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), json!(messages));
                }
                Some(Value::Object(details))
            }
            AppError::RegraNegocio(msg)
            | AppError::Forbidden(msg)
            | AppError::ResourceNotFound(msg)
            | AppError::UniqueConstraintViolation(msg) => Some(json!({ "motivo": msg })),
            ref e if status.is_server_error() => {
                tracing::error!("🔥 Erro Interno do Servidor: {}", e);
                None
            }
            _ => None,
        };

        ApiError { status, error, details }
    }
}

// Usado pelos middlewares, que não têm acesso ao Locale.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), I18nStore::global())
            .into_response()
    }
}

/// Traduz violações de unicidade do Postgres pelo nome da constraint.
pub fn mapear_violacao_unica(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            if let Some(constraint) = db_err.constraint() {
                return match constraint {
                    "auth_usuarios_email_key" => AppError::EmailAlreadyExists,
                    "convites_fundador_email_pendente_key" | "convites_email_pendente_key" => {
                        AppError::ConvitePendenteExistente
                    }
                    "usuarios_auth_usuario_id_key" => AppError::UsuarioJaVinculado,
                    "pacientes_cpf_key" => AppError::UniqueConstraintViolation(
                        "Já existe um paciente com este CPF.".into(),
                    ),
                    _ => AppError::UniqueConstraintViolation(constraint.to_string()),
                };
            }
        }
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_segue_a_taxonomia_dos_convites() {
        assert_eq!(AppError::ConviteNaoEncontrado.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::ConviteJaUtilizado.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::ConviteExpirado.status(), StatusCode::GONE);
        assert_eq!(AppError::ConvitePendenteExistente.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn erro_interno_nao_vaza_a_mensagem_original() {
        let err = AppError::InternalServerError(anyhow::anyhow!("senha do banco: hunter2"));
        let api = err.to_api_error(&Locale("pt".into()), I18nStore::global());
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.error.contains("hunter2"));
        assert!(api.details.is_none());
    }

    #[test]
    fn mensagem_respeita_o_idioma() {
        let pt = AppError::ConviteExpirado.to_api_error(&Locale("pt".into()), I18nStore::global());
        let en = AppError::ConviteExpirado.to_api_error(&Locale("en".into()), I18nStore::global());
        assert_ne!(pt.error, en.error);
    }
}
