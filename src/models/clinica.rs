// src/models/clinica.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// ---
// Papel do usuário dentro da clínica
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "papel_usuario", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Papel {
    Admin,
    Dentista,
    Recepcionista,
    Assistente,
}

impl Papel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Papel::Admin => "admin",
            Papel::Dentista => "dentista",
            Papel::Recepcionista => "recepcionista",
            Papel::Assistente => "assistente",
        }
    }
}

// ---
// Clínica (o tenant)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Clinica {
    pub id: Uuid,

    #[schema(example = "Clínica Sorriso")]
    pub nome: String,

    #[schema(example = "clinica-sorriso")]
    pub slug: String,

    pub email: Option<String>,
    pub telefone: Option<String>,
    pub endereco: Option<String>,
    pub cidade: Option<String>,
    pub estado: Option<String>,
    pub cep: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NovaClinica {
    pub nome: String,
    pub slug: String,
    pub email: Option<String>,
    pub telefone: Option<String>,
}

// Campos editáveis do perfil da clínica (None = mantém o valor atual)
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AtualizarClinica {
    pub nome: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub endereco: Option<String>,
    pub cidade: Option<String>,
    pub estado: Option<String>,
    pub cep: Option<String>,
}

// ---
// Usuário da aplicação (sempre ligado a uma única clínica)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Usuario {
    pub id: Uuid,
    pub auth_usuario_id: Uuid,
    pub clinica_id: Uuid,
    pub nome: String,
    pub email: String,
    pub papel: Papel,
    pub ativo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NovoUsuario {
    pub auth_usuario_id: Uuid,
    pub clinica_id: Uuid,
    pub nome: String,
    pub email: String,
    pub papel: Papel,
}

// Resposta do /usuarios/me
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PerfilUsuario {
    pub usuario: Usuario,
    pub clinica: Clinica,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AlterarPapelPayload {
    pub papel: Papel,
}
