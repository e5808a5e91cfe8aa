// src/models/paciente.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::texto::validar_nome_pessoa;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Paciente {
    pub id: Uuid,

    #[schema(ignore)]
    pub clinica_id: Uuid,

    #[schema(example = "Maria Oliveira")]
    pub nome: String,

    #[schema(example = "123.456.789-09")]
    pub cpf: Option<String>,

    pub email: Option<String>,
    pub telefone: Option<String>,

    #[schema(value_type = Option<String>, format = Date, example = "1990-04-21")]
    pub data_nascimento: Option<NaiveDate>,

    pub observacoes: Option<String>,
    pub ativo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Usado tanto na criação quanto na atualização (PUT substitui os dados)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DadosPaciente {
    #[validate(custom(function = "validar_nome_pessoa"))]
    pub nome: String,

    #[validate(length(min = 11, max = 14, message = "O CPF deve ter entre 11 e 14 caracteres."))]
    pub cpf: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub telefone: Option<String>,

    #[schema(value_type = Option<String>, format = Date)]
    pub data_nascimento: Option<NaiveDate>,

    pub observacoes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BuscaPacientes {
    pub busca: Option<String>,
}
