// src/models/finance.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tipo_transacao", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TipoTransacao {
    Receita, // A receber
    Despesa, // A pagar
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "status_transacao", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StatusTransacao {
    Pendente,
    Pago,
    Cancelado,
    Estornado,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "metodo_pagamento", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MetodoPagamento {
    Dinheiro,
    Pix,
    CartaoCredito,
    CartaoDebito,
    Boleto,
    Transferencia,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContaBancaria {
    pub id: Uuid,

    #[schema(ignore)]
    pub clinica_id: Uuid,

    #[schema(example = "Conta Principal")]
    pub nome: String,

    #[schema(example = "Banco do Brasil")]
    pub banco: Option<String>,

    #[schema(example = "1500.50")]
    pub saldo: Decimal,

    pub ativo: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transacao {
    pub id: Uuid,

    #[schema(ignore)]
    pub clinica_id: Uuid,

    pub tipo: TipoTransacao,

    #[schema(example = "Tratamento de canal - 3x")]
    pub descricao: String,

    #[schema(example = "900.00")]
    pub valor_bruto: Decimal,
    #[schema(example = "873.00")]
    pub valor_liquido: Decimal,

    pub status: StatusTransacao,
    pub total_parcelas: i32,
    pub metodo_pagamento: MetodoPagamento,

    // Vínculos
    pub paciente_id: Option<Uuid>,
    pub conta_bancaria_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Parcela {
    pub id: Uuid,
    pub transacao_id: Uuid,
    pub numero_parcela: i32,

    #[schema(example = "291.00")]
    pub valor: Decimal,

    pub status: StatusTransacao,

    #[schema(value_type = String, format = Date, example = "2026-11-10")]
    pub data_vencimento: NaiveDate,
    #[schema(value_type = Option<String>, format = Date, example = "2026-11-08")]
    pub data_pagamento: Option<NaiveDate>,

    // Conta onde o pagamento caiu (ou saiu)
    pub conta_bancaria_id: Option<Uuid>,
}

impl Parcela {
    /// Uma parcela conta como paga pelo status ou por ter data de pagamento,
    /// desde que não tenha sido cancelada.
    pub fn esta_paga(&self) -> bool {
        match self.status {
            StatusTransacao::Pago => true,
            StatusTransacao::Cancelado => false,
            _ => self.data_pagamento.is_some(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NovaContaBancaria {
    pub clinica_id: Uuid,
    pub nome: String,
    pub banco: Option<String>,
    pub saldo_inicial: Decimal,
}

#[derive(Debug, Clone)]
pub struct NovaTransacao {
    pub clinica_id: Uuid,
    pub tipo: TipoTransacao,
    pub descricao: String,
    pub valor_bruto: Decimal,
    pub valor_liquido: Decimal,
    pub total_parcelas: i32,
    pub metodo_pagamento: MetodoPagamento,
    pub paciente_id: Option<Uuid>,
    pub conta_bancaria_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct NovaParcela {
    pub transacao_id: Uuid,
    pub numero_parcela: i32,
    pub valor: Decimal,
    pub data_vencimento: NaiveDate,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FiltroTransacoes {
    pub tipo: Option<TipoTransacao>,
    pub status: Option<StatusTransacao>,
}

// Transação + parcelas (GET /transacoes/{id})
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransacaoDetalhe {
    #[serde(flatten)]
    pub transacao: Transacao,
    pub parcelas: Vec<Parcela>,
}

// Resultado de uma operação numa parcela (parcela alterada + pai reconciliado)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParcelaAtualizada {
    pub parcela: Parcela,
    pub transacao: Transacao,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CriarContaBancariaPayload {
    #[validate(length(min = 1, message = "O nome da conta é obrigatório."))]
    #[schema(example = "Conta Principal")]
    pub nome: String,
    pub banco: Option<String>,
    #[serde(default)]
    #[schema(example = "0.00")]
    pub saldo_inicial: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CriarTransacaoPayload {
    pub tipo: TipoTransacao,

    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    pub descricao: String,

    #[schema(example = "900.00")]
    pub valor_bruto: Decimal,

    // Taxa da maquininha / banco, descontada do bruto
    #[serde(default)]
    #[schema(example = "27.00")]
    pub taxa: Decimal,

    #[validate(range(min = 1, max = 120, message = "O número de parcelas deve estar entre 1 e 120."))]
    pub total_parcelas: i32,

    #[schema(value_type = String, format = Date, example = "2026-11-10")]
    pub primeiro_vencimento: NaiveDate,

    pub metodo_pagamento: MetodoPagamento,
    pub paciente_id: Option<Uuid>,
    pub conta_bancaria_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PagarParcelaPayload {
    #[schema(value_type = Option<String>, format = Date, example = "2026-11-08")]
    pub data_pagamento: Option<NaiveDate>,
    pub conta_bancaria_id: Option<Uuid>,
}
