// src/db/finance_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::finance::{
        ContaBancaria, FiltroTransacoes, NovaContaBancaria, NovaParcela, NovaTransacao, Parcela,
        StatusTransacao, Transacao,
    },
};

#[derive(Clone, Default)]
pub struct FinanceRepository;

impl FinanceRepository {
    // =========================================================================
    //  CONTAS BANCÁRIAS
    // =========================================================================

    pub async fn create_account<'e, E>(
        &self,
        executor: E,
        nova: &NovaContaBancaria,
    ) -> Result<ContaBancaria, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let conta = sqlx::query_as::<_, ContaBancaria>(
            r#"
            INSERT INTO contas_bancarias (clinica_id, nome, banco, saldo)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(nova.clinica_id)
        .bind(&nova.nome)
        .bind(&nova.banco)
        .bind(nova.saldo_inicial)
        .fetch_one(executor)
        .await?;

        Ok(conta)
    }

    pub async fn get_all_accounts<'e, E>(
        &self,
        executor: E,
        clinica_id: Uuid,
    ) -> Result<Vec<ContaBancaria>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let contas = sqlx::query_as::<_, ContaBancaria>(
            "SELECT * FROM contas_bancarias WHERE clinica_id = $1 ORDER BY nome ASC",
        )
        .bind(clinica_id)
        .fetch_all(executor)
        .await?;

        Ok(contas)
    }

    pub async fn find_account<'e, E>(
        &self,
        executor: E,
        clinica_id: Uuid,
        id: Uuid,
    ) -> Result<Option<ContaBancaria>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let conta = sqlx::query_as::<_, ContaBancaria>(
            "SELECT * FROM contas_bancarias WHERE clinica_id = $1 AND id = $2",
        )
        .bind(clinica_id)
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(conta)
    }

    // Chama o procedimento debitar_saldo e devolve o novo saldo
    pub async fn debit_balance<'e, E>(
        &self,
        executor: E,
        conta_id: Uuid,
        valor: Decimal,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let saldo = sqlx::query_scalar::<_, Decimal>("SELECT debitar_saldo($1, $2)")
            .bind(conta_id)
            .bind(valor)
            .fetch_one(executor)
            .await?;

        Ok(saldo)
    }

    // =========================================================================
    //  TRANSAÇÕES
    // =========================================================================

    pub async fn create_transaction<'e, E>(
        &self,
        executor: E,
        nova: &NovaTransacao,
    ) -> Result<Transacao, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let transacao = sqlx::query_as::<_, Transacao>(
            r#"
            INSERT INTO transacoes (
                clinica_id, tipo, descricao,
                valor_bruto, valor_liquido, total_parcelas,
                metodo_pagamento, paciente_id, conta_bancaria_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(nova.clinica_id)
        .bind(nova.tipo)
        .bind(&nova.descricao)
        .bind(nova.valor_bruto)
        .bind(nova.valor_liquido)
        .bind(nova.total_parcelas)
        .bind(nova.metodo_pagamento)
        .bind(nova.paciente_id)
        .bind(nova.conta_bancaria_id)
        .fetch_one(executor)
        .await?;

        Ok(transacao)
    }

    pub async fn find_transaction<'e, E>(
        &self,
        executor: E,
        clinica_id: Uuid,
        id: Uuid,
        bloquear: bool,
    ) -> Result<Option<Transacao>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = if bloquear {
            "SELECT * FROM transacoes WHERE clinica_id = $1 AND id = $2 FOR UPDATE"
        } else {
            "SELECT * FROM transacoes WHERE clinica_id = $1 AND id = $2"
        };
        let transacao = sqlx::query_as::<_, Transacao>(sql)
            .bind(clinica_id)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(transacao)
    }

    // Filtros opcionais: NULL no parâmetro desliga o filtro
    pub async fn list_transactions<'e, E>(
        &self,
        executor: E,
        clinica_id: Uuid,
        filtro: &FiltroTransacoes,
    ) -> Result<Vec<Transacao>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let transacoes = sqlx::query_as::<_, Transacao>(
            r#"
            SELECT * FROM transacoes
            WHERE clinica_id = $1
              AND ($2::tipo_transacao IS NULL OR tipo = $2)
              AND ($3::status_transacao IS NULL OR status = $3)
            ORDER BY created_at DESC
            "#,
        )
        .bind(clinica_id)
        .bind(filtro.tipo)
        .bind(filtro.status)
        .fetch_all(executor)
        .await?;

        Ok(transacoes)
    }

    pub async fn update_transaction_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: StatusTransacao,
    ) -> Result<Transacao, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let transacao = sqlx::query_as::<_, Transacao>(
            "UPDATE transacoes SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_one(executor)
        .await?;

        Ok(transacao)
    }

    // =========================================================================
    //  PARCELAS
    // =========================================================================

    pub async fn create_installment<'e, E>(
        &self,
        executor: E,
        nova: &NovaParcela,
    ) -> Result<Parcela, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let parcela = sqlx::query_as::<_, Parcela>(
            r#"
            INSERT INTO parcelas (transacao_id, numero_parcela, valor, data_vencimento)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(nova.transacao_id)
        .bind(nova.numero_parcela)
        .bind(nova.valor)
        .bind(nova.data_vencimento)
        .fetch_one(executor)
        .await?;

        Ok(parcela)
    }

    pub async fn list_installments<'e, E>(
        &self,
        executor: E,
        transacao_id: Uuid,
    ) -> Result<Vec<Parcela>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let parcelas = sqlx::query_as::<_, Parcela>(
            "SELECT * FROM parcelas WHERE transacao_id = $1 ORDER BY numero_parcela ASC",
        )
        .bind(transacao_id)
        .fetch_all(executor)
        .await?;

        Ok(parcelas)
    }

    // O JOIN garante que a parcela pertence a uma transação da clínica
    pub async fn find_installment<'e, E>(
        &self,
        executor: E,
        clinica_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Parcela>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let parcela = sqlx::query_as::<_, Parcela>(
            r#"
            SELECT p.* FROM parcelas p
            JOIN transacoes t ON t.id = p.transacao_id
            WHERE t.clinica_id = $1 AND p.id = $2
            "#,
        )
        .bind(clinica_id)
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(parcela)
    }

    pub async fn update_installment<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: StatusTransacao,
        data_pagamento: Option<NaiveDate>,
        conta_bancaria_id: Option<Uuid>,
    ) -> Result<Parcela, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let parcela = sqlx::query_as::<_, Parcela>(
            r#"
            UPDATE parcelas
               SET status = $2, data_pagamento = $3, conta_bancaria_id = $4
             WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(data_pagamento)
        .bind(conta_bancaria_id)
        .fetch_one(executor)
        .await?;

        Ok(parcela)
    }
}
