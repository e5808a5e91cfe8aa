// src/db/paciente_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{mapear_violacao_unica, AppError},
    models::paciente::{DadosPaciente, Paciente},
};

#[derive(Clone, Default)]
pub struct PacienteRepository;

impl PacienteRepository {
    pub async fn create_paciente<'e, E>(
        &self,
        executor: E,
        clinica_id: Uuid,
        dados: &DadosPaciente,
    ) -> Result<Paciente, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Paciente>(
            r#"
            INSERT INTO pacientes (clinica_id, nome, cpf, email, telefone, data_nascimento, observacoes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(clinica_id)
        .bind(&dados.nome)
        .bind(&dados.cpf)
        .bind(&dados.email)
        .bind(&dados.telefone)
        .bind(dados.data_nascimento)
        .bind(&dados.observacoes)
        .fetch_one(executor)
        .await
        .map_err(mapear_violacao_unica)
    }

    // Busca por nome ou CPF (case-insensitive); apenas pacientes ativos
    pub async fn list_pacientes<'e, E>(
        &self,
        executor: E,
        clinica_id: Uuid,
        busca: Option<&str>,
    ) -> Result<Vec<Paciente>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pacientes = sqlx::query_as::<_, Paciente>(
            r#"
            SELECT * FROM pacientes
            WHERE clinica_id = $1
              AND ativo
              AND ($2::text IS NULL OR nome ILIKE '%' || $2 || '%' OR cpf ILIKE '%' || $2 || '%')
            ORDER BY nome ASC
            "#,
        )
        .bind(clinica_id)
        .bind(busca)
        .fetch_all(executor)
        .await?;

        Ok(pacientes)
    }

    pub async fn find_paciente<'e, E>(
        &self,
        executor: E,
        clinica_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Paciente>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let paciente = sqlx::query_as::<_, Paciente>(
            "SELECT * FROM pacientes WHERE clinica_id = $1 AND id = $2",
        )
        .bind(clinica_id)
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(paciente)
    }

    pub async fn update_paciente<'e, E>(
        &self,
        executor: E,
        clinica_id: Uuid,
        id: Uuid,
        dados: &DadosPaciente,
    ) -> Result<Option<Paciente>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Paciente>(
            r#"
            UPDATE pacientes SET
                nome = $3, cpf = $4, email = $5, telefone = $6,
                data_nascimento = $7, observacoes = $8, updated_at = now()
            WHERE clinica_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(clinica_id)
        .bind(id)
        .bind(&dados.nome)
        .bind(&dados.cpf)
        .bind(&dados.email)
        .bind(&dados.telefone)
        .bind(dados.data_nascimento)
        .bind(&dados.observacoes)
        .fetch_optional(executor)
        .await
        .map_err(mapear_violacao_unica)
    }

    pub async fn deactivate_paciente<'e, E>(
        &self,
        executor: E,
        clinica_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Paciente>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let paciente = sqlx::query_as::<_, Paciente>(
            r#"
            UPDATE pacientes SET ativo = FALSE, updated_at = now()
            WHERE clinica_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(clinica_id)
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(paciente)
    }
}
