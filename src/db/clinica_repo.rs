// src/db/clinica_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{mapear_violacao_unica, AppError},
    models::clinica::{AtualizarClinica, Clinica, NovaClinica},
};

// O repositório de clínicas (tabela 'clinicas')
#[derive(Clone, Default)]
pub struct ClinicaRepository;

impl ClinicaRepository {
    pub async fn create_clinica<'e, E>(
        &self,
        executor: E,
        nova: &NovaClinica,
    ) -> Result<Clinica, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Clinica>(
            r#"
            INSERT INTO clinicas (nome, slug, email, telefone)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&nova.nome)
        .bind(&nova.slug)
        .bind(&nova.email)
        .bind(&nova.telefone)
        .fetch_one(executor)
        .await
        .map_err(mapear_violacao_unica)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Clinica>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let clinica = sqlx::query_as::<_, Clinica>("SELECT * FROM clinicas WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(clinica)
    }

    pub async fn lock_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM clinicas WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Clínica".into()))?;
        Ok(())
    }

    // Slugs já usados que começam com a base (para escolher o próximo livre)
    pub async fn slugs_with_prefix<'e, E>(&self, executor: E, base: &str) -> Result<Vec<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let slugs = sqlx::query_scalar::<_, String>(
            "SELECT slug FROM clinicas WHERE slug = $1 OR slug LIKE $1 || '-%'",
        )
        .bind(base)
        .fetch_all(executor)
        .await?;
        Ok(slugs)
    }

    // COALESCE mantém o valor atual quando o campo não veio no payload
    pub async fn update_clinica<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        dados: &AtualizarClinica,
    ) -> Result<Option<Clinica>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let clinica = sqlx::query_as::<_, Clinica>(
            r#"
            UPDATE clinicas SET
                nome = COALESCE($2, nome),
                email = COALESCE($3, email),
                telefone = COALESCE($4, telefone),
                endereco = COALESCE($5, endereco),
                cidade = COALESCE($6, cidade),
                estado = COALESCE($7, estado),
                cep = COALESCE($8, cep),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&dados.nome)
        .bind(&dados.email)
        .bind(&dados.telefone)
        .bind(&dados.endereco)
        .bind(&dados.cidade)
        .bind(&dados.estado)
        .bind(&dados.cep)
        .fetch_optional(executor)
        .await?;
        Ok(clinica)
    }
}
