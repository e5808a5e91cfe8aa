// src/db/usuario_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{mapear_violacao_unica, AppError},
    models::clinica::{NovoUsuario, Papel, Usuario},
};

// O repositório de usuários da aplicação (tabela 'usuarios')
#[derive(Clone, Default)]
pub struct UsuarioRepository;

impl UsuarioRepository {
    // Cria o vínculo identidade -> clínica.
    // Uma identidade só pode ter um usuário (constraint usuarios_auth_usuario_id_key).
    pub async fn create_usuario<'e, E>(&self, executor: E, novo: &NovoUsuario) -> Result<Usuario, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Usuario>(
            r#"
            INSERT INTO usuarios (auth_usuario_id, clinica_id, nome, email, papel)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(novo.auth_usuario_id)
        .bind(novo.clinica_id)
        .bind(&novo.nome)
        .bind(&novo.email)
        .bind(novo.papel)
        .fetch_one(executor)
        .await
        .map_err(mapear_violacao_unica)
    }

    pub async fn find_by_auth_id<'e, E>(
        &self,
        executor: E,
        auth_usuario_id: Uuid,
    ) -> Result<Option<Usuario>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let usuario = sqlx::query_as::<_, Usuario>("SELECT * FROM usuarios WHERE auth_usuario_id = $1")
            .bind(auth_usuario_id)
            .fetch_optional(executor)
            .await?;
        Ok(usuario)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        clinica_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Usuario>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let usuario = sqlx::query_as::<_, Usuario>(
            "SELECT * FROM usuarios WHERE clinica_id = $1 AND id = $2",
        )
        .bind(clinica_id)
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(usuario)
    }

    pub async fn list_by_clinica<'e, E>(&self, executor: E, clinica_id: Uuid) -> Result<Vec<Usuario>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let usuarios = sqlx::query_as::<_, Usuario>(
            "SELECT * FROM usuarios WHERE clinica_id = $1 ORDER BY nome ASC",
        )
        .bind(clinica_id)
        .fetch_all(executor)
        .await?;
        Ok(usuarios)
    }

    pub async fn update_papel<'e, E>(
        &self,
        executor: E,
        clinica_id: Uuid,
        id: Uuid,
        papel: Papel,
    ) -> Result<Option<Usuario>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let usuario = sqlx::query_as::<_, Usuario>(
            r#"
            UPDATE usuarios SET papel = $3, updated_at = now()
            WHERE clinica_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(clinica_id)
        .bind(id)
        .bind(papel)
        .fetch_optional(executor)
        .await?;
        Ok(usuario)
    }

    // Soft delete: o histórico continua apontando para o usuário
    pub async fn deactivate<'e, E>(
        &self,
        executor: E,
        clinica_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Usuario>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let usuario = sqlx::query_as::<_, Usuario>(
            r#"
            UPDATE usuarios SET ativo = FALSE, updated_at = now()
            WHERE clinica_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(clinica_id)
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(usuario)
    }

    pub async fn count_active_admins<'e, E>(&self, executor: E, clinica_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM usuarios WHERE clinica_id = $1 AND papel = 'admin' AND ativo",
        )
        .bind(clinica_id)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }
}
