// src/db/identity_repo.rs

use async_trait::async_trait;
use bcrypt::{hash, verify};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::{mapear_violacao_unica, AppError},
        texto::normalizar_email,
    },
    db::store::IdentityProvider,
    models::auth::Identidade,
};

// Provedor de identidades sobre a tabela 'auth_usuarios'.
// Usa a pool diretamente: cada operação é confirmada na hora.
#[derive(Clone)]
pub struct PgIdentityProvider {
    pool: PgPool,
}

impl PgIdentityProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Identidade>, AppError> {
        let identidade = sqlx::query_as::<_, Identidade>(
            "SELECT * FROM auth_usuarios WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(identidade)
    }
}

#[async_trait]
impl IdentityProvider for PgIdentityProvider {
    async fn criar_identidade(&self, nome: &str, email: &str, senha: &str) -> Result<Identidade, AppError> {
        // Hashing fora do runtime assíncrono
        let senha = senha.to_owned();
        let password_hash = tokio::task::spawn_blocking(move || hash(&senha, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        sqlx::query_as::<_, Identidade>(
            r#"
            INSERT INTO auth_usuarios (nome, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(nome)
        .bind(normalizar_email(email))
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(mapear_violacao_unica)
    }

    async fn remover_identidade(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM auth_usuarios WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn autenticar(&self, email: &str, senha: &str) -> Result<Identidade, AppError> {
        let identidade = self
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let senha = senha.to_owned();
        let password_hash = identidade.password_hash.clone();

        // Executa a verificação em um thread separado
        let senha_valida = tokio::task::spawn_blocking(move || verify(&senha, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !senha_valida {
            return Err(AppError::InvalidCredentials);
        }

        Ok(identidade)
    }

    async fn buscar_identidade(&self, id: Uuid) -> Result<Option<Identidade>, AppError> {
        let identidade = sqlx::query_as::<_, Identidade>("SELECT * FROM auth_usuarios WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(identidade)
    }

    async fn listar_identidades(&self) -> Result<Vec<Identidade>, AppError> {
        let identidades = sqlx::query_as::<_, Identidade>(
            "SELECT * FROM auth_usuarios ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(identidades)
    }
}
