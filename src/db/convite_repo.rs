// src/db/convite_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{mapear_violacao_unica, AppError},
    models::{
        clinica::Papel,
        convite::{Convite, ConviteFundador},
    },
};

// Convites de fundador (tabela 'convites_fundador') e de equipe ('convites').
// Linhas nunca são apagadas: servem de trilha de auditoria.
#[derive(Clone, Default)]
pub struct ConviteRepository;

impl ConviteRepository {
    // =========================================================================
    //  CONVITES DE FUNDADOR
    // =========================================================================

    // O token e a pendência única por e-mail ficam a cargo do procedimento
    pub async fn create_founder_invite<'e, E>(
        &self,
        executor: E,
        email: &str,
        data_expiracao: DateTime<Utc>,
        criado_por: Option<Uuid>,
    ) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_scalar::<_, Uuid>("SELECT criar_convite_fundador($1, $2, $3)")
            .bind(email)
            .bind(data_expiracao)
            .bind(criado_por)
            .fetch_one(executor)
            .await
            .map_err(mapear_violacao_unica)
    }

    pub async fn find_founder_invite<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<ConviteFundador>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let convite = sqlx::query_as::<_, ConviteFundador>("SELECT * FROM convites_fundador WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(convite)
    }

    pub async fn find_founder_invite_by_token<'e, E>(
        &self,
        executor: E,
        token: Uuid,
        bloquear: bool,
    ) -> Result<Option<ConviteFundador>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // FOR UPDATE serializa aceites concorrentes do mesmo token
        let sql = if bloquear {
            "SELECT * FROM convites_fundador WHERE token = $1 FOR UPDATE"
        } else {
            "SELECT * FROM convites_fundador WHERE token = $1"
        };
        let convite = sqlx::query_as::<_, ConviteFundador>(sql)
            .bind(token)
            .fetch_optional(executor)
            .await?;
        Ok(convite)
    }

    pub async fn list_founder_invites<'e, E>(&self, executor: E) -> Result<Vec<ConviteFundador>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let convites = sqlx::query_as::<_, ConviteFundador>(
            "SELECT * FROM convites_fundador ORDER BY created_at DESC",
        )
        .fetch_all(executor)
        .await?;
        Ok(convites)
    }

    pub async fn mark_founder_invite_accepted<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        clinica_id: Uuid,
        aceito_em: DateTime<Utc>,
    ) -> Result<ConviteFundador, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let convite = sqlx::query_as::<_, ConviteFundador>(
            r#"
            UPDATE convites_fundador
               SET status = 'aceito', clinica_criada_id = $2, aceito_em = $3
             WHERE id = $1 AND status = 'pendente'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(clinica_id)
        .bind(aceito_em)
        .fetch_optional(executor)
        .await?;
        convite.ok_or(AppError::ConviteInvalido)
    }

    // =========================================================================
    //  CONVITES DE EQUIPE
    // =========================================================================

    pub async fn create_invite<'e, E>(
        &self,
        executor: E,
        clinica_id: Uuid,
        email: &str,
        papel: Papel,
        data_expiracao: DateTime<Utc>,
        convidado_por: Option<Uuid>,
    ) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_scalar::<_, Uuid>("SELECT criar_convite($1, $2, $3, $4, $5)")
            .bind(clinica_id)
            .bind(email)
            .bind(papel)
            .bind(data_expiracao)
            .bind(convidado_por)
            .fetch_one(executor)
            .await
            .map_err(mapear_violacao_unica)
    }

    pub async fn find_invite<'e, E>(
        &self,
        executor: E,
        clinica_id: Uuid,
        id: Uuid,
        bloquear: bool,
    ) -> Result<Option<Convite>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = if bloquear {
            "SELECT * FROM convites WHERE clinica_id = $1 AND id = $2 FOR UPDATE"
        } else {
            "SELECT * FROM convites WHERE clinica_id = $1 AND id = $2"
        };
        let convite = sqlx::query_as::<_, Convite>(sql)
            .bind(clinica_id)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(convite)
    }

    pub async fn find_invite_by_token<'e, E>(
        &self,
        executor: E,
        token: Uuid,
        bloquear: bool,
    ) -> Result<Option<Convite>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = if bloquear {
            "SELECT * FROM convites WHERE token = $1 FOR UPDATE"
        } else {
            "SELECT * FROM convites WHERE token = $1"
        };
        let convite = sqlx::query_as::<_, Convite>(sql)
            .bind(token)
            .fetch_optional(executor)
            .await?;
        Ok(convite)
    }

    pub async fn list_invites<'e, E>(&self, executor: E, clinica_id: Uuid) -> Result<Vec<Convite>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let convites = sqlx::query_as::<_, Convite>(
            "SELECT * FROM convites WHERE clinica_id = $1 ORDER BY created_at DESC",
        )
        .bind(clinica_id)
        .fetch_all(executor)
        .await?;
        Ok(convites)
    }

    pub async fn renew_invite<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        data_expiracao: DateTime<Utc>,
    ) -> Result<Convite, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let convite = sqlx::query_as::<_, Convite>(
            "UPDATE convites SET data_expiracao = $2 WHERE id = $1 AND status = 'pendente' RETURNING *",
        )
        .bind(id)
        .bind(data_expiracao)
        .fetch_optional(executor)
        .await?;
        convite.ok_or(AppError::ConviteInvalido)
    }

    pub async fn mark_invite_accepted<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        usuario_id: Uuid,
        aceito_em: DateTime<Utc>,
    ) -> Result<Convite, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let convite = sqlx::query_as::<_, Convite>(
            r#"
            UPDATE convites
               SET status = 'aceito', usuario_criado_id = $2, aceito_em = $3
             WHERE id = $1 AND status = 'pendente'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(usuario_id)
        .bind(aceito_em)
        .fetch_optional(executor)
        .await?;
        // Outra transação já mudou o status
        convite.ok_or(AppError::ConviteInvalido)
    }

    pub async fn mark_invite_expired<'e, E>(&self, executor: E, id: Uuid) -> Result<Convite, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let convite = sqlx::query_as::<_, Convite>(
            "UPDATE convites SET status = 'expirado' WHERE id = $1 AND status = 'pendente' RETURNING *",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        convite.ok_or(AppError::ConviteInvalido)
    }
}
