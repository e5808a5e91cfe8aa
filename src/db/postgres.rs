// src/db/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        store::{Datastore, UnitOfWork},
        ClinicaRepository, ConviteRepository, FinanceRepository, PacienteRepository,
        UsuarioRepository,
    },
    models::{
        clinica::{AtualizarClinica, Clinica, NovaClinica, NovoUsuario, Papel, Usuario},
        convite::{Convite, ConviteFundador},
        finance::{
            ContaBancaria, FiltroTransacoes, NovaContaBancaria, NovaParcela, NovaTransacao,
            Parcela, StatusTransacao, Transacao,
        },
        paciente::{DadosPaciente, Paciente},
    },
};

#[derive(Clone)]
pub struct PgDatastore {
    pool: PgPool,
}

impl PgDatastore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Datastore for PgDatastore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, AppError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork {
            tx,
            clinicas: ClinicaRepository,
            usuarios: UsuarioRepository,
            convites: ConviteRepository,
            finance: FinanceRepository,
            pacientes: PacienteRepository,
        }))
    }
}

// Se o PgUnitOfWork for descartado sem commit, o sqlx faz rollback no drop.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
    clinicas: ClinicaRepository,
    usuarios: UsuarioRepository,
    convites: ConviteRepository,
    finance: FinanceRepository,
    pacientes: PacienteRepository,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        self.tx.commit().await?;
        Ok(())
    }

    // --- Clínicas ---

    async fn inserir_clinica(&mut self, nova: &NovaClinica) -> Result<Clinica, AppError> {
        self.clinicas.create_clinica(&mut *self.tx, nova).await
    }

    async fn buscar_clinica(&mut self, id: Uuid) -> Result<Option<Clinica>, AppError> {
        self.clinicas.find_by_id(&mut *self.tx, id).await
    }

    async fn travar_clinica(&mut self, id: Uuid) -> Result<(), AppError> {
        self.clinicas.lock_by_id(&mut *self.tx, id).await
    }

    async fn slugs_com_prefixo(&mut self, base: &str) -> Result<Vec<String>, AppError> {
        self.clinicas.slugs_with_prefix(&mut *self.tx, base).await
    }

    async fn atualizar_clinica(
        &mut self,
        id: Uuid,
        dados: &AtualizarClinica,
    ) -> Result<Option<Clinica>, AppError> {
        self.clinicas.update_clinica(&mut *self.tx, id, dados).await
    }

    // --- Usuários ---

    async fn inserir_usuario(&mut self, novo: &NovoUsuario) -> Result<Usuario, AppError> {
        self.usuarios.create_usuario(&mut *self.tx, novo).await
    }

    async fn buscar_usuario_por_auth(&mut self, auth_usuario_id: Uuid) -> Result<Option<Usuario>, AppError> {
        self.usuarios.find_by_auth_id(&mut *self.tx, auth_usuario_id).await
    }

    async fn buscar_usuario(&mut self, clinica_id: Uuid, id: Uuid) -> Result<Option<Usuario>, AppError> {
        self.usuarios.find_by_id(&mut *self.tx, clinica_id, id).await
    }

    async fn listar_usuarios(&mut self, clinica_id: Uuid) -> Result<Vec<Usuario>, AppError> {
        self.usuarios.list_by_clinica(&mut *self.tx, clinica_id).await
    }

    async fn atualizar_papel(
        &mut self,
        clinica_id: Uuid,
        id: Uuid,
        papel: Papel,
    ) -> Result<Option<Usuario>, AppError> {
        self.usuarios.update_papel(&mut *self.tx, clinica_id, id, papel).await
    }

    async fn desativar_usuario(&mut self, clinica_id: Uuid, id: Uuid) -> Result<Option<Usuario>, AppError> {
        self.usuarios.deactivate(&mut *self.tx, clinica_id, id).await
    }

    async fn contar_admins_ativos(&mut self, clinica_id: Uuid) -> Result<i64, AppError> {
        self.usuarios.count_active_admins(&mut *self.tx, clinica_id).await
    }

    // --- Convites de fundador ---

    async fn criar_convite_fundador(
        &mut self,
        email: &str,
        data_expiracao: DateTime<Utc>,
        criado_por: Option<Uuid>,
    ) -> Result<Uuid, AppError> {
        self.convites
            .create_founder_invite(&mut *self.tx, email, data_expiracao, criado_por)
            .await
    }

    async fn buscar_convite_fundador(&mut self, id: Uuid) -> Result<Option<ConviteFundador>, AppError> {
        self.convites.find_founder_invite(&mut *self.tx, id).await
    }

    async fn buscar_convite_fundador_por_token(
        &mut self,
        token: Uuid,
        bloquear: bool,
    ) -> Result<Option<ConviteFundador>, AppError> {
        self.convites
            .find_founder_invite_by_token(&mut *self.tx, token, bloquear)
            .await
    }

    async fn listar_convites_fundador(&mut self) -> Result<Vec<ConviteFundador>, AppError> {
        self.convites.list_founder_invites(&mut *self.tx).await
    }

    async fn marcar_convite_fundador_aceito(
        &mut self,
        id: Uuid,
        clinica_id: Uuid,
        aceito_em: DateTime<Utc>,
    ) -> Result<ConviteFundador, AppError> {
        self.convites
            .mark_founder_invite_accepted(&mut *self.tx, id, clinica_id, aceito_em)
            .await
    }

    // --- Convites de equipe ---

    async fn criar_convite(
        &mut self,
        clinica_id: Uuid,
        email: &str,
        papel: Papel,
        data_expiracao: DateTime<Utc>,
        convidado_por: Option<Uuid>,
    ) -> Result<Uuid, AppError> {
        self.convites
            .create_invite(&mut *self.tx, clinica_id, email, papel, data_expiracao, convidado_por)
            .await
    }

    async fn buscar_convite(
        &mut self,
        clinica_id: Uuid,
        id: Uuid,
        bloquear: bool,
    ) -> Result<Option<Convite>, AppError> {
        self.convites.find_invite(&mut *self.tx, clinica_id, id, bloquear).await
    }

    async fn buscar_convite_por_token(&mut self, token: Uuid, bloquear: bool) -> Result<Option<Convite>, AppError> {
        self.convites.find_invite_by_token(&mut *self.tx, token, bloquear).await
    }

    async fn listar_convites(&mut self, clinica_id: Uuid) -> Result<Vec<Convite>, AppError> {
        self.convites.list_invites(&mut *self.tx, clinica_id).await
    }

    async fn renovar_convite(&mut self, id: Uuid, data_expiracao: DateTime<Utc>) -> Result<Convite, AppError> {
        self.convites.renew_invite(&mut *self.tx, id, data_expiracao).await
    }

    async fn marcar_convite_aceito(
        &mut self,
        id: Uuid,
        usuario_id: Uuid,
        aceito_em: DateTime<Utc>,
    ) -> Result<Convite, AppError> {
        self.convites
            .mark_invite_accepted(&mut *self.tx, id, usuario_id, aceito_em)
            .await
    }

    async fn marcar_convite_expirado(&mut self, id: Uuid) -> Result<Convite, AppError> {
        self.convites.mark_invite_expired(&mut *self.tx, id).await
    }

    // --- Contas bancárias ---

    async fn inserir_conta_bancaria(&mut self, nova: &NovaContaBancaria) -> Result<ContaBancaria, AppError> {
        self.finance.create_account(&mut *self.tx, nova).await
    }

    async fn listar_contas_bancarias(&mut self, clinica_id: Uuid) -> Result<Vec<ContaBancaria>, AppError> {
        self.finance.get_all_accounts(&mut *self.tx, clinica_id).await
    }

    async fn buscar_conta_bancaria(
        &mut self,
        clinica_id: Uuid,
        id: Uuid,
    ) -> Result<Option<ContaBancaria>, AppError> {
        self.finance.find_account(&mut *self.tx, clinica_id, id).await
    }

    async fn debitar_saldo(&mut self, conta_id: Uuid, valor: Decimal) -> Result<Decimal, AppError> {
        self.finance.debit_balance(&mut *self.tx, conta_id, valor).await
    }

    // --- Transações e parcelas ---

    async fn inserir_transacao(&mut self, nova: &NovaTransacao) -> Result<Transacao, AppError> {
        self.finance.create_transaction(&mut *self.tx, nova).await
    }

    async fn inserir_parcela(&mut self, nova: &NovaParcela) -> Result<Parcela, AppError> {
        self.finance.create_installment(&mut *self.tx, nova).await
    }

    async fn buscar_transacao(
        &mut self,
        clinica_id: Uuid,
        id: Uuid,
        bloquear: bool,
    ) -> Result<Option<Transacao>, AppError> {
        self.finance
            .find_transaction(&mut *self.tx, clinica_id, id, bloquear)
            .await
    }

    async fn listar_transacoes(
        &mut self,
        clinica_id: Uuid,
        filtro: &FiltroTransacoes,
    ) -> Result<Vec<Transacao>, AppError> {
        self.finance.list_transactions(&mut *self.tx, clinica_id, filtro).await
    }

    async fn listar_parcelas(&mut self, transacao_id: Uuid) -> Result<Vec<Parcela>, AppError> {
        self.finance.list_installments(&mut *self.tx, transacao_id).await
    }

    async fn buscar_parcela(&mut self, clinica_id: Uuid, id: Uuid) -> Result<Option<Parcela>, AppError> {
        self.finance.find_installment(&mut *self.tx, clinica_id, id).await
    }

    async fn atualizar_parcela(
        &mut self,
        id: Uuid,
        status: StatusTransacao,
        data_pagamento: Option<NaiveDate>,
        conta_bancaria_id: Option<Uuid>,
    ) -> Result<Parcela, AppError> {
        self.finance
            .update_installment(&mut *self.tx, id, status, data_pagamento, conta_bancaria_id)
            .await
    }

    async fn atualizar_status_transacao(
        &mut self,
        id: Uuid,
        status: StatusTransacao,
    ) -> Result<Transacao, AppError> {
        self.finance
            .update_transaction_status(&mut *self.tx, id, status)
            .await
    }

    // --- Pacientes ---

    async fn inserir_paciente(&mut self, clinica_id: Uuid, dados: &DadosPaciente) -> Result<Paciente, AppError> {
        self.pacientes.create_paciente(&mut *self.tx, clinica_id, dados).await
    }

    async fn listar_pacientes(
        &mut self,
        clinica_id: Uuid,
        busca: Option<&str>,
    ) -> Result<Vec<Paciente>, AppError> {
        self.pacientes.list_pacientes(&mut *self.tx, clinica_id, busca).await
    }

    async fn buscar_paciente(&mut self, clinica_id: Uuid, id: Uuid) -> Result<Option<Paciente>, AppError> {
        self.pacientes.find_paciente(&mut *self.tx, clinica_id, id).await
    }

    async fn atualizar_paciente(
        &mut self,
        clinica_id: Uuid,
        id: Uuid,
        dados: &DadosPaciente,
    ) -> Result<Option<Paciente>, AppError> {
        self.pacientes
            .update_paciente(&mut *self.tx, clinica_id, id, dados)
            .await
    }

    async fn desativar_paciente(&mut self, clinica_id: Uuid, id: Uuid) -> Result<Option<Paciente>, AppError> {
        self.pacientes.deactivate_paciente(&mut *self.tx, clinica_id, id).await
    }
}
