// src/db/store.rs
//
// Contratos de acesso a dados. O AppState recebe implementações concretas
// (Postgres em produção, memória nos testes) e os serviços só enxergam estes
// traits.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::Identidade,
        clinica::{AtualizarClinica, Clinica, NovaClinica, NovoUsuario, Papel, Usuario},
        convite::{Convite, ConviteFundador},
        finance::{
            ContaBancaria, FiltroTransacoes, NovaContaBancaria, NovaParcela, NovaTransacao,
            Parcela, StatusTransacao, Transacao,
        },
        paciente::{DadosPaciente, Paciente},
    },
};

/// Fábrica de unidades de trabalho.
#[async_trait]
pub trait Datastore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, AppError>;
}

/// Uma transação ACID. Tudo que for feito aqui só fica visível depois do
/// `commit`; descartar a unidade sem commit desfaz as escritas.
#[async_trait]
pub trait UnitOfWork: Send {
    async fn commit(self: Box<Self>) -> Result<(), AppError>;

    // --- Clínicas ---
    async fn inserir_clinica(&mut self, nova: &NovaClinica) -> Result<Clinica, AppError>;
    async fn buscar_clinica(&mut self, id: Uuid) -> Result<Option<Clinica>, AppError>;
    /// Serializa alterações de papel e desativações dentro da clínica.
    async fn travar_clinica(&mut self, id: Uuid) -> Result<(), AppError>;
    async fn slugs_com_prefixo(&mut self, base: &str) -> Result<Vec<String>, AppError>;
    async fn atualizar_clinica(
        &mut self,
        id: Uuid,
        dados: &AtualizarClinica,
    ) -> Result<Option<Clinica>, AppError>;

    // --- Usuários ---
    async fn inserir_usuario(&mut self, novo: &NovoUsuario) -> Result<Usuario, AppError>;
    async fn buscar_usuario_por_auth(
        &mut self,
        auth_usuario_id: Uuid,
    ) -> Result<Option<Usuario>, AppError>;
    async fn buscar_usuario(
        &mut self,
        clinica_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Usuario>, AppError>;
    async fn listar_usuarios(&mut self, clinica_id: Uuid) -> Result<Vec<Usuario>, AppError>;
    async fn atualizar_papel(
        &mut self,
        clinica_id: Uuid,
        id: Uuid,
        papel: Papel,
    ) -> Result<Option<Usuario>, AppError>;
    async fn desativar_usuario(
        &mut self,
        clinica_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Usuario>, AppError>;
    async fn contar_admins_ativos(&mut self, clinica_id: Uuid) -> Result<i64, AppError>;

    // --- Convites de fundador ---
    /// Procedimento `criar_convite_fundador`: devolve o ID do convite criado.
    async fn criar_convite_fundador(
        &mut self,
        email: &str,
        data_expiracao: DateTime<Utc>,
        criado_por: Option<Uuid>,
    ) -> Result<Uuid, AppError>;
    async fn buscar_convite_fundador(
        &mut self,
        id: Uuid,
    ) -> Result<Option<ConviteFundador>, AppError>;
    /// Com `bloquear = true` a linha fica travada até o fim da unidade.
    async fn buscar_convite_fundador_por_token(
        &mut self,
        token: Uuid,
        bloquear: bool,
    ) -> Result<Option<ConviteFundador>, AppError>;
    async fn listar_convites_fundador(&mut self) -> Result<Vec<ConviteFundador>, AppError>;
    async fn marcar_convite_fundador_aceito(
        &mut self,
        id: Uuid,
        clinica_id: Uuid,
        aceito_em: DateTime<Utc>,
    ) -> Result<ConviteFundador, AppError>;

    // --- Convites de equipe ---
    /// Procedimento `criar_convite`: devolve o ID do convite criado.
    async fn criar_convite(
        &mut self,
        clinica_id: Uuid,
        email: &str,
        papel: Papel,
        data_expiracao: DateTime<Utc>,
        convidado_por: Option<Uuid>,
    ) -> Result<Uuid, AppError>;
    /// `bloquear` trava a linha até o fim da unidade de trabalho.
    async fn buscar_convite(
        &mut self,
        clinica_id: Uuid,
        id: Uuid,
        bloquear: bool,
    ) -> Result<Option<Convite>, AppError>;
    async fn buscar_convite_por_token(
        &mut self,
        token: Uuid,
        bloquear: bool,
    ) -> Result<Option<Convite>, AppError>;
    async fn listar_convites(&mut self, clinica_id: Uuid) -> Result<Vec<Convite>, AppError>;
    async fn renovar_convite(
        &mut self,
        id: Uuid,
        data_expiracao: DateTime<Utc>,
    ) -> Result<Convite, AppError>;
    async fn marcar_convite_aceito(
        &mut self,
        id: Uuid,
        usuario_id: Uuid,
        aceito_em: DateTime<Utc>,
    ) -> Result<Convite, AppError>;
    async fn marcar_convite_expirado(&mut self, id: Uuid) -> Result<Convite, AppError>;

    // --- Contas bancárias ---
    async fn inserir_conta_bancaria(
        &mut self,
        nova: &NovaContaBancaria,
    ) -> Result<ContaBancaria, AppError>;
    async fn listar_contas_bancarias(
        &mut self,
        clinica_id: Uuid,
    ) -> Result<Vec<ContaBancaria>, AppError>;
    async fn buscar_conta_bancaria(
        &mut self,
        clinica_id: Uuid,
        id: Uuid,
    ) -> Result<Option<ContaBancaria>, AppError>;
    /// Procedimento `debitar_saldo`: valor positivo debita, negativo credita.
    async fn debitar_saldo(&mut self, conta_id: Uuid, valor: Decimal) -> Result<Decimal, AppError>;

    // --- Transações e parcelas ---
    async fn inserir_transacao(&mut self, nova: &NovaTransacao) -> Result<Transacao, AppError>;
    async fn inserir_parcela(&mut self, nova: &NovaParcela) -> Result<Parcela, AppError>;
    async fn buscar_transacao(
        &mut self,
        clinica_id: Uuid,
        id: Uuid,
        bloquear: bool,
    ) -> Result<Option<Transacao>, AppError>;
    async fn listar_transacoes(
        &mut self,
        clinica_id: Uuid,
        filtro: &FiltroTransacoes,
    ) -> Result<Vec<Transacao>, AppError>;
    async fn listar_parcelas(&mut self, transacao_id: Uuid) -> Result<Vec<Parcela>, AppError>;
    async fn buscar_parcela(
        &mut self,
        clinica_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Parcela>, AppError>;
    async fn atualizar_parcela(
        &mut self,
        id: Uuid,
        status: StatusTransacao,
        data_pagamento: Option<NaiveDate>,
        conta_bancaria_id: Option<Uuid>,
    ) -> Result<Parcela, AppError>;
    async fn atualizar_status_transacao(
        &mut self,
        id: Uuid,
        status: StatusTransacao,
    ) -> Result<Transacao, AppError>;

    // --- Pacientes ---
    async fn inserir_paciente(
        &mut self,
        clinica_id: Uuid,
        dados: &DadosPaciente,
    ) -> Result<Paciente, AppError>;
    async fn listar_pacientes(
        &mut self,
        clinica_id: Uuid,
        busca: Option<&str>,
    ) -> Result<Vec<Paciente>, AppError>;
    async fn buscar_paciente(
        &mut self,
        clinica_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Paciente>, AppError>;
    async fn atualizar_paciente(
        &mut self,
        clinica_id: Uuid,
        id: Uuid,
        dados: &DadosPaciente,
    ) -> Result<Option<Paciente>, AppError>;
    async fn desativar_paciente(
        &mut self,
        clinica_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Paciente>, AppError>;
}

/// Provedor de identidades (contas de login). Fica fora da unidade de
/// trabalho: cada chamada é confirmada imediatamente.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn criar_identidade(
        &self,
        nome: &str,
        email: &str,
        senha: &str,
    ) -> Result<Identidade, AppError>;
    async fn remover_identidade(&self, id: Uuid) -> Result<(), AppError>;
    async fn autenticar(&self, email: &str, senha: &str) -> Result<Identidade, AppError>;
    async fn buscar_identidade(&self, id: Uuid) -> Result<Option<Identidade>, AppError>;
    async fn listar_identidades(&self) -> Result<Vec<Identidade>, AppError>;
}
