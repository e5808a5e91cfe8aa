// src/db/memory.rs
//
// Implementação em memória dos contratos de dados, usada pelos testes.
// Cada unidade de trabalho segura o lock do estado inteiro e trabalha numa
// cópia; o commit substitui o estado. Sem commit, nada muda.

use std::collections::HashSet;
use std::sync::{Arc, Mutex as StdMutex};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::{
    common::{error::AppError, texto::normalizar_email},
    db::store::{Datastore, IdentityProvider, UnitOfWork},
    models::{
        auth::Identidade,
        clinica::{AtualizarClinica, Clinica, NovaClinica, NovoUsuario, Papel, Usuario},
        convite::{Convite, ConviteFundador, StatusConvite},
        finance::{
            ContaBancaria, FiltroTransacoes, NovaContaBancaria, NovaParcela, NovaTransacao,
            Parcela, StatusTransacao, Transacao,
        },
        paciente::{DadosPaciente, Paciente},
    },
};

#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    pub clinicas: Vec<Clinica>,
    pub usuarios: Vec<Usuario>,
    pub convites_fundador: Vec<ConviteFundador>,
    pub convites: Vec<Convite>,
    pub contas: Vec<ContaBancaria>,
    pub transacoes: Vec<Transacao>,
    pub parcelas: Vec<Parcela>,
    pub pacientes: Vec<Paciente>,
}

fn falha_simulada(operacao: &str) -> AppError {
    AppError::InternalServerError(anyhow!("falha simulada em {operacao}"))
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    estado: Arc<Mutex<MemoryState>>,
    falhas: Arc<StdMutex<HashSet<&'static str>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Faz a operação com esse nome falhar em todas as próximas unidades.
    pub fn falhar_em(&self, operacao: &'static str) {
        self.falhas.lock().unwrap().insert(operacao);
    }

    pub async fn snapshot(&self) -> MemoryState {
        self.estado.lock().await.clone()
    }

    /// Altera o estado diretamente (preparação de cenários).
    pub async fn alterar(&self, f: impl FnOnce(&mut MemoryState)) {
        let mut estado = self.estado.lock().await;
        f(&mut estado);
    }
}

#[async_trait]
impl Datastore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, AppError> {
        let guard = self.estado.clone().lock_owned().await;
        let working = guard.clone();
        let falhas = self.falhas.lock().unwrap().clone();
        Ok(Box::new(MemoryUnitOfWork { guard, working, falhas }))
    }
}

pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
    falhas: HashSet<&'static str>,
}

impl MemoryUnitOfWork {
    fn checar(&self, operacao: &'static str) -> Result<(), AppError> {
        if self.falhas.contains(operacao) {
            return Err(falha_simulada(operacao));
        }
        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        self.checar("commit")?;
        let MemoryUnitOfWork { mut guard, working, .. } = *self;
        *guard = working;
        Ok(())
    }

    // --- Clínicas ---

    async fn inserir_clinica(&mut self, nova: &NovaClinica) -> Result<Clinica, AppError> {
        self.checar("inserir_clinica")?;
        if self.working.clinicas.iter().any(|c| c.slug == nova.slug) {
            return Err(AppError::UniqueConstraintViolation("clinicas_slug_key".into()));
        }
        let agora = Utc::now();
        let clinica = Clinica {
            id: Uuid::new_v4(),
            nome: nova.nome.clone(),
            slug: nova.slug.clone(),
            email: nova.email.clone(),
            telefone: nova.telefone.clone(),
            endereco: None,
            cidade: None,
            estado: None,
            cep: None,
            created_at: agora,
            updated_at: agora,
        };
        self.working.clinicas.push(clinica.clone());
        Ok(clinica)
    }

    async fn buscar_clinica(&mut self, id: Uuid) -> Result<Option<Clinica>, AppError> {
        Ok(self.working.clinicas.iter().find(|c| c.id == id).cloned())
    }

    async fn travar_clinica(&mut self, _id: Uuid) -> Result<(), AppError> {
        // A unidade de trabalho já é exclusiva; só registra o ponto de falha
        self.checar("travar_clinica")
    }

    async fn slugs_com_prefixo(&mut self, base: &str) -> Result<Vec<String>, AppError> {
        let prefixo = format!("{base}-");
        Ok(self
            .working
            .clinicas
            .iter()
            .filter(|c| c.slug == base || c.slug.starts_with(&prefixo))
            .map(|c| c.slug.clone())
            .collect())
    }

    async fn atualizar_clinica(
        &mut self,
        id: Uuid,
        dados: &AtualizarClinica,
    ) -> Result<Option<Clinica>, AppError> {
        let Some(clinica) = self.working.clinicas.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        let substituir = |atual: &mut Option<String>, novo: &Option<String>| {
            if novo.is_some() {
                *atual = novo.clone();
            }
        };
        if let Some(nome) = &dados.nome {
            clinica.nome = nome.clone();
        }
        substituir(&mut clinica.email, &dados.email);
        substituir(&mut clinica.telefone, &dados.telefone);
        substituir(&mut clinica.endereco, &dados.endereco);
        substituir(&mut clinica.cidade, &dados.cidade);
        substituir(&mut clinica.estado, &dados.estado);
        substituir(&mut clinica.cep, &dados.cep);
        clinica.updated_at = Utc::now();
        Ok(Some(clinica.clone()))
    }

    // --- Usuários ---

    async fn inserir_usuario(&mut self, novo: &NovoUsuario) -> Result<Usuario, AppError> {
        self.checar("inserir_usuario")?;
        if self
            .working
            .usuarios
            .iter()
            .any(|u| u.auth_usuario_id == novo.auth_usuario_id)
        {
            return Err(AppError::UsuarioJaVinculado);
        }
        let agora = Utc::now();
        let usuario = Usuario {
            id: Uuid::new_v4(),
            auth_usuario_id: novo.auth_usuario_id,
            clinica_id: novo.clinica_id,
            nome: novo.nome.clone(),
            email: novo.email.clone(),
            papel: novo.papel,
            ativo: true,
            created_at: agora,
            updated_at: agora,
        };
        self.working.usuarios.push(usuario.clone());
        Ok(usuario)
    }

    async fn buscar_usuario_por_auth(&mut self, auth_usuario_id: Uuid) -> Result<Option<Usuario>, AppError> {
        Ok(self
            .working
            .usuarios
            .iter()
            .find(|u| u.auth_usuario_id == auth_usuario_id)
            .cloned())
    }

    async fn buscar_usuario(&mut self, clinica_id: Uuid, id: Uuid) -> Result<Option<Usuario>, AppError> {
        Ok(self
            .working
            .usuarios
            .iter()
            .find(|u| u.clinica_id == clinica_id && u.id == id)
            .cloned())
    }

    async fn listar_usuarios(&mut self, clinica_id: Uuid) -> Result<Vec<Usuario>, AppError> {
        let mut usuarios: Vec<Usuario> = self
            .working
            .usuarios
            .iter()
            .filter(|u| u.clinica_id == clinica_id)
            .cloned()
            .collect();
        usuarios.sort_by(|a, b| a.nome.cmp(&b.nome));
        Ok(usuarios)
    }

    async fn atualizar_papel(
        &mut self,
        clinica_id: Uuid,
        id: Uuid,
        papel: Papel,
    ) -> Result<Option<Usuario>, AppError> {
        let usuario = self
            .working
            .usuarios
            .iter_mut()
            .find(|u| u.clinica_id == clinica_id && u.id == id);
        Ok(usuario.map(|u| {
            u.papel = papel;
            u.updated_at = Utc::now();
            u.clone()
        }))
    }

    async fn desativar_usuario(&mut self, clinica_id: Uuid, id: Uuid) -> Result<Option<Usuario>, AppError> {
        let usuario = self
            .working
            .usuarios
            .iter_mut()
            .find(|u| u.clinica_id == clinica_id && u.id == id);
        Ok(usuario.map(|u| {
            u.ativo = false;
            u.updated_at = Utc::now();
            u.clone()
        }))
    }

    async fn contar_admins_ativos(&mut self, clinica_id: Uuid) -> Result<i64, AppError> {
        Ok(self
            .working
            .usuarios
            .iter()
            .filter(|u| u.clinica_id == clinica_id && u.papel == Papel::Admin && u.ativo)
            .count() as i64)
    }

    // --- Convites de fundador ---

    async fn criar_convite_fundador(
        &mut self,
        email: &str,
        data_expiracao: DateTime<Utc>,
        criado_por: Option<Uuid>,
    ) -> Result<Uuid, AppError> {
        self.checar("criar_convite_fundador")?;
        let agora = Utc::now();
        let email = normalizar_email(email);

        // Mesmo comportamento do procedimento: pendências vencidas viram 'expirado'
        for convite in self.working.convites_fundador.iter_mut() {
            if convite.email == email
                && convite.status == StatusConvite::Pendente
                && convite.data_expiracao <= agora
            {
                convite.status = StatusConvite::Expirado;
            }
        }
        if self
            .working
            .convites_fundador
            .iter()
            .any(|c| c.email == email && c.status == StatusConvite::Pendente)
        {
            return Err(AppError::ConvitePendenteExistente);
        }

        let convite = ConviteFundador {
            id: Uuid::new_v4(),
            email,
            token: Uuid::new_v4(),
            status: StatusConvite::Pendente,
            data_expiracao,
            clinica_criada_id: None,
            aceito_em: None,
            criado_por,
            created_at: agora,
        };
        let id = convite.id;
        self.working.convites_fundador.push(convite);
        Ok(id)
    }

    async fn buscar_convite_fundador(&mut self, id: Uuid) -> Result<Option<ConviteFundador>, AppError> {
        Ok(self.working.convites_fundador.iter().find(|c| c.id == id).cloned())
    }

    async fn buscar_convite_fundador_por_token(
        &mut self,
        token: Uuid,
        _bloquear: bool,
    ) -> Result<Option<ConviteFundador>, AppError> {
        Ok(self
            .working
            .convites_fundador
            .iter()
            .find(|c| c.token == token)
            .cloned())
    }

    async fn listar_convites_fundador(&mut self) -> Result<Vec<ConviteFundador>, AppError> {
        Ok(self.working.convites_fundador.clone())
    }

    async fn marcar_convite_fundador_aceito(
        &mut self,
        id: Uuid,
        clinica_id: Uuid,
        aceito_em: DateTime<Utc>,
    ) -> Result<ConviteFundador, AppError> {
        self.checar("marcar_convite_fundador_aceito")?;
        let convite = self
            .working
            .convites_fundador
            .iter_mut()
            .find(|c| c.id == id && c.status == StatusConvite::Pendente)
            .ok_or(AppError::ConviteInvalido)?;
        convite.status = StatusConvite::Aceito;
        convite.clinica_criada_id = Some(clinica_id);
        convite.aceito_em = Some(aceito_em);
        Ok(convite.clone())
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
        self.checar("criar_convite")?;
        let agora = Utc::now();
        let email = normalizar_email(email);

        for convite in self.working.convites.iter_mut() {
            if convite.clinica_id == clinica_id
                && convite.email == email
                && convite.status == StatusConvite::Pendente
                && convite.data_expiracao <= agora
            {
                convite.status = StatusConvite::Expirado;
            }
        }
        if self.working.convites.iter().any(|c| {
            c.clinica_id == clinica_id && c.email == email && c.status == StatusConvite::Pendente
        }) {
            return Err(AppError::ConvitePendenteExistente);
        }

        let convite = Convite {
            id: Uuid::new_v4(),
            clinica_id,
            email,
            papel,
            token: Uuid::new_v4(),
            status: StatusConvite::Pendente,
            data_expiracao,
            convidado_por,
            usuario_criado_id: None,
            aceito_em: None,
            created_at: agora,
        };
        let id = convite.id;
        self.working.convites.push(convite);
        Ok(id)
    }

    async fn buscar_convite(
        &mut self,
        clinica_id: Uuid,
        id: Uuid,
        _bloquear: bool,
    ) -> Result<Option<Convite>, AppError> {
        Ok(self
            .working
            .convites
            .iter()
            .find(|c| c.clinica_id == clinica_id && c.id == id)
            .cloned())
    }

    async fn buscar_convite_por_token(&mut self, token: Uuid, _bloquear: bool) -> Result<Option<Convite>, AppError> {
        Ok(self.working.convites.iter().find(|c| c.token == token).cloned())
    }

    async fn listar_convites(&mut self, clinica_id: Uuid) -> Result<Vec<Convite>, AppError> {
        Ok(self
            .working
            .convites
            .iter()
            .filter(|c| c.clinica_id == clinica_id)
            .cloned()
            .collect())
    }

    async fn renovar_convite(&mut self, id: Uuid, data_expiracao: DateTime<Utc>) -> Result<Convite, AppError> {
        let convite = self
            .working
            .convites
            .iter_mut()
            .find(|c| c.id == id && c.status == StatusConvite::Pendente)
            .ok_or(AppError::ConviteInvalido)?;
        convite.data_expiracao = data_expiracao;
        Ok(convite.clone())
    }

    async fn marcar_convite_aceito(
        &mut self,
        id: Uuid,
        usuario_id: Uuid,
        aceito_em: DateTime<Utc>,
    ) -> Result<Convite, AppError> {
        let convite = self
            .working
            .convites
            .iter_mut()
            .find(|c| c.id == id && c.status == StatusConvite::Pendente)
            .ok_or(AppError::ConviteInvalido)?;
        convite.status = StatusConvite::Aceito;
        convite.usuario_criado_id = Some(usuario_id);
        convite.aceito_em = Some(aceito_em);
        Ok(convite.clone())
    }

    async fn marcar_convite_expirado(&mut self, id: Uuid) -> Result<Convite, AppError> {
        let convite = self
            .working
            .convites
            .iter_mut()
            .find(|c| c.id == id && c.status == StatusConvite::Pendente)
            .ok_or(AppError::ConviteInvalido)?;
        convite.status = StatusConvite::Expirado;
        Ok(convite.clone())
    }

    // --- Contas bancárias ---

    async fn inserir_conta_bancaria(&mut self, nova: &NovaContaBancaria) -> Result<ContaBancaria, AppError> {
        let conta = ContaBancaria {
            id: Uuid::new_v4(),
            clinica_id: nova.clinica_id,
            nome: nova.nome.clone(),
            banco: nova.banco.clone(),
            saldo: nova.saldo_inicial,
            ativo: true,
            created_at: Utc::now(),
        };
        self.working.contas.push(conta.clone());
        Ok(conta)
    }

    async fn listar_contas_bancarias(&mut self, clinica_id: Uuid) -> Result<Vec<ContaBancaria>, AppError> {
        Ok(self
            .working
            .contas
            .iter()
            .filter(|c| c.clinica_id == clinica_id)
            .cloned()
            .collect())
    }

    async fn buscar_conta_bancaria(
        &mut self,
        clinica_id: Uuid,
        id: Uuid,
    ) -> Result<Option<ContaBancaria>, AppError> {
        Ok(self
            .working
            .contas
            .iter()
            .find(|c| c.clinica_id == clinica_id && c.id == id)
            .cloned())
    }

    async fn debitar_saldo(&mut self, conta_id: Uuid, valor: Decimal) -> Result<Decimal, AppError> {
        self.checar("debitar_saldo")?;
        let conta = self
            .working
            .contas
            .iter_mut()
            .find(|c| c.id == conta_id)
            .ok_or_else(|| AppError::ResourceNotFound(format!("Conta bancária {conta_id}")))?;
        conta.saldo -= valor;
        Ok(conta.saldo)
    }

    // --- Transações e parcelas ---

    async fn inserir_transacao(&mut self, nova: &NovaTransacao) -> Result<Transacao, AppError> {
        let agora = Utc::now();
        let transacao = Transacao {
            id: Uuid::new_v4(),
            clinica_id: nova.clinica_id,
            tipo: nova.tipo,
            descricao: nova.descricao.clone(),
            valor_bruto: nova.valor_bruto,
            valor_liquido: nova.valor_liquido,
            status: StatusTransacao::Pendente,
            total_parcelas: nova.total_parcelas,
            metodo_pagamento: nova.metodo_pagamento,
            paciente_id: nova.paciente_id,
            conta_bancaria_id: nova.conta_bancaria_id,
            created_at: agora,
            updated_at: agora,
        };
        self.working.transacoes.push(transacao.clone());
        Ok(transacao)
    }

    async fn inserir_parcela(&mut self, nova: &NovaParcela) -> Result<Parcela, AppError> {
        self.checar("inserir_parcela")?;
        let parcela = Parcela {
            id: Uuid::new_v4(),
            transacao_id: nova.transacao_id,
            numero_parcela: nova.numero_parcela,
            valor: nova.valor,
            status: StatusTransacao::Pendente,
            data_vencimento: nova.data_vencimento,
            data_pagamento: None,
            conta_bancaria_id: None,
        };
        self.working.parcelas.push(parcela.clone());
        Ok(parcela)
    }

    async fn buscar_transacao(
        &mut self,
        clinica_id: Uuid,
        id: Uuid,
        _bloquear: bool,
    ) -> Result<Option<Transacao>, AppError> {
        Ok(self
            .working
            .transacoes
            .iter()
            .find(|t| t.clinica_id == clinica_id && t.id == id)
            .cloned())
    }

    async fn listar_transacoes(
        &mut self,
        clinica_id: Uuid,
        filtro: &FiltroTransacoes,
    ) -> Result<Vec<Transacao>, AppError> {
        Ok(self
            .working
            .transacoes
            .iter()
            .filter(|t| t.clinica_id == clinica_id)
            .filter(|t| filtro.tipo.is_none_or(|tipo| t.tipo == tipo))
            .filter(|t| filtro.status.is_none_or(|status| t.status == status))
            .cloned()
            .collect())
    }

    async fn listar_parcelas(&mut self, transacao_id: Uuid) -> Result<Vec<Parcela>, AppError> {
        let mut parcelas: Vec<Parcela> = self
            .working
            .parcelas
            .iter()
            .filter(|p| p.transacao_id == transacao_id)
            .cloned()
            .collect();
        parcelas.sort_by_key(|p| p.numero_parcela);
        Ok(parcelas)
    }

    async fn buscar_parcela(&mut self, clinica_id: Uuid, id: Uuid) -> Result<Option<Parcela>, AppError> {
        let parcela = self.working.parcelas.iter().find(|p| p.id == id);
        Ok(parcela
            .filter(|p| {
                self.working
                    .transacoes
                    .iter()
                    .any(|t| t.id == p.transacao_id && t.clinica_id == clinica_id)
            })
            .cloned())
    }

    async fn atualizar_parcela(
        &mut self,
        id: Uuid,
        status: StatusTransacao,
        data_pagamento: Option<NaiveDate>,
        conta_bancaria_id: Option<Uuid>,
    ) -> Result<Parcela, AppError> {
        self.checar("atualizar_parcela")?;
        let parcela = self
            .working
            .parcelas
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::ResourceNotFound(format!("Parcela {id}")))?;
        parcela.status = status;
        parcela.data_pagamento = data_pagamento;
        parcela.conta_bancaria_id = conta_bancaria_id;
        Ok(parcela.clone())
    }

    async fn atualizar_status_transacao(
        &mut self,
        id: Uuid,
        status: StatusTransacao,
    ) -> Result<Transacao, AppError> {
        self.checar("atualizar_status_transacao")?;
        let transacao = self
            .working
            .transacoes
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| AppError::ResourceNotFound(format!("Transação {id}")))?;
        transacao.status = status;
        transacao.updated_at = Utc::now();
        Ok(transacao.clone())
    }

    // --- Pacientes ---

    async fn inserir_paciente(&mut self, clinica_id: Uuid, dados: &DadosPaciente) -> Result<Paciente, AppError> {
        if let Some(cpf) = &dados.cpf {
            if self
                .working
                .pacientes
                .iter()
                .any(|p| p.clinica_id == clinica_id && p.cpf.as_ref() == Some(cpf))
            {
                return Err(AppError::UniqueConstraintViolation(
                    "Já existe um paciente com este CPF.".into(),
                ));
            }
        }
        let agora = Utc::now();
        let paciente = Paciente {
            id: Uuid::new_v4(),
            clinica_id,
            nome: dados.nome.clone(),
            cpf: dados.cpf.clone(),
            email: dados.email.clone(),
            telefone: dados.telefone.clone(),
            data_nascimento: dados.data_nascimento,
            observacoes: dados.observacoes.clone(),
            ativo: true,
            created_at: agora,
            updated_at: agora,
        };
        self.working.pacientes.push(paciente.clone());
        Ok(paciente)
    }

    async fn listar_pacientes(
        &mut self,
        clinica_id: Uuid,
        busca: Option<&str>,
    ) -> Result<Vec<Paciente>, AppError> {
        let busca = busca.map(|b| b.to_lowercase());
        let mut pacientes: Vec<Paciente> = self
            .working
            .pacientes
            .iter()
            .filter(|p| p.clinica_id == clinica_id && p.ativo)
            .filter(|p| match &busca {
                Some(b) => {
                    p.nome.to_lowercase().contains(b)
                        || p.cpf.as_deref().is_some_and(|cpf| cpf.contains(b.as_str()))
                }
                None => true,
            })
            .cloned()
            .collect();
        pacientes.sort_by(|a, b| a.nome.cmp(&b.nome));
        Ok(pacientes)
    }

    async fn buscar_paciente(&mut self, clinica_id: Uuid, id: Uuid) -> Result<Option<Paciente>, AppError> {
        Ok(self
            .working
            .pacientes
            .iter()
            .find(|p| p.clinica_id == clinica_id && p.id == id)
            .cloned())
    }

    async fn atualizar_paciente(
        &mut self,
        clinica_id: Uuid,
        id: Uuid,
        dados: &DadosPaciente,
    ) -> Result<Option<Paciente>, AppError> {
        let paciente = self
            .working
            .pacientes
            .iter_mut()
            .find(|p| p.clinica_id == clinica_id && p.id == id);
        Ok(paciente.map(|p| {
            p.nome = dados.nome.clone();
            p.cpf = dados.cpf.clone();
            p.email = dados.email.clone();
            p.telefone = dados.telefone.clone();
            p.data_nascimento = dados.data_nascimento;
            p.observacoes = dados.observacoes.clone();
            p.updated_at = Utc::now();
            p.clone()
        }))
    }

    async fn desativar_paciente(&mut self, clinica_id: Uuid, id: Uuid) -> Result<Option<Paciente>, AppError> {
        let paciente = self
            .working
            .pacientes
            .iter_mut()
            .find(|p| p.clinica_id == clinica_id && p.id == id);
        Ok(paciente.map(|p| {
            p.ativo = false;
            p.updated_at = Utc::now();
            p.clone()
        }))
    }
}

// ---
// Provedor de identidades em memória
// ---

#[derive(Clone, Default)]
pub struct MemoryIdentityProvider {
    identidades: Arc<StdMutex<Vec<Identidade>>>,
}

impl MemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> usize {
        self.identidades.lock().unwrap().len()
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn criar_identidade(&self, nome: &str, email: &str, senha: &str) -> Result<Identidade, AppError> {
        let email = normalizar_email(email);
        let mut identidades = self.identidades.lock().unwrap();
        if identidades.iter().any(|i| i.email == email) {
            return Err(AppError::EmailAlreadyExists);
        }
        let identidade = Identidade {
            id: Uuid::new_v4(),
            nome: nome.to_string(),
            email,
            password_hash: format!("plain:{senha}"),
            created_at: Utc::now(),
        };
        identidades.push(identidade.clone());
        Ok(identidade)
    }

    async fn remover_identidade(&self, id: Uuid) -> Result<(), AppError> {
        self.identidades.lock().unwrap().retain(|i| i.id != id);
        Ok(())
    }

    async fn autenticar(&self, email: &str, senha: &str) -> Result<Identidade, AppError> {
        let email = normalizar_email(email);
        let esperado = format!("plain:{senha}");
        self.identidades
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.email == email && i.password_hash == esperado)
            .cloned()
            .ok_or(AppError::InvalidCredentials)
    }

    async fn buscar_identidade(&self, id: Uuid) -> Result<Option<Identidade>, AppError> {
        Ok(self.identidades.lock().unwrap().iter().find(|i| i.id == id).cloned())
    }

    async fn listar_identidades(&self) -> Result<Vec<Identidade>, AppError> {
        Ok(self.identidades.lock().unwrap().clone())
    }
}
