// src/services/paciente_service.rs

use std::sync::Arc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::Datastore,
    models::paciente::{DadosPaciente, Paciente},
};

#[derive(Clone)]
pub struct PacienteService {
    datastore: Arc<dyn Datastore>,
}

fn nao_encontrado(id: Uuid) -> AppError {
    AppError::ResourceNotFound(format!("Paciente {id}"))
}

// CPF gravado só com dígitos
fn normalizar(dados: &DadosPaciente) -> DadosPaciente {
    let mut dados = dados.clone();
    dados.nome = dados.nome.trim().to_string();
    dados.cpf = dados
        .cpf
        .as_deref()
        .map(|cpf| cpf.chars().filter(char::is_ascii_digit).collect::<String>())
        .filter(|cpf| !cpf.is_empty());
    dados.email = dados.email.as_deref().map(crate::common::texto::normalizar_email);
    dados
}

impl PacienteService {
    pub fn new(datastore: Arc<dyn Datastore>) -> Self {
        Self { datastore }
    }

    pub async fn criar(&self, clinica_id: Uuid, dados: &DadosPaciente) -> Result<Paciente, AppError> {
        let mut uow = self.datastore.begin().await?;
        let paciente = uow.inserir_paciente(clinica_id, &normalizar(dados)).await?;
        uow.commit().await?;
        tracing::info!(paciente_id = %paciente.id, "🦷 Paciente cadastrado");
        Ok(paciente)
    }

    pub async fn listar(&self, clinica_id: Uuid, busca: Option<&str>) -> Result<Vec<Paciente>, AppError> {
        let busca = busca.map(str::trim).filter(|b| !b.is_empty());
        let mut uow = self.datastore.begin().await?;
        uow.listar_pacientes(clinica_id, busca).await
    }

    pub async fn obter(&self, clinica_id: Uuid, id: Uuid) -> Result<Paciente, AppError> {
        let mut uow = self.datastore.begin().await?;
        uow.buscar_paciente(clinica_id, id)
            .await?
            .ok_or_else(|| nao_encontrado(id))
    }

    pub async fn atualizar(
        &self,
        clinica_id: Uuid,
        id: Uuid,
        dados: &DadosPaciente,
    ) -> Result<Paciente, AppError> {
        let mut uow = self.datastore.begin().await?;
        let paciente = uow
            .atualizar_paciente(clinica_id, id, &normalizar(dados))
            .await?
            .ok_or_else(|| nao_encontrado(id))?;
        uow.commit().await?;
        Ok(paciente)
    }

    pub async fn desativar(&self, clinica_id: Uuid, id: Uuid) -> Result<Paciente, AppError> {
        let mut uow = self.datastore.begin().await?;
        let paciente = uow
            .desativar_paciente(clinica_id, id)
            .await?
            .ok_or_else(|| nao_encontrado(id))?;
        uow.commit().await?;
        Ok(paciente)
    }
}
