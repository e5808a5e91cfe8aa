// src/services/clinica_service.rs

use std::sync::Arc;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        texto::{gerar_slug, proximo_slug_disponivel},
    },
    db::{Datastore, UnitOfWork},
    models::clinica::{AtualizarClinica, Clinica, NovaClinica, NovoUsuario, Papel, Usuario},
};

/// Dados de quem funda uma clínica (registro ou convite de fundador).
pub struct Fundador<'a> {
    pub auth_usuario_id: Uuid,
    pub nome: &'a str,
    pub email: &'a str,
}

/// Cria a clínica (com slug único) e o primeiro usuário admin dentro da
/// unidade de trabalho recebida. Quem chama decide quando fazer o commit.
pub async fn fundar_clinica(
    uow: &mut dyn UnitOfWork,
    nome_clinica: &str,
    email_clinica: Option<String>,
    telefone: Option<String>,
    fundador: Fundador<'_>,
) -> Result<(Clinica, Usuario), AppError> {
    let base = gerar_slug(nome_clinica);
    let existentes = uow.slugs_com_prefixo(&base).await?;
    let slug = proximo_slug_disponivel(&base, &existentes);

    let clinica = uow
        .inserir_clinica(&NovaClinica {
            nome: nome_clinica.trim().to_string(),
            slug,
            email: email_clinica,
            telefone,
        })
        .await?;

    let usuario = uow
        .inserir_usuario(&NovoUsuario {
            auth_usuario_id: fundador.auth_usuario_id,
            clinica_id: clinica.id,
            nome: fundador.nome.trim().to_string(),
            email: fundador.email.to_string(),
            papel: Papel::Admin,
        })
        .await?;

    Ok((clinica, usuario))
}

#[derive(Clone)]
pub struct ClinicaService {
    datastore: Arc<dyn Datastore>,
}

impl ClinicaService {
    pub fn new(datastore: Arc<dyn Datastore>) -> Self {
        Self { datastore }
    }

    pub async fn obter(&self, clinica_id: Uuid) -> Result<Clinica, AppError> {
        let mut uow = self.datastore.begin().await?;
        uow.buscar_clinica(clinica_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Clínica".into()))
    }

    pub async fn atualizar(
        &self,
        clinica_id: Uuid,
        dados: &AtualizarClinica,
    ) -> Result<Clinica, AppError> {
        if dados.nome.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AppError::RegraNegocio("O nome da clínica não pode ficar vazio.".into()));
        }

        let mut uow = self.datastore.begin().await?;
        let clinica = uow
            .atualizar_clinica(clinica_id, dados)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Clínica".into()))?;
        uow.commit().await?;

        tracing::info!(clinica_id = %clinica.id, "🏥 Perfil da clínica atualizado");
        Ok(clinica)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;

    async fn fundar(store: &MemoryStore, nome: &str) -> Clinica {
        let mut uow = store.begin().await.unwrap();
        let (clinica, _) = fundar_clinica(
            &mut *uow,
            nome,
            None,
            None,
            Fundador { auth_usuario_id: Uuid::new_v4(), nome: "Ana", email: "ana@x.com" },
        )
        .await
        .unwrap();
        uow.commit().await.unwrap();
        clinica
    }

    #[tokio::test]
    async fn nomes_repetidos_ganham_sufixo_no_slug() {
        let store = MemoryStore::new();
        assert_eq!(fundar(&store, "Clínica Sorriso").await.slug, "clinica-sorriso");
        assert_eq!(fundar(&store, "Clinica Sorriso").await.slug, "clinica-sorriso-2");
        assert_eq!(fundar(&store, "CLÍNICA SORRISO!").await.slug, "clinica-sorriso-3");
    }

    #[tokio::test]
    async fn atualizacao_parcial_preserva_campos_e_slug() {
        let store = MemoryStore::new();
        let clinica = fundar(&store, "Odonto Vida").await;
        let service = ClinicaService::new(Arc::new(store.clone()));

        let atualizada = service
            .atualizar(
                clinica.id,
                &AtualizarClinica {
                    cidade: Some("Curitiba".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(atualizada.nome, "Odonto Vida");
        assert_eq!(atualizada.slug, "odonto-vida");
        assert_eq!(atualizada.cidade.as_deref(), Some("Curitiba"));
    }

    #[tokio::test]
    async fn nome_vazio_e_rejeitado() {
        let store = MemoryStore::new();
        let clinica = fundar(&store, "Odonto Vida").await;
        let service = ClinicaService::new(Arc::new(store));
        let err = service
            .atualizar(clinica.id, &AtualizarClinica { nome: Some("  ".into()), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RegraNegocio(_)));
    }
}
