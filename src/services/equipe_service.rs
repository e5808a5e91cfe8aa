// src/services/equipe_service.rs

use std::sync::Arc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{Datastore, UnitOfWork},
    models::clinica::{Papel, PerfilUsuario, Usuario},
};

#[derive(Clone)]
pub struct EquipeService {
    datastore: Arc<dyn Datastore>,
}

// Um admin ativo deixa de contar como admin (rebaixado ou desativado).
// Não pode ser o último da clínica.
async fn garantir_outro_admin(uow: &mut dyn UnitOfWork, alvo: &Usuario) -> Result<(), AppError> {
    if alvo.papel == Papel::Admin && alvo.ativo && uow.contar_admins_ativos(alvo.clinica_id).await? <= 1 {
        return Err(AppError::RegraNegocio(
            "A clínica precisa de pelo menos um administrador ativo.".into(),
        ));
    }
    Ok(())
}

impl EquipeService {
    pub fn new(datastore: Arc<dyn Datastore>) -> Self {
        Self { datastore }
    }

    /// Usuário ativo ligado à identidade; sem ele não há acesso à clínica.
    pub async fn usuario_ativo(&self, auth_usuario_id: Uuid) -> Result<Usuario, AppError> {
        let mut uow = self.datastore.begin().await?;
        match uow.buscar_usuario_por_auth(auth_usuario_id).await? {
            Some(usuario) if usuario.ativo => Ok(usuario),
            Some(_) => Err(AppError::Forbidden("Usuário desativado.".into())),
            None => Err(AppError::Forbidden(
                "Esta conta ainda não pertence a nenhuma clínica.".into(),
            )),
        }
    }

    pub async fn perfil(&self, usuario: &Usuario) -> Result<PerfilUsuario, AppError> {
        let mut uow = self.datastore.begin().await?;
        let clinica = uow
            .buscar_clinica(usuario.clinica_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Clínica".into()))?;
        Ok(PerfilUsuario { usuario: usuario.clone(), clinica })
    }

    pub async fn listar(&self, clinica_id: Uuid) -> Result<Vec<Usuario>, AppError> {
        let mut uow = self.datastore.begin().await?;
        uow.listar_usuarios(clinica_id).await
    }

    async fn alvo(uow: &mut dyn UnitOfWork, ator: &Usuario, alvo_id: Uuid) -> Result<Usuario, AppError> {
        if ator.id == alvo_id {
            return Err(AppError::RegraNegocio(
                "Você não pode alterar o seu próprio acesso.".into(),
            ));
        }
        // Trava a clínica antes de ler o alvo e contar admins
        uow.travar_clinica(ator.clinica_id).await?;
        uow.buscar_usuario(ator.clinica_id, alvo_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Usuário {alvo_id}")))
    }

    pub async fn alterar_papel(
        &self,
        ator: &Usuario,
        alvo_id: Uuid,
        papel: Papel,
    ) -> Result<Usuario, AppError> {
        let mut uow = self.datastore.begin().await?;
        let alvo = Self::alvo(&mut *uow, ator, alvo_id).await?;
        if papel != Papel::Admin {
            garantir_outro_admin(&mut *uow, &alvo).await?;
        }

        let usuario = uow
            .atualizar_papel(ator.clinica_id, alvo.id, papel)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Usuário {alvo_id}")))?;
        uow.commit().await?;

        tracing::info!(usuario_id = %usuario.id, papel = papel.as_str(), "👤 Papel alterado");
        Ok(usuario)
    }

    /// Remoção lógica (ativo = false).
    pub async fn desativar(&self, ator: &Usuario, alvo_id: Uuid) -> Result<Usuario, AppError> {
        let mut uow = self.datastore.begin().await?;
        let alvo = Self::alvo(&mut *uow, ator, alvo_id).await?;
        garantir_outro_admin(&mut *uow, &alvo).await?;

        let usuario = uow
            .desativar_usuario(ator.clinica_id, alvo.id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Usuário {alvo_id}")))?;
        uow.commit().await?;

        tracing::info!(usuario_id = %usuario.id, "👤 Usuário desativado");
        Ok(usuario)
    }
}
