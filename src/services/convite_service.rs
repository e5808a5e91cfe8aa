// src/services/convite_service.rs

use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    common::{error::AppError, texto::normalizar_email},
    db::{Datastore, IdentityProvider, UnitOfWork},
    models::{
        auth::Identidade,
        clinica::{NovoUsuario, Papel},
        convite::{
            AceitarConviteFundadorPayload, AceitarConvitePayload, Convite, ConviteAceito,
            ConviteEmitido, ConviteFundador, ConviteValidado, StatusConvite,
        },
    },
    services::{
        clinica_service::{fundar_clinica, Fundador},
        email::{self, EmailMessage, EmailSender},
    },
};

#[derive(Clone)]
pub struct ConviteService {
    datastore: Arc<dyn Datastore>,
    identity: Arc<dyn IdentityProvider>,
    mailer: Arc<dyn EmailSender>,
    app_url: String,
    validade_dias: i64,
}

impl ConviteService {
    pub fn new(
        datastore: Arc<dyn Datastore>,
        identity: Arc<dyn IdentityProvider>,
        mailer: Arc<dyn EmailSender>,
        app_url: String,
        validade_dias: i64,
    ) -> Self {
        Self { datastore, identity, mailer, app_url, validade_dias }
    }

    fn link_fundador(&self, token: Uuid) -> String {
        format!("{}/convite-fundador?token={}", self.app_url, token)
    }

    fn link_equipe(&self, token: Uuid) -> String {
        format!("{}/convite?token={}", self.app_url, token)
    }

    /// Falha no envio não derruba a operação: o convite já existe e o link
    /// volta na resposta.
    async fn enviar(&self, mensagem: EmailMessage) -> bool {
        match self.mailer.send(&mensagem).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(email = %mensagem.to, erro = %e, "🔥 Falha ao enviar e-mail de convite");
                false
            }
        }
    }

    /// O chamador precisa ser a própria identidade que vai aceitar, e ela não
    /// pode já pertencer a uma clínica.
    async fn identidade_aceitante(
        &self,
        uow: &mut dyn UnitOfWork,
        chamador_id: Uuid,
        user_id: Uuid,
    ) -> Result<Identidade, AppError> {
        let identidade = self
            .identity
            .buscar_identidade(user_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("Identidade {user_id}")))?;

        if identidade.id != chamador_id {
            return Err(AppError::Forbidden(
                "O convite só pode ser aceito pela própria pessoa autenticada.".into(),
            ));
        }

        if uow.buscar_usuario_por_auth(identidade.id).await?.is_some() {
            return Err(AppError::UsuarioJaVinculado);
        }
        Ok(identidade)
    }

    // ---
    // Convite de fundador
    // ---

    pub async fn emitir_convite_fundador(
        &self,
        email: &str,
        criado_por: Option<Uuid>,
    ) -> Result<ConviteEmitido, AppError> {
        let email = normalizar_email(email);
        let data_expiracao = Utc::now() + Duration::days(self.validade_dias);

        // 1. Procedimento cria o convite (e o token)
        let mut uow = self.datastore.begin().await?;
        let convite_id = uow
            .criar_convite_fundador(&email, data_expiracao, criado_por)
            .await?;

        // 2. Relê a linha para obter o token gerado
        let convite = uow
            .buscar_convite_fundador(convite_id)
            .await?
            .ok_or(AppError::ConviteNaoEncontrado)?;
        uow.commit().await?;

        tracing::info!(convite_id = %convite.id, email = %convite.email, "✉️ Convite de fundador emitido");

        // 3. E-mail (melhor esforço)
        let invite_url = self.link_fundador(convite.token);
        let email_enviado = self
            .enviar(email::convite_fundador(&convite.email, &invite_url, convite.data_expiracao))
            .await;

        Ok(ConviteEmitido { invite_id: convite.id, invite_url, email_enviado })
    }

    pub async fn listar_convites_fundador(&self) -> Result<Vec<ConviteFundador>, AppError> {
        let mut uow = self.datastore.begin().await?;
        let agora = Utc::now();
        let convites = uow.listar_convites_fundador().await?;
        Ok(convites.into_iter().map(|c| c.com_status_efetivo(agora)).collect())
    }

    pub async fn validar_convite_fundador(&self, token: Uuid) -> Result<ConviteValidado, AppError> {
        let mut uow = self.datastore.begin().await?;
        let convite = uow
            .buscar_convite_fundador_por_token(token, false)
            .await?
            .ok_or(AppError::ConviteNaoEncontrado)?
            .com_status_efetivo(Utc::now());

        Ok(ConviteValidado {
            email: convite.email,
            status: convite.status,
            data_expiracao: convite.data_expiracao,
            clinica_nome: None,
            papel: None,
        })
    }

    /// Onboarding do fundador: clínica, usuário admin e o convite marcado
    /// como aceito, tudo na mesma unidade de trabalho.
    pub async fn aceitar_convite_fundador(
        &self,
        chamador_id: Uuid,
        payload: &AceitarConviteFundadorPayload,
    ) -> Result<ConviteAceito, AppError> {
        let agora = Utc::now();
        let mut uow = self.datastore.begin().await?;

        // 1. Convite travado até o fim da transação
        let convite = uow
            .buscar_convite_fundador_por_token(payload.token, true)
            .await?
            .ok_or(AppError::ConviteNaoEncontrado)?;
        convite.verificar_resgate(agora)?;

        // 2. Quem aceita
        let identidade = self
            .identidade_aceitante(&mut *uow, chamador_id, payload.user_id)
            .await?;

        // 3. Clínica + admin
        let (clinica, usuario) = fundar_clinica(
            &mut *uow,
            &payload.clinica_nome,
            payload.clinica_email.as_deref().map(normalizar_email),
            payload.telefone.clone(),
            Fundador {
                auth_usuario_id: identidade.id,
                nome: &payload.user_name,
                email: &identidade.email,
            },
        )
        .await?;

        // 4. Convite consumido
        uow.marcar_convite_fundador_aceito(convite.id, clinica.id, agora)
            .await?;
        uow.commit().await?;

        tracing::info!(
            convite_id = %convite.id,
            clinica_id = %clinica.id,
            "🎉 Convite de fundador aceito"
        );

        Ok(ConviteAceito { clinica_id: clinica.id, usuario_id: usuario.id })
    }

    // ---
    // Convite de equipe
    // ---

    pub async fn emitir_convite(
        &self,
        clinica_id: Uuid,
        email: &str,
        papel: Papel,
        convidado_por: Uuid,
    ) -> Result<ConviteEmitido, AppError> {
        let email = normalizar_email(email);
        let data_expiracao = Utc::now() + Duration::days(self.validade_dias);

        let mut uow = self.datastore.begin().await?;
        let clinica = uow
            .buscar_clinica(clinica_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Clínica".into()))?;
        let convite_id = uow
            .criar_convite(clinica_id, &email, papel, data_expiracao, Some(convidado_por))
            .await?;
        let convite = uow
            .buscar_convite(clinica_id, convite_id, false)
            .await?
            .ok_or(AppError::ConviteNaoEncontrado)?;
        uow.commit().await?;

        tracing::info!(
            convite_id = %convite.id,
            clinica_id = %clinica_id,
            papel = convite.papel.as_str(),
            "✉️ Convite de equipe emitido"
        );

        let invite_url = self.link_equipe(convite.token);
        let email_enviado = self
            .enviar(email::convite_equipe(
                &convite.email,
                &clinica.nome,
                convite.papel,
                &invite_url,
                convite.data_expiracao,
            ))
            .await;

        Ok(ConviteEmitido { invite_id: convite.id, invite_url, email_enviado })
    }

    pub async fn listar_convites(&self, clinica_id: Uuid) -> Result<Vec<Convite>, AppError> {
        let mut uow = self.datastore.begin().await?;
        let agora = Utc::now();
        let convites = uow.listar_convites(clinica_id).await?;
        Ok(convites.into_iter().map(|c| c.com_status_efetivo(agora)).collect())
    }

    pub async fn validar_convite(&self, token: Uuid) -> Result<ConviteValidado, AppError> {
        let mut uow = self.datastore.begin().await?;
        let convite = uow
            .buscar_convite_por_token(token, false)
            .await?
            .ok_or(AppError::ConviteNaoEncontrado)?
            .com_status_efetivo(Utc::now());
        let clinica = uow.buscar_clinica(convite.clinica_id).await?;

        Ok(ConviteValidado {
            email: convite.email,
            status: convite.status,
            data_expiracao: convite.data_expiracao,
            clinica_nome: clinica.map(|c| c.nome),
            papel: Some(convite.papel),
        })
    }

    /// Renova a validade e reenvia o mesmo link.
    pub async fn reenviar_convite(
        &self,
        clinica_id: Uuid,
        convite_id: Uuid,
    ) -> Result<ConviteEmitido, AppError> {
        let mut uow = self.datastore.begin().await?;
        let convite = uow
            .buscar_convite(clinica_id, convite_id, true)
            .await?
            .ok_or(AppError::ConviteNaoEncontrado)?;

        match convite.status {
            StatusConvite::Aceito => return Err(AppError::ConviteJaUtilizado),
            StatusConvite::Expirado => return Err(AppError::ConviteInvalido),
            StatusConvite::Pendente => {}
        }

        let clinica = uow
            .buscar_clinica(clinica_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Clínica".into()))?;
        let convite = uow
            .renovar_convite(convite.id, Utc::now() + Duration::days(self.validade_dias))
            .await?;
        uow.commit().await?;

        tracing::info!(convite_id = %convite.id, "🔁 Convite reenviado");

        let invite_url = self.link_equipe(convite.token);
        let email_enviado = self
            .enviar(email::convite_equipe(
                &convite.email,
                &clinica.nome,
                convite.papel,
                &invite_url,
                convite.data_expiracao,
            ))
            .await;

        Ok(ConviteEmitido { invite_id: convite.id, invite_url, email_enviado })
    }

    pub async fn revogar_convite(&self, clinica_id: Uuid, convite_id: Uuid) -> Result<Convite, AppError> {
        let mut uow = self.datastore.begin().await?;
        let convite = uow
            .buscar_convite(clinica_id, convite_id, true)
            .await?
            .ok_or(AppError::ConviteNaoEncontrado)?;

        match convite.status {
            StatusConvite::Aceito => return Err(AppError::ConviteJaUtilizado),
            StatusConvite::Expirado => return Err(AppError::ConviteInvalido),
            StatusConvite::Pendente => {}
        }

        let convite = uow.marcar_convite_expirado(convite.id).await?;
        uow.commit().await?;

        tracing::info!(convite_id = %convite.id, "🚫 Convite revogado");
        Ok(convite)
    }

    /// Entrada numa clínica existente com o papel definido no convite.
    pub async fn aceitar_convite(
        &self,
        chamador_id: Uuid,
        payload: &AceitarConvitePayload,
    ) -> Result<ConviteAceito, AppError> {
        let agora = Utc::now();
        let mut uow = self.datastore.begin().await?;

        let convite = uow
            .buscar_convite_por_token(payload.token, true)
            .await?
            .ok_or(AppError::ConviteNaoEncontrado)?;
        convite.verificar_resgate(agora)?;

        let identidade = self
            .identidade_aceitante(&mut *uow, chamador_id, payload.user_id)
            .await?;

        let usuario = uow
            .inserir_usuario(&NovoUsuario {
                auth_usuario_id: identidade.id,
                clinica_id: convite.clinica_id,
                nome: payload.user_name.trim().to_string(),
                email: identidade.email.clone(),
                papel: convite.papel,
            })
            .await?;
        uow.marcar_convite_aceito(convite.id, usuario.id, agora).await?;
        uow.commit().await?;

        tracing::info!(
            convite_id = %convite.id,
            clinica_id = %convite.clinica_id,
            usuario_id = %usuario.id,
            "🤝 Convite de equipe aceito"
        );

        Ok(ConviteAceito { clinica_id: convite.clinica_id, usuario_id: usuario.id })
    }
}
