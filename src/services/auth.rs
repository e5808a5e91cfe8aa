// src/services/auth.rs

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    common::{error::AppError, texto::normalizar_email},
    db::{Datastore, IdentityProvider},
    models::auth::{
        AuthResponse, Claims, Identidade, RegisterPayload, RegisterResponse, RegisteredUser,
        SignupPayload, SignupResponse,
    },
    services::clinica_service::{fundar_clinica, Fundador},
};

#[derive(Clone)]
pub struct AuthService {
    datastore: Arc<dyn Datastore>,
    identity: Arc<dyn IdentityProvider>,
    jwt_secret: String,
    jwt_validade_dias: i64,
}

impl AuthService {
    pub fn new(
        datastore: Arc<dyn Datastore>,
        identity: Arc<dyn IdentityProvider>,
        jwt_secret: String,
        jwt_validade_dias: i64,
    ) -> Self {
        Self { datastore, identity, jwt_secret, jwt_validade_dias }
    }

    /// Cria só a identidade (a pessoa entra numa clínica depois, via convite).
    pub async fn signup(&self, payload: &SignupPayload) -> Result<SignupResponse, AppError> {
        let identidade = self
            .identity
            .criar_identidade(&payload.name, &payload.email, &payload.password)
            .await?;

        tracing::info!(email = %identidade.email, "🆕 Identidade criada");
        Ok(SignupResponse {
            user_id: identidade.id,
            token: self.create_token(identidade.id)?,
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let identidade = self.identity.autenticar(email, password).await?;
        Ok(AuthResponse { token: self.create_token(identidade.id)? })
    }

    /// Auto-cadastro: identidade + clínica + usuário admin.
    ///
    /// A identidade mora fora da unidade de trabalho, então a consistência é
    /// garantida por compensação: se a clínica não puder ser criada, a
    /// identidade recém-criada é removida.
    pub async fn register(&self, payload: &RegisterPayload) -> Result<RegisterResponse, AppError> {
        // 1. Identidade no provedor (confirmada na hora)
        let identidade = self
            .identity
            .criar_identidade(&payload.name, &payload.email, &payload.password)
            .await?;

        // 2. Clínica + admin numa única transação
        let resultado = async {
            let mut uow = self.datastore.begin().await?;
            let criado = fundar_clinica(
                &mut *uow,
                &payload.clinic_name,
                Some(normalizar_email(&payload.email)),
                None,
                Fundador {
                    auth_usuario_id: identidade.id,
                    nome: &payload.name,
                    email: &identidade.email,
                },
            )
            .await?;
            uow.commit().await?;
            Ok::<_, AppError>(criado)
        }
        .await;

        let (clinica, usuario) = match resultado {
            Ok(criado) => criado,
            Err(err) => {
                // 3. Compensação
                if let Err(falha) = self.identity.remover_identidade(identidade.id).await {
                    tracing::error!(
                        identidade_id = %identidade.id,
                        erro = %falha,
                        "🔥 Falha ao remover identidade órfã após erro no registro"
                    );
                }
                return Err(err);
            }
        };

        tracing::info!(clinica_id = %clinica.id, slug = %clinica.slug, "🏥 Clínica registrada");

        Ok(RegisterResponse {
            user: RegisteredUser {
                id: identidade.id,
                usuario_id: usuario.id,
                nome: usuario.nome,
                email: usuario.email,
                papel: usuario.papel,
            },
            token: self.create_token(identidade.id)?,
            clinica,
        })
    }

    pub async fn validate_token(&self, token: &str) -> Result<Identidade, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.identity
            .buscar_identidade(token_data.claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    pub fn create_token(&self, identidade_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(self.jwt_validade_dias);

        let claims = Claims {
            sub: identidade_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
