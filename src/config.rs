// src/config.rs

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, sync::Arc, time::Duration};
use uuid::Uuid;

use crate::{
    common::i18n::I18nStore,
    db::{Datastore, IdentityProvider},
    services::{
        auth::AuthService, clinica_service::ClinicaService, convite_service::ConviteService,
        email::EmailSender, equipe_service::EquipeService, finance_service::FinanceService,
        paciente_service::PacienteService,
    },
};

#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub app_url: String,
    pub bind_addr: String,
    pub database_max_connections: u32,
    pub convite_validade_dias: i64,
    pub jwt_validade_dias: i64,
    /// Identidades com acesso administrativo à plataforma.
    pub platform_admin_ids: Vec<Uuid>,
    pub smtp: Option<SmtpSettings>,
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{key} inválido ('{raw}'): {e}")),
        None => Ok(default),
    }
}

impl Settings {
    /// Lê o ambiente do processo (e o `.env`, se existir).
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let app_url = lookup("APP_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let platform_admin_ids = lookup("PLATFORM_ADMIN_IDS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| {
                Uuid::parse_str(id).map_err(|e| anyhow::anyhow!("PLATFORM_ADMIN_IDS inválido ('{id}'): {e}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        // SMTP só é ligado quando SMTP_HOST existe
        let smtp = match lookup("SMTP_HOST").filter(|h| !h.trim().is_empty()) {
            Some(host) => {
                let username = lookup("SMTP_USERNAME").unwrap_or_default();
                Some(SmtpSettings {
                    host,
                    port: parse_or(&lookup, "SMTP_PORT", 587)?,
                    from_email: lookup("SMTP_FROM_EMAIL").unwrap_or_else(|| username.clone()),
                    from_name: lookup("SMTP_FROM_NAME").unwrap_or_else(|| "Clínica".to_string()),
                    password: lookup("SMTP_PASSWORD").unwrap_or_default(),
                    username,
                })
            }
            None => None,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            app_url,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            convite_validade_dias: parse_or(&lookup, "CONVITE_VALIDADE_DIAS", 7)?,
            jwt_validade_dias: parse_or(&lookup, "JWT_VALIDADE_DIAS", 7)?,
            platform_admin_ids,
            smtp,
        })
    }

    pub fn is_platform_admin(&self, identidade_id: Uuid) -> bool {
        self.platform_admin_ids.contains(&identidade_id)
    }
}

pub async fn conectar_banco(settings: &Settings) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.database_max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&settings.database_url)
        .await
        .context("Falha ao conectar ao banco de dados")?;

    tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
    Ok(pool)
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub identity: Arc<dyn IdentityProvider>,
    pub i18n_store: Arc<I18nStore>,

    pub auth_service: AuthService,
    pub convite_service: ConviteService,
    pub equipe_service: EquipeService,
    pub clinica_service: ClinicaService,
    pub finance_service: FinanceService,
    pub paciente_service: PacienteService,
}

impl AppState {
    // --- Monta o gráfico de dependências ---
    pub fn new(
        settings: Settings,
        datastore: Arc<dyn Datastore>,
        identity: Arc<dyn IdentityProvider>,
        mailer: Arc<dyn EmailSender>,
    ) -> Self {
        let settings = Arc::new(settings);

        let auth_service = AuthService::new(
            datastore.clone(),
            identity.clone(),
            settings.jwt_secret.clone(),
            settings.jwt_validade_dias,
        );
        let convite_service = ConviteService::new(
            datastore.clone(),
            identity.clone(),
            mailer,
            settings.app_url.clone(),
            settings.convite_validade_dias,
        );

        Self {
            equipe_service: EquipeService::new(datastore.clone()),
            clinica_service: ClinicaService::new(datastore.clone()),
            finance_service: FinanceService::new(datastore.clone()),
            paciente_service: PacienteService::new(datastore),
            auth_service,
            convite_service,
            settings,
            identity,
            i18n_store: Arc::new(I18nStore::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_de(pares: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let mapa: HashMap<String, String> =
            pares.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| mapa.get(key).cloned()
    }

    #[test]
    fn aplica_os_valores_padrao() {
        let settings =
            Settings::from_lookup(lookup_de(&[("DATABASE_URL", "postgres://x"), ("JWT_SECRET", "s")]))
                .unwrap();
        assert_eq!(settings.app_url, "http://localhost:3000");
        assert_eq!(settings.bind_addr, "0.0.0.0:3000");
        assert_eq!(settings.convite_validade_dias, 7);
        assert_eq!(settings.jwt_validade_dias, 7);
        assert!(settings.smtp.is_none());
        assert!(settings.platform_admin_ids.is_empty());
    }

    #[test]
    fn exige_database_url_e_jwt_secret() {
        assert!(Settings::from_lookup(lookup_de(&[("JWT_SECRET", "s")])).is_err());
        assert!(Settings::from_lookup(lookup_de(&[("DATABASE_URL", "postgres://x")])).is_err());
    }

    #[test]
    fn numero_invalido_e_erro() {
        let resultado = Settings::from_lookup(lookup_de(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("CONVITE_VALIDADE_DIAS", "sete"),
        ]));
        assert!(resultado.is_err());
    }

    #[test]
    fn admins_da_plataforma_sao_identidades() {
        let root = Uuid::new_v4();
        let ops = Uuid::new_v4();
        let lista = format!(" {root} , ,{ops}");
        let settings = Settings::from_lookup(lookup_de(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("PLATFORM_ADMIN_IDS", lista.as_str()),
            ("APP_URL", "https://app.exemplo.com/"),
            ("SMTP_HOST", "smtp.exemplo.com"),
            ("SMTP_USERNAME", "no-reply@exemplo.com"),
        ]))
        .unwrap();
        assert!(settings.is_platform_admin(root));
        assert!(settings.is_platform_admin(ops));
        assert!(!settings.is_platform_admin(Uuid::new_v4()));
        assert_eq!(settings.app_url, "https://app.exemplo.com");
        let smtp = settings.smtp.unwrap();
        assert_eq!(smtp.port, 587);
        assert_eq!(smtp.from_email, "no-reply@exemplo.com");
    }

    #[test]
    fn admin_da_plataforma_por_email_nao_e_aceito() {
        let resultado = Settings::from_lookup(lookup_de(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("PLATFORM_ADMIN_IDS", "root@plataforma.com"),
        ]));
        assert!(resultado.is_err());
    }
}
