//src/main.rs

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;

use crate::config::{AppState, Settings};
use crate::db::{PgDatastore, PgIdentityProvider};
use crate::services::email::{EmailSender, LogEmailSender, SmtpEmailSender};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let settings = Settings::from_env()?;

    let pool = config::conectar_banco(&settings).await?;
    sqlx::migrate!().run(&pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let mailer: Arc<dyn EmailSender> = match &settings.smtp {
        Some(smtp) => {
            tracing::info!(host = %smtp.host, "📧 Envio de e-mails via SMTP");
            Arc::new(SmtpEmailSender::new(smtp)?)
        }
        None => {
            tracing::warn!("📧 SMTP_HOST não definido: e-mails serão apenas registrados no log");
            Arc::new(LogEmailSender)
        }
    };

    let bind_addr = settings.bind_addr.clone();
    let app_state = AppState::new(
        settings,
        Arc::new(PgDatastore::new(pool.clone())),
        Arc::new(PgIdentityProvider::new(pool)),
        mailer,
    );
    let app = routes::build_router(app_state);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
