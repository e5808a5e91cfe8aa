// src/services/email.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use html_escape::{encode_double_quoted_attribute, encode_text};
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials, AsyncSmtpTransport,
    AsyncTransport, Message, Tokio1Executor,
};

use crate::{common::error::AppError, config::SmtpSettings, models::clinica::Papel};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError>;
}

// ---
// SMTP (lettre)
// ---
pub struct SmtpEmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpEmailSender {
    pub fn new(config: &SmtpSettings) -> Result<Self, AppError> {
        let creds = Credentials::new(config.username.clone(), config.password.clone());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| anyhow::anyhow!("Falha ao configurar SMTP: {}", e))?
            .credentials(creds)
            .port(config.port)
            .build();

        Ok(Self {
            mailer,
            from: format!("{} <{}>", config.from_name, config.from_email),
        })
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError> {
        let email = Message::builder()
            .from(self.from.parse().map_err(|e| anyhow::anyhow!("Remetente inválido: {}", e))?)
            .to(message.to.parse().map_err(|e| anyhow::anyhow!("Destinatário inválido: {}", e))?)
            .subject(message.subject.clone())
            .header(ContentType::TEXT_HTML)
            .body(message.html.clone())
            .map_err(|e| anyhow::anyhow!("Falha ao montar e-mail: {}", e))?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| anyhow::anyhow!("Falha no envio SMTP: {}", e))?;
        Ok(())
    }
}

// Sem SMTP configurado: só registra no log
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<(), AppError> {
        tracing::info!(to = %message.to, subject = %message.subject, "📧 E-mail (SMTP desativado)");
        Ok(())
    }
}

// ---
// Templates
// ---

// `corpo` já é HTML montado aqui; título e link vêm de fora e são escapados.
fn layout(titulo: &str, corpo: &str, link: &str, data_expiracao: DateTime<Utc>) -> String {
    let titulo = encode_text(titulo);
    let href = encode_double_quoted_attribute(link);
    let link = encode_text(link);
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"><title>{titulo}</title></head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h2 style="color: #0e7490;">{titulo}</h2>
    <p>{corpo}</p>
    <p style="text-align: center; margin: 30px 0;">
        <a href="{href}" style="background-color: #0e7490; color: white; padding: 12px 24px; text-decoration: none; border-radius: 6px; display: inline-block;">Aceitar convite</a>
    </p>
    <p>Ou copie e cole o link no navegador:</p>
    <p style="word-break: break-all; color: #666;">{link}</p>
    <p style="margin-top: 30px; color: #666; font-size: 14px;">O convite é válido até {expira}.</p>
</body>
</html>"#,
        expira = data_expiracao.format("%d/%m/%Y %H:%M UTC"),
    )
}

pub fn convite_fundador(to: &str, link: &str, data_expiracao: DateTime<Utc>) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Convite para criar sua clínica".to_string(),
        html: layout(
            "Bem-vindo!",
            "Você foi convidado para cadastrar a sua clínica na plataforma.",
            link,
            data_expiracao,
        ),
    }
}

pub fn convite_equipe(
    to: &str,
    clinica_nome: &str,
    papel: Papel,
    link: &str,
    data_expiracao: DateTime<Utc>,
) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: format!("Convite para a equipe da {clinica_nome}"),
        html: layout(
            clinica_nome,
            &format!(
                "Você foi convidado para fazer parte da equipe como <strong>{}</strong>.",
                papel.as_str()
            ),
            link,
            data_expiracao,
        ),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_de_fundador_contem_link_e_validade() {
        let exp = "2026-11-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let msg = convite_fundador("a@b.com", "https://app/convite-fundador?token=x", exp);
        assert_eq!(msg.to, "a@b.com");
        assert!(msg.html.contains("https://app/convite-fundador?token=x"));
        assert!(msg.html.contains("01/11/2026"));
    }

    #[test]
    fn template_de_equipe_mostra_clinica_e_papel() {
        let exp = Utc::now();
        let msg = convite_equipe("d@b.com", "Clínica Sorriso", Papel::Dentista, "https://x", exp);
        assert!(msg.subject.contains("Clínica Sorriso"));
        assert!(msg.html.contains("dentista"));
    }

    #[test]
    fn nome_da_clinica_e_escapado_no_html() {
        let nome = r#"<a href="https://golpe.com">Clique</a> & cia"#;
        let msg = convite_equipe("d@b.com", nome, Papel::Assistente, "https://app/convite?token=x", Utc::now());

        assert!(!msg.html.contains("<a href=\"https://golpe.com\">"));
        assert!(msg.html.contains("&lt;a href=\"https://golpe.com\"&gt;Clique&lt;/a&gt; &amp; cia"));
        assert!(msg.html.contains(r#"href="https://app/convite?token=x""#));
    }

    #[test]
    fn link_com_aspas_nao_sai_do_atributo() {
        let msg = convite_fundador("a@b.com", r#"https://app/x" onclick="alert(1)"#, Utc::now());
        assert!(!msg.html.contains(r#"href="https://app/x" onclick"#));
        assert!(msg.html.contains(r#"href="https://app/x&quot; onclick=&quot;alert(1)""#));
    }
}
