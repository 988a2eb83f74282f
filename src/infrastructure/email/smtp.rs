//! SMTP implementation of EmailSender (lettre)

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

use crate::config::EmailConfig;
use crate::domain::{DomainError, DomainResult};

use super::EmailSender;

/// Outbound mail over SMTP with STARTTLS and a 10 s timeout
pub struct SmtpEmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl SmtpEmailSender {
    pub fn new(config: &EmailConfig) -> DomainResult<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| DomainError::Email(e.to_string()))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(Some(Duration::from_secs(10)))
            .build();

        Ok(Self {
            transport,
            from: config.mail_from.clone(),
        })
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send(&self, to: &str, subject: &str, body: &str) -> DomainResult<()> {
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|e| DomainError::Email(format!("invalid from address: {e}")))?,
            )
            .to(to
                .parse()
                .map_err(|e| DomainError::Email(format!("invalid to address: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| DomainError::Email(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| DomainError::Email(e.to_string()))?;
        Ok(())
    }
}
