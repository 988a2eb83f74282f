//! Outbound email facade
//!
//! The core never talks SMTP directly: it depends on `EmailSender` and
//! the composition root picks the SMTP or the no-op implementation.

mod smtp;

pub use smtp::SmtpEmailSender;

use async_trait::async_trait;
use log::debug;

use crate::domain::DomainResult;

#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send one plain-text message
    async fn send(&self, to: &str, subject: &str, body: &str) -> DomainResult<()>;
}

/// Sender that drops every message. Used in tests and in deployments
/// without SMTP credentials.
pub struct NoopEmailSender;

#[async_trait]
impl EmailSender for NoopEmailSender {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> DomainResult<()> {
        debug!("Email suppressed (noop sender): to={} subject={}", to, subject);
        Ok(())
    }
}
