//! Mail delivery
//!
//! `SmtpMailer` sends over implicit TLS (port 465 by default) with
//! username/password credentials. `LogMailer` is used when mail is
//! disabled; it records recipient and subject only.

use crate::config::MailConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, instrument};

/// An outbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Mail sender collaborator
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: MailMessage) -> Result<()>;
}

/// SMTP mailer
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let from: Mailbox = config
            .from
            .parse()
            .with_context(|| format!("invalid sender address: {}", config.from))?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.server)
            .context("failed to configure SMTP relay")?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    #[instrument(skip_all, fields(to = %message.to, subject = %message.subject))]
    async fn send(&self, message: MailMessage) -> Result<()> {
        let to: Mailbox = message
            .to
            .parse()
            .with_context(|| format!("invalid recipient address: {}", message.to))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject)
            .header(ContentType::TEXT_HTML)
            .body(message.body)
            .context("failed to build message")?;

        self.transport
            .send(email)
            .await
            .context("SMTP delivery failed")?;

        info!("mail delivered");
        Ok(())
    }
}

/// Mailer used when delivery is disabled
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: MailMessage) -> Result<()> {
        info!(to = %message.to, subject = %message.subject, "mail delivery disabled, message dropped");
        Ok(())
    }
}
