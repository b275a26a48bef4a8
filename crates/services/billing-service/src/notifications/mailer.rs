//! Mail delivery backends.

use std::sync::Arc;

use apalis::prelude::Storage;
use apalis_sql::postgres::PostgresStorage;
use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::{Deserialize, Serialize};

use common::{AppError, AppResult, SmtpConfig};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Outgoing message. Doubles as the email job payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email {
    /// Recipient email address
    pub to: String,
    pub subject: String,
    pub html: String,
    /// Plain-text alternative
    pub text: String,
    /// Optional sender override (defaults to the configured sender)
    #[serde(default)]
    pub from: Option<String>,
}

/// Mail delivery seam.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> AppResult<()>;
}

/// Direct SMTP delivery through lettre.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpMailer {
    /// Build the transport. STARTTLS when `use_tls`, implicit TLS otherwise.
    pub fn new(config: &SmtpConfig) -> AppResult<Self> {
        let host = config
            .host
            .as_deref()
            .ok_or_else(|| AppError::mail("SMTP host is not configured"))?;

        let builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
        }
        .map_err(|e| AppError::mail(format!("Invalid SMTP relay {}: {}", host, e)))?;

        let mut builder = builder.port(config.port);
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        let sender = parse_mailbox(&config.sender())?;

        Ok(Self {
            transport: builder.build(),
            sender,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &Email) -> AppResult<()> {
        let from = match &email.from {
            Some(from) => parse_mailbox(from)?,
            None => self.sender.clone(),
        };

        let message = Message::builder()
            .from(from)
            .to(parse_mailbox(&email.to)?)
            .subject(email.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                email.text.clone(),
                email.html.clone(),
            ))
            .map_err(|e| AppError::mail(format!("Failed to build message: {}", e)))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::mail(format!("SMTP send to {} failed: {}", email.to, e)))?;

        tracing::info!(to = %email.to, subject = %email.subject, "Email sent");
        Ok(())
    }
}

/// Development mailer: logs the recipient and subject instead of sending.
/// The body carries temporary passwords and is never logged.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &Email) -> AppResult<()> {
        tracing::warn!(
            to = %email.to,
            subject = %email.subject,
            "SMTP not configured, email not sent"
        );
        Ok(())
    }
}

/// Pushes messages onto the apalis queue for `jobs work` to deliver.
pub struct QueueMailer {
    storage: PostgresStorage<Email>,
}

impl QueueMailer {
    pub fn new(storage: PostgresStorage<Email>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl Mailer for QueueMailer {
    async fn send(&self, email: &Email) -> AppResult<()> {
        let mut storage = self.storage.clone();
        storage
            .push(email.clone())
            .await
            .map_err(|e| AppError::mail(format!("Failed to queue email: {}", e)))?;

        tracing::debug!(to = %email.to, "Email queued");
        Ok(())
    }
}

/// SMTP when a host is configured, log-only otherwise.
pub fn build_mailer(config: &SmtpConfig) -> AppResult<Arc<dyn Mailer>> {
    if config.is_configured() {
        Ok(Arc::new(SmtpMailer::new(config)?))
    } else {
        Ok(Arc::new(LogMailer))
    }
}

fn parse_mailbox(address: &str) -> AppResult<Mailbox> {
    address
        .parse()
        .map_err(|e| AppError::mail(format!("Invalid address {}: {}", address, e)))
}
