use std::future::Future;

use quickpack_models::email_address::EmailAddress;
use thiserror::Error;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait EmailService: Send + Sync + 'static {
    /// Send the email, retrying transient failures.
    fn send(&self, email: Email) -> impl Future<Output = Result<Delivery, EmailSendError>> + Send;

    fn ping(&self) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// A fully rendered email, ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub recipient: EmailAddress,
    pub subject: String,
    pub body: String,
    pub content_type: ContentType,
    /// Raw address of the submitter. Omitted from the message if the
    /// transport cannot parse it.
    pub reply_to: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Text,
    Html,
}

/// The positive reply of the mail provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub code: u16,
    pub message: Vec<String>,
}

#[derive(Debug, Error)]
pub enum EmailSendError {
    #[error("No email service configured")]
    NotConfigured,
    #[error("Email service rejected the credentials")]
    Auth {
        code: Option<u16>,
        #[source]
        source: anyhow::Error,
    },
    #[error("Could not connect to the email service")]
    Connection(#[source] anyhow::Error),
    #[error("Email service responded with code {code}")]
    Provider {
        code: u16,
        #[source]
        source: anyhow::Error,
    },
    #[error("Failed to send email")]
    Transient(#[source] anyhow::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EmailSendError {
    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Provider { .. } | Self::Transient(_)
        )
    }

    /// The response code of the mail provider, if it sent one.
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Auth { code, .. } => *code,
            Self::Provider { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[cfg(feature = "mock")]
impl MockEmailService {
    pub fn with_send(mut self, email: Email, result: Result<Delivery, EmailSendError>) -> Self {
        self.expect_send()
            .once()
            .with(mockall::predicate::eq(email))
            .return_once(move |_| Box::pin(std::future::ready(result)));
        self
    }
}
