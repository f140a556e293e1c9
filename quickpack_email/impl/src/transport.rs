//! Selection and construction of the outbound SMTP transport.

use std::time::Duration;

use anyhow::Context;
use lettre::{
    transport::smtp::{
        authentication::Credentials as SmtpCredentials,
        client::{Tls, TlsParameters, TlsVersion},
        response::Response,
        PoolConfig,
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use quickpack_email_contracts::{Delivery, EmailSendError};
use quickpack_utils::Apply;
use thiserror::Error;
use tracing::debug;

use crate::{
    classify::{classify, code_number},
    EmailServiceConfig, MailTransport,
};

pub const SENDGRID_HOST: &str = "smtp.sendgrid.net";
pub const SENDGRID_USERNAME: &str = "apikey";
pub const GMAIL_HOST: &str = "smtp.gmail.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Preferred whenever an API key is configured.
    SendGrid,
    Gmail,
}

impl Provider {
    pub fn default_max_retries(self) -> u32 {
        match self {
            Self::SendGrid => 1,
            Self::Gmail => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Security {
    /// TLS from the first byte (SMTPS).
    ImplicitTls,
    /// Plain connection upgraded with `STARTTLS`, which must succeed.
    StartTls,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub provider: Provider,
    pub host: &'static str,
    pub port: u16,
    pub security: Security,
    pub credentials: Credentials,
    /// Applies to connecting, the greeting and every socket operation.
    pub timeout: Duration,
    /// Maximum number of pooled connections, `None` for lettre's default.
    pub max_connections: Option<u32>,
    pub tls: TlsPolicy,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TlsPolicy {
    pub accept_invalid_certs: bool,
    pub require_tls12: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("No email service configured")]
pub struct NotConfigured;

impl From<NotConfigured> for EmailSendError {
    fn from(_: NotConfigured) -> Self {
        Self::NotConfigured
    }
}

/// Pick the transport for the configured credentials.
///
/// A SendGrid API key always wins over Gmail credentials.
pub fn select_transport(config: &EmailServiceConfig) -> Result<TransportConfig, NotConfigured> {
    if let Some(api_key) = &config.sendgrid_api_key {
        return Ok(TransportConfig {
            provider: Provider::SendGrid,
            host: SENDGRID_HOST,
            port: 587,
            security: Security::StartTls,
            credentials: Credentials {
                username: SENDGRID_USERNAME.into(),
                password: api_key.clone(),
            },
            timeout: Duration::from_secs(10),
            max_connections: None,
            tls: TlsPolicy::default(),
        });
    }

    if let (Some(user), Some(pass)) = (&config.user, &config.pass) {
        let (port, security) = if config.use_ssl {
            (465, Security::ImplicitTls)
        } else {
            (587, Security::StartTls)
        };

        return Ok(TransportConfig {
            provider: Provider::Gmail,
            host: GMAIL_HOST,
            port,
            security,
            credentials: Credentials {
                username: user.clone(),
                password: pass.clone(),
            },
            timeout: Duration::from_secs(20),
            max_connections: Some(1),
            tls: TlsPolicy {
                accept_invalid_certs: true,
                require_tls12: true,
            },
        });
    }

    Err(NotConfigured)
}

/// The SMTP transport backed by lettre.
#[derive(Debug, Clone)]
pub struct LettreTransport {
    provider: Provider,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl LettreTransport {
    pub fn new(config: &TransportConfig) -> anyhow::Result<Self> {
        let tls_parameters = TlsParameters::builder(config.host.into())
            .dangerous_accept_invalid_certs(config.tls.accept_invalid_certs)
            .apply_map(
                config.tls.require_tls12.then_some(TlsVersion::Tlsv12),
                |builder, version| builder.set_min_tls_version(version),
            )
            .build_rustls()
            .context("Failed to build tls parameters")?;

        let tls = match config.security {
            Security::ImplicitTls => Tls::Wrapper(tls_parameters),
            Security::StartTls => Tls::Required(tls_parameters),
        };

        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(config.host)
            .port(config.port)
            .tls(tls)
            .credentials(SmtpCredentials::new(
                config.credentials.username.clone(),
                config.credentials.password.clone(),
            ))
            .timeout(Some(config.timeout))
            .apply_map(config.max_connections, |builder, max_size| {
                builder.pool_config(PoolConfig::new().max_size(max_size))
            })
            .build();

        debug!(
            provider = ?config.provider,
            host = config.host,
            port = config.port,
            security = ?config.security,
            "Configured smtp transport"
        );

        Ok(Self {
            provider: config.provider,
            transport,
        })
    }
}

impl MailTransport for LettreTransport {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn send(&self, message: Message) -> Result<Delivery, EmailSendError> {
        self.transport
            .send(message)
            .await
            .map_err(classify)
            .and_then(delivery)
    }

    async fn test_connection(&self) -> anyhow::Result<bool> {
        self.transport.test_connection().await.map_err(Into::into)
    }
}

/// Map the final reply of a transaction. Only positive replies count as
/// delivered.
fn delivery(response: Response) -> Result<Delivery, EmailSendError> {
    let code = code_number(response.code());
    let message = response.message().map(Into::into).collect::<Vec<String>>();

    if !response.is_positive() {
        return Err(EmailSendError::Provider {
            code,
            source: anyhow::anyhow!("{}", message.join(" ")),
        });
    }

    Ok(Delivery { code, message })
}
