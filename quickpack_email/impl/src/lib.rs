use std::{future::Future, sync::Arc, time::Duration};

use anyhow::anyhow;
use lettre::{
    message::{header, Mailbox, MessageBuilder},
    Message,
};
use quickpack_email_contracts::{ContentType, Delivery, Email, EmailSendError, EmailService};
use quickpack_models::email_address::EmailAddress;
use retry::RetryPolicy;
use tracing::{debug, error, info, warn};
use transport::{select_transport, LettreTransport, Provider};

pub mod classify;
pub mod retry;
pub mod transport;

/// A configured channel for outbound mail.
#[cfg_attr(test, mockall::automock)]
pub trait MailTransport: Send + Sync + 'static {
    fn provider(&self) -> Provider;

    /// Make a single delivery attempt.
    fn send(&self, message: Message) -> impl Future<Output = Result<Delivery, EmailSendError>> + Send;

    fn test_connection(&self) -> impl Future<Output = anyhow::Result<bool>> + Send;
}

#[derive(Debug, Clone)]
pub struct EmailServiceConfig {
    pub from: Option<EmailAddress>,
    pub user: Option<String>,
    pub pass: Option<String>,
    pub sendgrid_api_key: Option<String>,
    pub use_ssl: bool,
    /// Overrides the default retry budget of the selected provider.
    pub max_retries: Option<u32>,
    pub retry_delay: Duration,
}

/// Sends emails through the transport selected at construction time.
#[derive(Debug)]
pub struct EmailServiceImpl<Transport = LettreTransport> {
    state: Arc<State<Transport>>,
}

#[derive(Debug)]
struct State<Transport> {
    transport: Option<Configured<Transport>>,
    max_retries: Option<u32>,
    retry_delay: Duration,
}

#[derive(Debug)]
struct Configured<Transport> {
    sender: Mailbox,
    transport: Transport,
}

impl<Transport> Clone for EmailServiceImpl<Transport> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl EmailServiceImpl {
    /// Select and build the transport for `config`.
    ///
    /// Missing credentials are not an error here. The service is still
    /// created, but every send fails with [`EmailSendError::NotConfigured`].
    pub fn new(config: &EmailServiceConfig) -> anyhow::Result<Self> {
        let transport = match select_transport(config) {
            Ok(transport_config) => {
                info!(
                    provider = ?transport_config.provider,
                    host = transport_config.host,
                    port = transport_config.port,
                    "Using email provider"
                );
                Some(LettreTransport::new(&transport_config)?)
            }
            Err(err) => {
                warn!("{err}, submissions cannot be relayed");
                None
            }
        };

        Ok(Self::with_transport(config, transport))
    }
}

impl<Transport> EmailServiceImpl<Transport>
where
    Transport: MailTransport,
{
    pub fn with_transport(config: &EmailServiceConfig, transport: Option<Transport>) -> Self {
        let sender = config
            .from
            .clone()
            .or_else(|| config.user.as_deref().and_then(|user| user.parse().ok()));

        let transport = match (transport, sender) {
            (Some(transport), Some(sender)) => Some(Configured {
                sender: sender.into_mailbox().0,
                transport,
            }),
            (Some(_), None) => {
                warn!("No sender address configured, submissions cannot be relayed");
                None
            }
            (None, _) => None,
        };

        Self {
            state: Arc::new(State {
                transport,
                max_retries: config.max_retries,
                retry_delay: config.retry_delay,
            }),
        }
    }
}

impl<Transport> EmailService for EmailServiceImpl<Transport>
where
    Transport: MailTransport,
{
    async fn send(&self, email: Email) -> Result<Delivery, EmailSendError> {
        let Some(configured) = &self.state.transport else {
            return Err(EmailSendError::NotConfigured);
        };

        let message = build_message(&configured.sender, email)?;

        let policy = RetryPolicy {
            max_retries: self
                .state
                .max_retries
                .unwrap_or_else(|| configured.transport.provider().default_max_retries()),
            base_delay: self.state.retry_delay,
        };

        dispatch(&configured.transport, message, policy).await
    }

    async fn ping(&self) -> anyhow::Result<()> {
        let Some(configured) = &self.state.transport else {
            return Err(EmailSendError::NotConfigured.into());
        };

        configured
            .transport
            .test_connection()
            .await?
            .then_some(())
            .ok_or_else(|| anyhow!("Failed to ping smtp server"))
    }
}

fn build_message(sender: &Mailbox, email: Email) -> Result<Message, EmailSendError> {
    // Scoped here so it does not shadow the `with` of generated mocks.
    use quickpack_utils::Apply;

    let reply_to = email.reply_to.and_then(|reply_to| {
        reply_to
            .parse::<Mailbox>()
            .inspect_err(|err| warn!("Omitting unparsable reply-to address {reply_to:?}: {err}"))
            .ok()
    });

    Message::builder()
        .from(sender.clone())
        .to(email.recipient.into_mailbox().0)
        .apply_map(reply_to, MessageBuilder::reply_to)
        .subject(email.subject)
        .header(match email.content_type {
            ContentType::Text => header::ContentType::TEXT_PLAIN,
            ContentType::Html => header::ContentType::TEXT_HTML,
        })
        .body(email.body)
        .map_err(|err| EmailSendError::Other(err.into()))
}

/// Attempt delivery until it succeeds, fails with an error that cannot be
/// retried, or the retry budget is used up.
async fn dispatch<Transport: MailTransport>(
    transport: &Transport,
    message: Message,
    policy: RetryPolicy,
) -> Result<Delivery, EmailSendError> {
    let mut result = Err(EmailSendError::Other(anyhow!("No delivery attempt made")));

    for attempt in policy.attempts() {
        if attempt > 0 {
            let delay = policy.delay(attempt);
            info!(
                attempt,
                max_retries = policy.max_retries,
                ?delay,
                "Retrying email delivery"
            );
            tokio::time::sleep(delay).await;
        }

        result = transport.send(message.clone()).await;
        match &result {
            Ok(delivery) => {
                debug!(attempt, code = delivery.code, "Email delivered");
                break;
            }
            Err(err @ EmailSendError::Auth { .. }) => {
                error!(attempt, error = ?err, "Email service rejected the credentials");
                break;
            }
            Err(err) if !err.is_retryable() || policy.is_final_attempt(attempt) => {
                error!(attempt, error = ?err, "Failed to send email");
                break;
            }
            Err(err) => {
                warn!(attempt, error = ?err, "Email delivery attempt failed");
            }
        }
    }

    result
}
