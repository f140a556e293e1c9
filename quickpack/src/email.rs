use anyhow::Context;
use quickpack_config::EmailConfig;
use quickpack_email_impl::{EmailServiceConfig, EmailServiceImpl};

/// Build the email service for the configured provider.
pub fn build(config: &EmailConfig) -> anyhow::Result<EmailServiceImpl> {
    EmailServiceImpl::new(&service_config(config)).context("Failed to build email transport")
}

fn service_config(config: &EmailConfig) -> EmailServiceConfig {
    EmailServiceConfig {
        from: config.from.clone(),
        user: config.user.clone(),
        pass: config.pass.clone(),
        sendgrid_api_key: config.sendgrid_api_key.clone(),
        use_ssl: config.use_ssl,
        max_retries: config.max_retries,
        retry_delay: *config.retry_delay,
    }
}
