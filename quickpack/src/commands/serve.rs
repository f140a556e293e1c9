use std::sync::Arc;

use anyhow::Context;
use quickpack_api_rest::{RestServer, RestServerConfig};
use quickpack_config::Config;
use quickpack_core_contact_impl::{ContactServiceConfig, ContactServiceImpl};
use quickpack_core_order_impl::{OrderServiceConfig, OrderServiceImpl};
use quickpack_email_contracts::EmailService;
use quickpack_templates_impl::TemplateServiceImpl;
use tracing::{info, warn};

use crate::email;

pub async fn serve(config: Config) -> anyhow::Result<()> {
    info!("Environment: {:?}", config.environment);

    let email = email::build(&config.email)?;
    if let Err(err) = email.ping().await {
        warn!("Email service is not reachable: {err:#}");
    }

    let template = TemplateServiceImpl::new().context("Failed to load email templates")?;
    let recipient = Arc::new(config.contact.recipient);

    let server = RestServer {
        contact: ContactServiceImpl {
            email: email.clone(),
            template: template.clone(),
            config: ContactServiceConfig {
                recipient: Arc::clone(&recipient),
            },
        },
        order: OrderServiceImpl {
            email,
            template,
            config: OrderServiceConfig { recipient },
        },
        config: RestServerConfig {
            expose_errors: config.environment.is_development(),
        },
    };

    info!(
        "Starting http server on {}:{}",
        config.http.host, config.http.port
    );
    server.serve(config.http.host, config.http.port).await
}
