use std::sync::Arc;

use quickpack_core_contact_contracts::{ContactSendMessageError, ContactService};
use quickpack_email_contracts::{ContentType, Email, EmailService};
use quickpack_models::{contact::ContactSubmission, email_address::EmailAddress};
use quickpack_templates_contracts::{ContactTemplate, TemplateService};
use quickpack_utils::html::{escape, escape_multiline};
use tracing::info;

#[derive(Debug, Clone)]
pub struct ContactServiceImpl<Email, Template> {
    pub email: Email,
    pub template: Template,
    pub config: ContactServiceConfig,
}

#[derive(Debug, Clone)]
pub struct ContactServiceConfig {
    pub recipient: Arc<EmailAddress>,
}

impl<EmailS, TemplateS> ContactService for ContactServiceImpl<EmailS, TemplateS>
where
    EmailS: EmailService,
    TemplateS: TemplateService,
{
    async fn send_message(
        &self,
        submission: ContactSubmission,
    ) -> Result<(), ContactSendMessageError> {
        let name = escape(&submission.name);

        let body = self.template.render(&ContactTemplate {
            name: name.clone(),
            email: escape(&submission.email),
            phone: submission
                .phone
                .as_deref()
                .map(escape)
                .unwrap_or_else(|| "Not provided".into()),
            message: escape_multiline(&submission.message),
        })?;

        let email = Email {
            recipient: (*self.config.recipient).clone(),
            subject: format!("New Contact Form Submission from {name}"),
            body,
            content_type: ContentType::Html,
            reply_to: Some(submission.email),
        };

        let delivery = self.email.send(email).await?;
        info!(code = delivery.code, "contact message sent");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use quickpack_email_contracts::{Delivery, EmailSendError, MockEmailService};
    use quickpack_templates_contracts::MockTemplateService;
    use quickpack_utils::assert_matches;

    use super::*;

    fn config() -> ContactServiceConfig {
        ContactServiceConfig {
            recipient: Arc::new("contact@example.com".parse().unwrap()),
        }
    }

    fn delivery() -> Delivery {
        Delivery {
            code: 250,
            message: vec!["Ok".into()],
        }
    }

    #[tokio::test]
    async fn ok() {
        // Arrange
        let config = config();

        let template = MockTemplateService::new().with_render(
            ContactTemplate {
                name: "John &lt;Doe&gt;".into(),
                email: "john@example.com".into(),
                phone: "Not provided".into(),
                message: "Hi<br>there &amp; bye".into(),
            },
            "<p>rendered</p>".into(),
        );

        let email = MockEmailService::new().with_send(
            Email {
                recipient: (*config.recipient).clone(),
                subject: "New Contact Form Submission from John &lt;Doe&gt;".into(),
                body: "<p>rendered</p>".into(),
                content_type: ContentType::Html,
                reply_to: Some("john@example.com".into()),
            },
            Ok(delivery()),
        );

        let sut = ContactServiceImpl {
            email,
            template,
            config,
        };

        // Act
        let result = sut
            .send_message(ContactSubmission {
                name: "John <Doe>".into(),
                email: "john@example.com".into(),
                phone: None,
                message: "Hi\nthere & bye".into(),
            })
            .await;

        // Assert
        result.unwrap();
    }

    #[tokio::test]
    async fn phone_is_escaped() {
        // Arrange
        let config = config();

        let template = MockTemplateService::new().with_render(
            ContactTemplate {
                name: "John Doe".into(),
                email: "john@example.com".into(),
                phone: "&quot;555&quot;".into(),
                message: "Hi".into(),
            },
            "body".into(),
        );

        let email = MockEmailService::new().with_send(
            Email {
                recipient: (*config.recipient).clone(),
                subject: "New Contact Form Submission from John Doe".into(),
                body: "body".into(),
                content_type: ContentType::Html,
                reply_to: Some("john@example.com".into()),
            },
            Ok(delivery()),
        );

        let sut = ContactServiceImpl {
            email,
            template,
            config,
        };

        // Act
        let result = sut
            .send_message(ContactSubmission {
                name: "John Doe".into(),
                email: "john@example.com".into(),
                phone: Some("\"555\"".into()),
                message: "Hi".into(),
            })
            .await;

        // Assert
        result.unwrap();
    }

    #[tokio::test]
    async fn email_error() {
        // Arrange
        let config = config();

        let template = MockTemplateService::new().with_render(
            ContactTemplate {
                name: "John Doe".into(),
                email: "john@example.com".into(),
                phone: "Not provided".into(),
                message: "Hi".into(),
            },
            "body".into(),
        );

        let email = MockEmailService::new().with_send(
            Email {
                recipient: (*config.recipient).clone(),
                subject: "New Contact Form Submission from John Doe".into(),
                body: "body".into(),
                content_type: ContentType::Html,
                reply_to: Some("john@example.com".into()),
            },
            Err(EmailSendError::Connection(anyhow!("timed out"))),
        );

        let sut = ContactServiceImpl {
            email,
            template,
            config,
        };

        // Act
        let result = sut
            .send_message(ContactSubmission {
                name: "John Doe".into(),
                email: "john@example.com".into(),
                phone: None,
                message: "Hi".into(),
            })
            .await;

        // Assert
        assert_matches!(
            result,
            Err(ContactSendMessageError::Email(EmailSendError::Connection(_)))
        );
    }
}
