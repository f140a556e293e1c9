use std::sync::Arc;

use quickpack_core_order_contracts::{OrderService, OrderSubmitError};
use quickpack_email_contracts::{ContentType, Email, EmailService};
use quickpack_models::{
    email_address::EmailAddress,
    order::{OrderSubmission, ProductDetail, ProductDetails},
};
use quickpack_templates_contracts::{
    OrderDetailsTemplate, OrderItemTemplate, OrderTemplate, TemplateService,
};
use quickpack_utils::html::{escape, escape_multiline};
use tracing::info;

#[derive(Debug, Clone)]
pub struct OrderServiceImpl<Email, Template> {
    pub email: Email,
    pub template: Template,
    pub config: OrderServiceConfig,
}

#[derive(Debug, Clone)]
pub struct OrderServiceConfig {
    pub recipient: Arc<EmailAddress>,
}

impl<EmailS, TemplateS> OrderService for OrderServiceImpl<EmailS, TemplateS>
where
    EmailS: EmailService,
    TemplateS: TemplateService,
{
    async fn submit_order(&self, submission: OrderSubmission) -> Result<(), OrderSubmitError> {
        let name = escape(&submission.name);
        let (order_subject, details) = match &submission.product_details {
            ProductDetails::Single(detail) => {
                let size = escape(detail.size.as_deref().unwrap_or_default());
                let details = OrderDetailsTemplate::Single {
                    size: size.clone(),
                    type_label: detail.type_label().into(),
                    dimensions: detail.dimensions.as_deref().map(escape),
                };
                (size, details)
            }
            ProductDetails::Custom(items) => (
                "Custom Order".into(),
                OrderDetailsTemplate::Custom {
                    items: items.iter().map(item_template).collect(),
                },
            ),
        };

        let body = self.template.render(&OrderTemplate {
            details,
            quantity: or_na(submission.quantity.as_deref()),
            name: name.clone(),
            email: escape(&submission.email),
            phone: escape(&submission.phone),
            address: escape(&submission.address),
            city: escape(&submission.city),
            province: escape(&submission.province),
            postal_code: escape(&submission.postal_code),
            additional_notes: submission
                .additional_notes
                .as_deref()
                .map(escape_multiline),
        })?;

        let email = Email {
            recipient: (*self.config.recipient).clone(),
            subject: format!("New Order from {name} - {order_subject}"),
            body,
            content_type: ContentType::Html,
            reply_to: Some(submission.email),
        };

        let delivery = self.email.send(email).await?;
        info!(
            code = delivery.code,
            order_type = ?submission.product_details.order_type(),
            "order sent"
        );

        Ok(())
    }
}

fn item_template(item: &ProductDetail) -> OrderItemTemplate {
    OrderItemTemplate {
        quantity: or_na(item.quantity.as_deref()),
        size: or_na(item.size.as_deref()),
        dimensions: item.dimensions.as_deref().map(escape),
    }
}

fn or_na(value: Option<&str>) -> String {
    value.map(escape).unwrap_or_else(|| "N/A".into())
}
