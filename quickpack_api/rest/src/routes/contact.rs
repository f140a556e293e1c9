use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response, routing, Router};
use quickpack_core_contact_contracts::{ContactSendMessageError, ContactService};
use quickpack_models::contact::ContactSubmission;

use super::{email_error, error, send_failed, success};
use crate::extractors::submission::RequestSubmission;

const SEND_FAILED: &str = "Failed to send email. Please try again later.";

pub fn router(service: Arc<impl ContactService>) -> Router<()> {
    Router::new()
        .route("/contact", routing::get(send_message).post(send_message))
        .with_state(service)
}

async fn send_message(
    service: State<Arc<impl ContactService>>,
    RequestSubmission(data): RequestSubmission,
) -> Response {
    let submission = match ContactSubmission::try_from(&data) {
        Ok(submission) => submission,
        Err(err) => return error(StatusCode::BAD_REQUEST, err.to_string()),
    };

    match service.send_message(submission).await {
        Ok(()) => success("Email sent successfully!"),
        Err(ContactSendMessageError::Email(err)) => email_error(err, SEND_FAILED),
        Err(ContactSendMessageError::Other(err)) => send_failed(err, SEND_FAILED),
    }
}
