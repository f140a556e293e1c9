use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response, routing, Router};
use quickpack_core_order_contracts::{OrderService, OrderSubmitError};
use quickpack_models::order::OrderSubmission;

use super::{email_error, error, send_failed, success};
use crate::extractors::submission::RequestSubmission;

const SUBMIT_FAILED: &str = "Failed to submit order. Please try again later.";

pub fn router(service: Arc<impl OrderService>) -> Router<()> {
    Router::new()
        .route("/order", routing::get(submit_order).post(submit_order))
        .with_state(service)
}

async fn submit_order(
    service: State<Arc<impl OrderService>>,
    RequestSubmission(data): RequestSubmission,
) -> Response {
    let submission = match OrderSubmission::try_from(&data) {
        Ok(submission) => submission,
        Err(err) => return error(StatusCode::BAD_REQUEST, err.to_string()),
    };

    match service.submit_order(submission).await {
        Ok(()) => success("Order submitted successfully! We will contact you soon."),
        Err(OrderSubmitError::Email(err)) => email_error(err, SUBMIT_FAILED),
        Err(OrderSubmitError::Other(err)) => send_failed(err, SUBMIT_FAILED),
    }
}
