use std::future::Future;

use quickpack_email_contracts::EmailSendError;
use quickpack_models::order::OrderSubmission;
use thiserror::Error;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait OrderService: Send + Sync + 'static {
    /// Forward an order to the configured recipient.
    fn submit_order(
        &self,
        submission: OrderSubmission,
    ) -> impl Future<Output = Result<(), OrderSubmitError>> + Send;
}

#[derive(Debug, Error)]
pub enum OrderSubmitError {
    #[error(transparent)]
    Email(#[from] EmailSendError),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(feature = "mock")]
impl MockOrderService {
    pub fn with_submit_order(
        mut self,
        submission: OrderSubmission,
        result: Result<(), OrderSubmitError>,
    ) -> Self {
        self.expect_submit_order()
            .once()
            .with(mockall::predicate::eq(submission))
            .return_once(move |_| Box::pin(std::future::ready(result)));
        self
    }
}
