use std::{any::Any, panic::AssertUnwindSafe};

use anyhow::anyhow;
use axum::{
    extract::Request,
    middleware::{from_fn, Next},
    response::Response,
    Router,
};
use futures::FutureExt;

use crate::routes::internal_server_error;

pub fn add<S: Clone + Send + Sync + 'static>(
    expose_errors: bool,
) -> impl FnOnce(Router<S>) -> Router<S> {
    move |router| {
        router.layer(from_fn(move |request: Request, next: Next| {
            middleware(request, next, expose_errors)
        }))
    }
}

async fn middleware(request: Request, next: Next, expose_errors: bool) -> Response {
    match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => response,
        Err(payload) => {
            let message = panic_message(&*payload);
            internal_server_error(
                anyhow!("request handler panicked: {message}"),
                expose_errors.then(|| message.to_owned()),
            )
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
