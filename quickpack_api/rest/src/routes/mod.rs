use axum::{
    extract::OriginalUri,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use quickpack_email_contracts::EmailSendError;
use serde_json::json;

use crate::models::ApiResponse;

pub mod contact;
pub mod health;
pub mod index;
pub mod order;

pub fn internal_server_error(err: impl Into<anyhow::Error>, detail: Option<String>) -> Response {
    let err = err.into();
    tracing::error!("internal server error: {err:#}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse {
            success: false,
            message: "Internal server error".into(),
            error: detail,
        }),
    )
        .into_response()
}

/// Map a failed delivery to a response. The full error is only logged.
fn email_error(err: EmailSendError, fallback: &str) -> Response {
    let message = match &err {
        EmailSendError::NotConfigured => {
            "Server configuration error. Please contact administrator.".into()
        }
        EmailSendError::Connection(_) => {
            "Email service connection timeout. Please try again later or contact support.".into()
        }
        err => match err.code() {
            Some(code) => format!("Email service error: {code}. Please try again later."),
            None => fallback.into(),
        },
    };

    send_failed(err, message)
}

fn send_failed(err: impl Into<anyhow::Error>, message: impl Into<String>) -> Response {
    let err = err.into();
    tracing::error!("failed to send email: {err:#}");
    error(StatusCode::INTERNAL_SERVER_ERROR, message)
}

fn success(message: &str) -> Response {
    Json(ApiResponse {
        success: true,
        message: message.into(),
        error: None,
    })
    .into_response()
}

pub fn error(code: StatusCode, message: impl Into<String>) -> Response {
    (
        code,
        Json(ApiResponse {
            success: false,
            message: message.into(),
            error: None,
        }),
    )
        .into_response()
}

pub async fn not_found(method: Method, OriginalUri(uri): OriginalUri) -> Response {
    tracing::debug!(%method, path = uri.path(), "route not found");
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "message": "Route not found",
            "path": uri.path(),
            "method": method.as_str(),
        })),
    )
        .into_response()
}
