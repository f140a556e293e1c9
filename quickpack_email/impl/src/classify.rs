//! Mapping of transport failures onto [`EmailSendError`].

use std::io;

use lettre::transport::smtp::response::Code;
use quickpack_email_contracts::EmailSendError;

/// Replies that reject the credentials or the way they were presented:
/// `530` authentication required, `534` mechanism too weak (Gmail sends it
/// when app passwords are needed), `535` credentials invalid and `538`
/// encryption required for the mechanism.
pub const AUTH_FAILURE_CODES: &[u16] = &[530, 534, 535, 538];

const NO_AUTH_MECHANISM: &str = "authentication mechanism";

pub fn classify(err: lettre::transport::smtp::Error) -> EmailSendError {
    let code = err.status().map(code_number);
    if code.is_none() {
        if err.is_client() && err.to_string().contains(NO_AUTH_MECHANISM) {
            return EmailSendError::Auth {
                code: None,
                source: err.into(),
            };
        }
        if err.is_timeout() {
            return EmailSendError::Connection(err.into());
        }
    }
    classify_error(code, err.into())
}

/// Classify a failed send given the SMTP status of the reply, if there was
/// one.
pub fn classify_error(code: Option<u16>, err: anyhow::Error) -> EmailSendError {
    if code.is_some_and(|code| AUTH_FAILURE_CODES.contains(&code)) {
        return EmailSendError::Auth { code, source: err };
    }

    if is_connection_error(&err) {
        return EmailSendError::Connection(err);
    }

    match code {
        Some(code) => EmailSendError::Provider { code, source: err },
        None => EmailSendError::Transient(err),
    }
}

fn is_connection_error(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<io::Error>())
        .any(|cause| {
            matches!(
                cause.kind(),
                io::ErrorKind::TimedOut | io::ErrorKind::ConnectionRefused
            )
        })
}

pub fn code_number(code: Code) -> u16 {
    code.severity as u16 * 100 + code.category as u16 * 10 + code.detail as u16
}
