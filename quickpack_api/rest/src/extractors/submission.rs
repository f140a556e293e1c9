use std::collections::HashMap;

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use quickpack_models::submission::Submission;
use serde_json::{Map, Value};

use crate::routes::error;

/// The fields of a form submission, taken from the request body if it has
/// any, otherwise from the query string.
pub struct RequestSubmission(pub Submission);

#[async_trait]
impl<S: Send + Sync> FromRequest<S> for RequestSubmission {
    type Rejection = Response;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = request.into_parts();

        let query = Query::<HashMap<String, String>>::from_request_parts(&mut parts, state)
            .await
            .map(|Query(query)| query)
            .unwrap_or_default();

        let kind = BodyKind::of(&parts.headers);
        let request = Request::from_parts(parts, body);

        let body = match kind {
            BodyKind::Json => {
                let bytes = Bytes::from_request(request, state)
                    .await
                    .map_err(IntoResponse::into_response)?;
                parse_json(&bytes).map_err(|_| invalid_body())?
            }
            BodyKind::Form => {
                let Form(fields) = Form::<HashMap<String, String>>::from_request(request, state)
                    .await
                    .map_err(|_| invalid_body())?;
                Some(
                    fields
                        .into_iter()
                        .map(|(key, value)| (key, Value::String(value)))
                        .collect(),
                )
            }
            BodyKind::Other => None,
        };

        Ok(Self(Submission::from_parts(body, query)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
    Other,
}

impl BodyKind {
    fn of(headers: &HeaderMap) -> Self {
        let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|h| h.to_str().ok()) else {
            return Self::Other;
        };

        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        if essence == "application/json" || essence.ends_with("+json") {
            Self::Json
        } else if essence == "application/x-www-form-urlencoded" {
            Self::Form
        } else {
            Self::Other
        }
    }
}

/// Valid JSON that is not an object is ignored.
fn parse_json(bytes: &[u8]) -> serde_json::Result<Option<Map<String, Value>>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    match serde_json::from_slice(bytes)? {
        Value::Object(map) => Ok(Some(map)),
        _ => Ok(None),
    }
}

fn invalid_body() -> Response {
    error(StatusCode::BAD_REQUEST, "Invalid request body")
}
