use std::collections::HashMap;

use serde_json::{Map, Value};

/// The raw fields of a single form submission.
///
/// Fields come either from the JSON request body or, if the body is empty,
/// from the query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Submission(Map<String, Value>);

impl Submission {
    /// Merge the request body and the query parameters. A non-empty body
    /// always wins, the two sources are never combined.
    pub fn from_parts(body: Option<Map<String, Value>>, query: HashMap<String, String>) -> Self {
        match body {
            Some(body) if !body.is_empty() => Self(body),
            _ => Self(
                query
                    .into_iter()
                    .map(|(key, value)| (key, Value::String(value)))
                    .collect(),
            ),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Whether the field is set to something other than `null` or `""`.
    pub fn is_present(&self, field: &str) -> bool {
        self.get(field).and_then(text).is_some()
    }

    /// The field rendered as text, `None` if it is missing or empty.
    pub fn text(&self, field: &str) -> Option<String> {
        self.get(field).and_then(text)
    }
}

impl From<Map<String, Value>> for Submission {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}

/// Render a JSON value as text. Strings are taken verbatim, everything else
/// uses its JSON representation. `null` and empty strings yield `None`.
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
