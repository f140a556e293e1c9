use std::sync::LazyLock;

use regex::Regex;

use crate::submission::Submission;

/// Intentionally permissive, `local@domain.tld` with no whitespace or
/// additional `@` in any of the parts.
pub static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredFields {
    pub ok: bool,
    /// The missing fields, in the order they were requested in.
    pub missing: Vec<String>,
}

pub fn check_required_fields(data: &Submission, fields: &[&str]) -> RequiredFields {
    let missing = fields
        .iter()
        .filter(|&&field| !data.is_present(field))
        .map(|&field| field.to_owned())
        .collect::<Vec<_>>();

    RequiredFields {
        ok: missing.is_empty(),
        missing,
    }
}
