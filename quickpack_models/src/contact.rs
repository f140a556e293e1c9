use thiserror::Error;

use crate::{
    submission::Submission,
    validation::{check_required_fields, is_valid_email},
};

/// A validated submission of the contact form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactValidationError {
    #[error("{} are required", .0.join(", "))]
    MissingFields(Vec<String>),
    #[error("Invalid email format")]
    InvalidEmail,
}

impl ContactSubmission {
    pub const REQUIRED_FIELDS: &'static [&'static str] = &["name", "email", "message"];
}

impl TryFrom<&Submission> for ContactSubmission {
    type Error = ContactValidationError;

    fn try_from(data: &Submission) -> Result<Self, Self::Error> {
        let required = check_required_fields(data, Self::REQUIRED_FIELDS);
        if !required.ok {
            return Err(ContactValidationError::MissingFields(required.missing));
        }

        let field = |name: &str| data.text(name).unwrap_or_default();
        let (name, email, message) = (field("name"), field("email"), field("message"));

        if !is_valid_email(&email) {
            return Err(ContactValidationError::InvalidEmail);
        }

        Ok(Self {
            name,
            email,
            phone: data.text("phone"),
            message,
        })
    }
}
