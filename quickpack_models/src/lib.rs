pub mod contact;
pub mod email_address;
pub mod order;
pub mod submission;
pub mod validation;
