//! Newsletter sign-up rule.

use crate::domain::error::DomainError;

pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address";

/// Accept any non-blank address containing `@`; the upstream does the real check.
pub fn validate_subscriber_email(raw: &str) -> Result<String, DomainError> {
    let email = raw.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(DomainError::validation(INVALID_EMAIL_MESSAGE));
    }
    Ok(email.to_string())
}
