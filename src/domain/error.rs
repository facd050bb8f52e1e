use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("`{entity}` not found")]
    NotFound { entity: &'static str },
    #[error("validation failed: {message}")]
    Validation { message: String },
    #[error("invariant violated: {message}")]
    Invariant { message: String },
}

impl DomainError {
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant {
            message: message.into(),
        }
    }

    /// Whether the error stems from user input rather than broken state.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Validation { .. })
    }
}
