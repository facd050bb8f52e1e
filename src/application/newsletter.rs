use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::application::repos::{NewsletterRepo, RepoError};
use crate::domain::error::DomainError;
use crate::domain::newsletter::validate_subscriber_email;

pub const SUBSCRIBED_MESSAGE: &str = "Successfully subscribed!";
pub const SUBSCRIBE_FAILED_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Error)]
pub enum NewsletterError {
    #[error(transparent)]
    Invalid(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Result of a sign-up attempt, carried back to the page through the `newsletter` query value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Subscribed,
    Invalid,
    Failed,
}

impl SubscribeOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Subscribed => "subscribed",
            Self::Invalid => "invalid",
            Self::Failed => "failed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "subscribed" => Some(Self::Subscribed),
            "invalid" => Some(Self::Invalid),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Subscribed => SUBSCRIBED_MESSAGE,
            Self::Invalid => crate::domain::newsletter::INVALID_EMAIL_MESSAGE,
            Self::Failed => SUBSCRIBE_FAILED_MESSAGE,
        }
    }

    pub fn is_success(self) -> bool {
        self == Self::Subscribed
    }
}

#[derive(Clone)]
pub struct NewsletterService {
    repo: Arc<dyn NewsletterRepo>,
}

impl NewsletterService {
    pub fn new(repo: Arc<dyn NewsletterRepo>) -> Self {
        Self { repo }
    }

    pub async fn subscribe(&self, email: &str) -> Result<(), NewsletterError> {
        let email = validate_subscriber_email(email)?;
        self.repo.subscribe(&email).await?;
        Ok(())
    }

    /// Run a sign-up and fold the result into the outcome shown to the reader.
    pub async fn subscribe_outcome(&self, email: &str) -> SubscribeOutcome {
        match self.subscribe(email).await {
            Ok(()) => SubscribeOutcome::Subscribed,
            Err(NewsletterError::Invalid(_)) => SubscribeOutcome::Invalid,
            Err(NewsletterError::Repo(err)) => {
                warn!(
                    target = "quire::application::newsletter",
                    error = %err,
                    "newsletter subscription failed"
                );
                SubscribeOutcome::Failed
            }
        }
    }

    pub async fn unsubscribe(&self, token: &str) -> Result<(), NewsletterError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(DomainError::validation("Unsubscribe link is incomplete").into());
        }
        self.repo.unsubscribe(token).await?;
        Ok(())
    }
}
