use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::application::repos::{AccessToken, RepoError, Session, SessionRepo};
use crate::domain::entities::UserRecord;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email and password are required")]
    MissingCredentials,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("session expired or invalid")]
    Unauthorized,
    #[error("account `{0}` is disabled")]
    Inactive(String),
    #[error(transparent)]
    Repo(RepoError),
}

impl AuthError {
    /// Text for the login form.
    pub fn login_message(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "Email and password are required",
            Self::InvalidCredentials | Self::Unauthorized => "Invalid email or password",
            Self::Inactive(_) => "This account has been disabled",
            Self::Repo(RepoError::Unavailable(_)) => {
                "The content service is unavailable. Please try again later."
            }
            Self::Repo(_) => "Login failed. Please try again.",
        }
    }
}

/// Editor sign-in against the upstream token endpoints.
#[derive(Clone)]
pub struct AuthService {
    sessions: Arc<dyn SessionRepo>,
}

impl AuthService {
    pub fn new(sessions: Arc<dyn SessionRepo>) -> Self {
        Self { sessions }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let session = self
            .sessions
            .login(email, password)
            .await
            .map_err(|err| match err {
                RepoError::Unauthorized | RepoError::NotFound => AuthError::InvalidCredentials,
                RepoError::Rejected { status: 400, .. } => AuthError::InvalidCredentials,
                other => AuthError::Repo(other),
            })?;

        ensure_active(&session.user)?;
        info!(
            target = "quire::application::auth",
            user = %session.user.username,
            "editor signed in"
        );
        Ok(session)
    }

    /// Resolve the editor behind `token`, rejecting revoked tokens and disabled accounts.
    pub async fn verify(&self, token: &AccessToken) -> Result<UserRecord, AuthError> {
        let user = self
            .sessions
            .current_user(token)
            .await
            .map_err(|err| match err {
                RepoError::Unauthorized | RepoError::NotFound => AuthError::Unauthorized,
                other => AuthError::Repo(other),
            })?;
        ensure_active(&user)?;
        debug!(
            target = "quire::application::auth",
            user = %user.username,
            "session verified"
        );
        Ok(user)
    }

    pub async fn refresh(&self, token: &AccessToken) -> Result<AccessToken, AuthError> {
        self.sessions
            .refresh(token)
            .await
            .map_err(|err| match err {
                RepoError::Unauthorized => AuthError::Unauthorized,
                other => AuthError::Repo(other),
            })
    }
}

fn ensure_active(user: &UserRecord) -> Result<(), AuthError> {
    if user.is_active {
        Ok(())
    } else {
        Err(AuthError::Inactive(user.username.clone()))
    }
}
