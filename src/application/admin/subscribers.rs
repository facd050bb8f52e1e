use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::application::repos::{AccessToken, NewsletterRepo, RepoError};
use crate::domain::entities::SubscriberRecord;

#[derive(Clone)]
pub struct AdminSubscriberService {
    repo: Arc<dyn NewsletterRepo>,
}

impl AdminSubscriberService {
    pub fn new(repo: Arc<dyn NewsletterRepo>) -> Self {
        Self { repo }
    }

    /// Subscribers, newest first.
    pub async fn list(&self, token: &AccessToken) -> Result<Vec<SubscriberRecord>, RepoError> {
        let mut subscribers = self.repo.list_subscribers(token).await?;
        subscribers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(subscribers)
    }

    pub async fn delete(&self, token: &AccessToken, id: Uuid) -> Result<(), RepoError> {
        self.repo.delete_subscriber(token, id).await?;
        info!(
            target = "quire::application::admin::subscribers",
            subscriber_id = %id,
            "subscriber removed"
        );
        Ok(())
    }
}
