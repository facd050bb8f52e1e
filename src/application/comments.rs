use std::sync::Arc;

use metrics::counter;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::repos::{CommentSubmission, CommentsRepo, RepoError};
use crate::domain::comments::{CommentDraft, CommentFieldErrors};
use crate::infra::telemetry::COMMENT_SUBMISSIONS_TOTAL;

pub const COMMENT_SUBMITTED_MESSAGE: &str =
    "Your comment has been submitted successfully! It will be visible after moderation.";
pub const COMMENT_FAILED_MESSAGE: &str = "Failed to submit comment";

#[derive(Debug, Error)]
pub enum CommentError {
    #[error("comment failed validation")]
    Invalid(CommentFieldErrors),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Reader comments on published posts.
#[derive(Clone)]
pub struct CommentService {
    comments: Arc<dyn CommentsRepo>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentsRepo>) -> Self {
        Self { comments }
    }

    /// Validate `draft` and forward it for moderation.
    pub async fn submit(&self, post_id: Uuid, draft: &CommentDraft) -> Result<(), CommentError> {
        let comment = match draft.validate() {
            Ok(comment) => comment,
            Err(errors) => {
                counter!(COMMENT_SUBMISSIONS_TOTAL, "outcome" => "invalid").increment(1);
                return Err(CommentError::Invalid(errors));
            }
        };

        let submission = CommentSubmission {
            post_id,
            parent_id: None,
            comment,
        };

        match self.comments.submit_comment(&submission).await {
            Ok(()) => {
                counter!(COMMENT_SUBMISSIONS_TOTAL, "outcome" => "accepted").increment(1);
                info!(
                    target = "quire::application::comments",
                    post_id = %post_id,
                    "comment submitted for moderation"
                );
                Ok(())
            }
            Err(err) => {
                counter!(COMMENT_SUBMISSIONS_TOTAL, "outcome" => "failed").increment(1);
                warn!(
                    target = "quire::application::comments",
                    post_id = %post_id,
                    error = %err,
                    "comment submission failed"
                );
                Err(CommentError::Repo(err))
            }
        }
    }
}
