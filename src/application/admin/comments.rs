use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::application::repos::{
    AccessToken, CommentPage, CommentQuery, CommentsRepo, RepoError,
};
use crate::domain::entities::CommentRecord;
use crate::domain::types::CommentStatus;

pub const ADMIN_COMMENT_PAGE_SIZE: u32 = 20;
const FETCH_BATCH: u32 = 100;

#[derive(Debug, Error)]
pub enum AdminCommentError {
    #[error("{0}")]
    ConstraintViolation(&'static str),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationAction {
    Approve,
    Reject,
    Delete,
}

impl ModerationAction {
    pub fn past_tense(self) -> &'static str {
        match self {
            Self::Approve => "approved",
            Self::Reject => "rejected",
            Self::Delete => "deleted",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommentCounts {
    pub all: u64,
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
}

impl CommentCounts {
    pub fn tally(comments: &[CommentRecord]) -> Self {
        comments.iter().fold(
            Self {
                all: comments.len() as u64,
                ..Self::default()
            },
            |mut counts, comment| {
                match comment.status {
                    CommentStatus::Pending => counts.pending += 1,
                    CommentStatus::Approved => counts.approved += 1,
                    CommentStatus::Rejected => counts.rejected += 1,
                }
                counts
            },
        )
    }

    pub fn for_status(&self, status: Option<CommentStatus>) -> u64 {
        match status {
            None => self.all,
            Some(CommentStatus::Pending) => self.pending,
            Some(CommentStatus::Approved) => self.approved,
            Some(CommentStatus::Rejected) => self.rejected,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModerationQueue {
    pub page: CommentPage,
    pub counts: CommentCounts,
}

impl ModerationQueue {
    fn build(
        all: Vec<CommentRecord>,
        status: Option<CommentStatus>,
        offset: u64,
        limit: u32,
    ) -> Self {
        let counts = CommentCounts::tally(&all);
        let matching: Vec<CommentRecord> = all
            .into_iter()
            .filter(|comment| status.is_none_or(|wanted| comment.status == wanted))
            .collect();
        let total = matching.len() as u64;
        let comments = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Self {
            page: CommentPage { comments, total },
            counts,
        }
    }
}

#[derive(Clone)]
pub struct AdminCommentService {
    comments: Arc<dyn CommentsRepo>,
}

impl AdminCommentService {
    pub fn new(comments: Arc<dyn CommentsRepo>) -> Self {
        Self { comments }
    }

    /// Every comment the API holds, fetched in batches.
    ///
    /// The comment listing endpoint takes only `limit` and `offset`, so status filtering and the
    /// per-status totals are computed here.
    pub async fn fetch_all(&self, token: &AccessToken) -> Result<Vec<CommentRecord>, AdminCommentError> {
        let mut comments = Vec::new();
        loop {
            let query = CommentQuery {
                limit: FETCH_BATCH,
                offset: comments.len() as u64,
            };
            let page = self.comments.list_comments(token, &query).await?;
            let received = page.comments.len();
            comments.extend(page.comments);
            if received < FETCH_BATCH as usize || comments.len() as u64 >= page.total {
                break;
            }
        }
        Ok(comments)
    }

    /// One page of the moderation queue plus the totals for every status tab.
    pub async fn list(
        &self,
        token: &AccessToken,
        status: Option<CommentStatus>,
        offset: u64,
    ) -> Result<ModerationQueue, AdminCommentError> {
        let all = self.fetch_all(token).await?;
        Ok(ModerationQueue::build(all, status, offset, ADMIN_COMMENT_PAGE_SIZE))
    }

    pub async fn counts(&self, token: &AccessToken) -> Result<CommentCounts, AdminCommentError> {
        let all = self.fetch_all(token).await?;
        Ok(CommentCounts::tally(&all))
    }

    pub async fn moderate(
        &self,
        token: &AccessToken,
        id: Uuid,
        action: ModerationAction,
    ) -> Result<(), AdminCommentError> {
        match action {
            ModerationAction::Approve => self.comments.approve_comment(token, id).await?,
            ModerationAction::Reject => self.comments.reject_comment(token, id).await?,
            ModerationAction::Delete => self.comments.delete_comment(token, id).await?,
        }
        info!(
            target = "quire::application::admin::comments",
            comment_id = %id,
            action = action.past_tense(),
            "comment moderated"
        );
        Ok(())
    }

    pub async fn update_content(
        &self,
        token: &AccessToken,
        id: Uuid,
        content: &str,
    ) -> Result<CommentRecord, AdminCommentError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AdminCommentError::ConstraintViolation(
                "Comment content cannot be empty",
            ));
        }
        let updated = self.comments.update_comment(token, id, content).await?;
        info!(
            target = "quire::application::admin::comments",
            comment_id = %id,
            "comment edited"
        );
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::application::repos::CommentSubmission;

    /// Listing endpoint that honours only `limit` and `offset`.
    struct PagedComments {
        comments: Vec<CommentRecord>,
        queries: Mutex<Vec<CommentQuery>>,
    }

    impl PagedComments {
        fn new(statuses: &[CommentStatus]) -> Self {
            let comments = statuses
                .iter()
                .enumerate()
                .map(|(index, status)| CommentRecord {
                    id: Uuid::new_v4(),
                    post_id: Uuid::nil(),
                    parent_id: None,
                    name: format!("Reader {index}"),
                    email: format!("reader{index}@example.com"),
                    website: String::new(),
                    content: "A thoughtful reply".to_string(),
                    status: *status,
                    created_at: None,
                    post: None,
                })
                .collect();
            Self {
                comments,
                queries: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CommentsRepo for PagedComments {
        async fn submit_comment(&self, _submission: &CommentSubmission) -> Result<(), RepoError> {
            Ok(())
        }

        async fn list_comments(
            &self,
            _token: &AccessToken,
            query: &CommentQuery,
        ) -> Result<CommentPage, RepoError> {
            self.queries.lock().expect("lock").push(query.clone());
            Ok(CommentPage {
                comments: self
                    .comments
                    .iter()
                    .skip(query.offset as usize)
                    .take(query.limit as usize)
                    .cloned()
                    .collect(),
                total: self.comments.len() as u64,
            })
        }

        async fn approve_comment(&self, _token: &AccessToken, _id: Uuid) -> Result<(), RepoError> {
            Ok(())
        }

        async fn reject_comment(&self, _token: &AccessToken, _id: Uuid) -> Result<(), RepoError> {
            Ok(())
        }

        async fn delete_comment(&self, _token: &AccessToken, _id: Uuid) -> Result<(), RepoError> {
            Ok(())
        }

        async fn update_comment(
            &self,
            _token: &AccessToken,
            _id: Uuid,
            _content: &str,
        ) -> Result<CommentRecord, RepoError> {
            Err(RepoError::NotFound)
        }
    }

    fn token() -> AccessToken {
        AccessToken::new("tok")
    }

    #[tokio::test]
    async fn counts_are_tallied_from_statuses() {
        let repo = Arc::new(PagedComments::new(&[
            CommentStatus::Pending,
            CommentStatus::Approved,
            CommentStatus::Approved,
        ]));
        let service = AdminCommentService::new(repo);

        let counts = service.counts(&token()).await.expect("counts");
        assert_eq!(
            counts,
            CommentCounts {
                all: 3,
                pending: 1,
                approved: 2,
                rejected: 0,
            }
        );
    }

    #[tokio::test]
    async fn status_filter_is_applied_locally() {
        let repo = Arc::new(PagedComments::new(&[
            CommentStatus::Approved,
            CommentStatus::Pending,
            CommentStatus::Rejected,
            CommentStatus::Pending,
        ]));
        let service = AdminCommentService::new(repo);

        let queue = service
            .list(&token(), Some(CommentStatus::Pending), 0)
            .await
            .expect("queue");
        assert_eq!(queue.page.total, 2);
        assert!(
            queue
                .page
                .comments
                .iter()
                .all(|comment| comment.status == CommentStatus::Pending)
        );
        assert_eq!(queue.counts.all, 4);
        assert_eq!(queue.counts.for_status(Some(CommentStatus::Rejected)), 1);
    }

    #[tokio::test]
    async fn fetch_walks_every_batch() {
        let statuses = vec![CommentStatus::Pending; FETCH_BATCH as usize + 5];
        let repo = Arc::new(PagedComments::new(&statuses));
        let service = AdminCommentService::new(repo.clone());

        let queue = service
            .list(&token(), None, u64::from(ADMIN_COMMENT_PAGE_SIZE))
            .await
            .expect("queue");
        assert_eq!(queue.page.total, FETCH_BATCH as u64 + 5);
        assert_eq!(queue.page.comments.len(), ADMIN_COMMENT_PAGE_SIZE as usize);

        let offsets: Vec<u64> = repo
            .queries
            .lock()
            .expect("lock")
            .iter()
            .map(|query| query.offset)
            .collect();
        assert_eq!(offsets, vec![0, u64::from(FETCH_BATCH)]);
    }
}
