//! Adapter traits describing the remote content API.
//!
//! Every service talks to these traits rather than to HTTP directly so the routers can be exercised
//! against in-memory fakes. Calls that mutate content or read drafts take an [`AccessToken`].

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::comments::ValidComment;
use crate::domain::entities::{
    CategoryRecord, CommentRecord, PostRecord, SubscriberRecord, TagRecord, UserRecord,
};
use crate::domain::types::PostStatus;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("upstream unavailable: {0}")]
    Unavailable(String),
    #[error("upstream rejected the credentials")]
    Unauthorized,
    #[error("resource not found")]
    NotFound,
    #[error("upstream rejected the request with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("failed to decode upstream response: {0}")]
    Decode(String),
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl RepoError {
    pub fn unavailable(err: impl fmt::Display) -> Self {
        Self::Unavailable(err.to_string())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Message safe to show to an editor, when the upstream supplied one.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } | Self::InvalidInput { message } => {
                Some(message.as_str())
            }
            _ => None,
        }
    }
}

/// Bearer token issued by the upstream login endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Authenticated editor.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: AccessToken,
    pub user: UserRecord,
}

/// Filters for the public post listing. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedQuery {
    pub page: u32,
    pub limit: u32,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub search: Option<String>,
}

impl PublishedQuery {
    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit,
            category: None,
            tags: Vec::new(),
            search: None,
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

/// Filters for the admin post listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminPostQuery {
    pub status: Option<PostStatus>,
    pub limit: u32,
    pub offset: u64,
}

#[derive(Debug, Clone, Default)]
pub struct PostPage {
    pub posts: Vec<PostRecord>,
    pub total: u64,
}

/// Fields an editor submits for a post. `category` is a single name and may be blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub slug: Option<String>,
    pub body_markdown: String,
    pub excerpt: String,
    pub featured_img: String,
    pub status: Option<PostStatus>,
    pub category: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone)]
pub struct CommentSubmission {
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub comment: ValidComment,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentQuery {
    pub limit: u32,
    pub offset: u64,
}

#[derive(Debug, Clone, Default)]
pub struct CommentPage {
    pub comments: Vec<CommentRecord>,
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub description: String,
    pub color: String,
}

#[async_trait]
pub trait PostsRepo: Send + Sync {
    async fn list_published(&self, query: &PublishedQuery) -> Result<PostPage, RepoError>;

    async fn find_published(&self, slug: &str) -> Result<PostRecord, RepoError>;

    async fn list_all(
        &self,
        token: &AccessToken,
        query: &AdminPostQuery,
    ) -> Result<PostPage, RepoError>;

    async fn find_by_id(&self, token: &AccessToken, id: Uuid) -> Result<PostRecord, RepoError>;
}

#[async_trait]
pub trait PostsWriteRepo: Send + Sync {
    async fn create_post(
        &self,
        token: &AccessToken,
        draft: &PostDraft,
    ) -> Result<PostRecord, RepoError>;

    async fn update_post(
        &self,
        token: &AccessToken,
        id: Uuid,
        draft: &PostDraft,
    ) -> Result<PostRecord, RepoError>;

    async fn delete_post(&self, token: &AccessToken, id: Uuid) -> Result<(), RepoError>;

    async fn publish_post(&self, token: &AccessToken, id: Uuid) -> Result<(), RepoError>;

    async fn unpublish_post(&self, token: &AccessToken, id: Uuid) -> Result<(), RepoError>;

    /// Store an image and return the URL the post should reference.
    async fn upload_featured_image(
        &self,
        token: &AccessToken,
        upload: ImageUpload,
    ) -> Result<String, RepoError>;
}

#[async_trait]
pub trait TaxonomyRepo: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError>;

    async fn list_tags(&self) -> Result<Vec<TagRecord>, RepoError>;

    async fn create_category(
        &self,
        token: &AccessToken,
        draft: &CategoryDraft,
    ) -> Result<CategoryRecord, RepoError>;

    async fn update_category(
        &self,
        token: &AccessToken,
        id: Uuid,
        draft: &CategoryDraft,
    ) -> Result<CategoryRecord, RepoError>;

    async fn delete_category(&self, token: &AccessToken, id: Uuid) -> Result<(), RepoError>;

    async fn create_tag(&self, token: &AccessToken, name: &str) -> Result<TagRecord, RepoError>;

    async fn update_tag(
        &self,
        token: &AccessToken,
        id: Uuid,
        name: &str,
    ) -> Result<TagRecord, RepoError>;

    async fn delete_tag(&self, token: &AccessToken, id: Uuid) -> Result<(), RepoError>;
}

#[async_trait]
pub trait CommentsRepo: Send + Sync {
    async fn submit_comment(&self, submission: &CommentSubmission) -> Result<(), RepoError>;

    async fn list_comments(
        &self,
        token: &AccessToken,
        query: &CommentQuery,
    ) -> Result<CommentPage, RepoError>;

    async fn approve_comment(&self, token: &AccessToken, id: Uuid) -> Result<(), RepoError>;

    async fn reject_comment(&self, token: &AccessToken, id: Uuid) -> Result<(), RepoError>;

    async fn delete_comment(&self, token: &AccessToken, id: Uuid) -> Result<(), RepoError>;

    async fn update_comment(
        &self,
        token: &AccessToken,
        id: Uuid,
        content: &str,
    ) -> Result<CommentRecord, RepoError>;
}

#[async_trait]
pub trait NewsletterRepo: Send + Sync {
    async fn subscribe(&self, email: &str) -> Result<(), RepoError>;

    async fn unsubscribe(&self, token: &str) -> Result<(), RepoError>;

    async fn list_subscribers(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<SubscriberRecord>, RepoError>;

    async fn delete_subscriber(&self, token: &AccessToken, id: Uuid) -> Result<(), RepoError>;
}

#[async_trait]
pub trait SessionRepo: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<Session, RepoError>;

    async fn current_user(&self, token: &AccessToken) -> Result<UserRecord, RepoError>;

    async fn refresh(&self, token: &AccessToken) -> Result<AccessToken, RepoError>;
}

#[async_trait]
pub trait HealthRepo: Send + Sync {
    async fn ping(&self) -> Result<(), RepoError>;
}
