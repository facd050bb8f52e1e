use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::application::repos::{
    AccessToken, AdminPostQuery, ImageUpload, PostDraft, PostsRepo, PostsWriteRepo, RepoError,
};
use crate::domain::entities::PostRecord;
use crate::domain::posts::parse_tag_names;
use crate::domain::slug::{SlugError, generate_unique_slug, slugify_title};
use crate::domain::types::PostStatus;

pub const ADMIN_PAGE_SIZE: u32 = 20;
const SLUG_SCAN_LIMIT: u32 = 100;
const SEARCH_SCAN_LIMIT: u32 = 100;
const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

#[derive(Debug, Error)]
pub enum AdminPostError {
    #[error("{0}")]
    ConstraintViolation(&'static str),
    #[error("post not found")]
    NotFound,
    #[error(transparent)]
    Slug(#[from] SlugError),
    #[error(transparent)]
    Repo(RepoError),
}

impl From<RepoError> for AdminPostError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => Self::NotFound,
            other => Self::Repo(other),
        }
    }
}

/// Which submit button the editor pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveIntent {
    Draft,
    Publish,
    /// Keep the stored status (autosave and plain "Save").
    Keep,
}

impl SaveIntent {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("publish") => Self::Publish,
            Some("draft") => Self::Draft,
            _ => Self::Keep,
        }
    }

    fn status(self) -> Option<PostStatus> {
        match self {
            Self::Draft => Some(PostStatus::Draft),
            Self::Publish => Some(PostStatus::Published),
            Self::Keep => None,
        }
    }
}

/// Raw editor fields as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostForm {
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub body_markdown: String,
    pub featured_img: String,
    pub category: String,
    pub tags: String,
}

impl PostForm {
    pub fn from_record(post: &PostRecord) -> Self {
        Self {
            title: post.title.clone(),
            slug: post.slug.clone(),
            excerpt: post.excerpt.clone(),
            body_markdown: post.body_markdown.clone(),
            featured_img: post.featured_img.clone(),
            category: post
                .categories
                .first()
                .map(|category| category.name.clone())
                .unwrap_or_default(),
            tags: post.tags.join(", "),
        }
    }

    fn validate(&self) -> Result<(), AdminPostError> {
        if self.title.trim().is_empty() {
            return Err(AdminPostError::ConstraintViolation("Title is required"));
        }
        if self.body_markdown.trim().is_empty() {
            return Err(AdminPostError::ConstraintViolation("Content is required"));
        }
        Ok(())
    }

    /// Build the upstream payload. A blank slug stays `None` so the caller can fill it in.
    pub fn to_draft(&self, status: Option<PostStatus>) -> PostDraft {
        let slug = slugify_title(&self.slug);
        PostDraft {
            title: self.title.trim().to_string(),
            slug: (!slug.is_empty()).then_some(slug),
            body_markdown: self.body_markdown.clone(),
            excerpt: self.excerpt.trim().to_string(),
            featured_img: self.featured_img.trim().to_string(),
            status,
            category: self.category.trim().to_string(),
            tags: parse_tag_names(&self.tags),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminPostFilter {
    pub status: Option<PostStatus>,
    pub search: Option<String>,
    pub offset: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdminPostStatusCounts {
    pub all: u64,
    pub draft: u64,
    pub published: u64,
    pub archived: u64,
}

impl AdminPostStatusCounts {
    pub fn for_status(&self, status: Option<PostStatus>) -> u64 {
        match status {
            None => self.all,
            Some(PostStatus::Draft) => self.draft,
            Some(PostStatus::Published) => self.published,
            Some(PostStatus::Archived) => self.archived,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AdminPostListing {
    pub posts: Vec<PostRecord>,
    pub total: u64,
    pub offset: u64,
    pub limit: u32,
    pub counts: AdminPostStatusCounts,
}

#[derive(Clone)]
pub struct AdminPostService {
    reader: Arc<dyn PostsRepo>,
    writer: Arc<dyn PostsWriteRepo>,
}

impl AdminPostService {
    pub fn new(reader: Arc<dyn PostsRepo>, writer: Arc<dyn PostsWriteRepo>) -> Self {
        Self { reader, writer }
    }

    pub async fn list(
        &self,
        token: &AccessToken,
        filter: &AdminPostFilter,
    ) -> Result<AdminPostListing, AdminPostError> {
        let (counts, page) = futures::try_join!(
            self.status_counts(token),
            self.fetch_page(token, filter)
        )?;
        let (posts, total) = page;

        Ok(AdminPostListing {
            posts,
            total,
            offset: filter.offset,
            limit: ADMIN_PAGE_SIZE,
            counts,
        })
    }

    /// Title search runs over the newest posts locally; the upstream listing has no text filter.
    async fn fetch_page(
        &self,
        token: &AccessToken,
        filter: &AdminPostFilter,
    ) -> Result<(Vec<PostRecord>, u64), AdminPostError> {
        let Some(needle) = filter
            .search
            .as_deref()
            .map(|value| value.trim().to_lowercase())
            .filter(|value| !value.is_empty())
        else {
            let page = self
                .reader
                .list_all(
                    token,
                    &AdminPostQuery {
                        status: filter.status,
                        limit: ADMIN_PAGE_SIZE,
                        offset: filter.offset,
                    },
                )
                .await?;
            return Ok((page.posts, page.total));
        };

        let page = self
            .reader
            .list_all(
                token,
                &AdminPostQuery {
                    status: filter.status,
                    limit: SEARCH_SCAN_LIMIT,
                    offset: 0,
                },
            )
            .await?;
        let matches: Vec<PostRecord> = page
            .posts
            .into_iter()
            .filter(|post| post.title.to_lowercase().contains(&needle))
            .collect();
        let total = matches.len() as u64;
        let posts = matches
            .into_iter()
            .skip(filter.offset as usize)
            .take(ADMIN_PAGE_SIZE as usize)
            .collect();
        Ok((posts, total))
    }

    pub async fn status_counts(
        &self,
        token: &AccessToken,
    ) -> Result<AdminPostStatusCounts, AdminPostError> {
        let count = |status: Option<PostStatus>| async move {
            self.reader
                .list_all(
                    token,
                    &AdminPostQuery {
                        status,
                        limit: 1,
                        offset: 0,
                    },
                )
                .await
                .map(|page| page.total)
        };

        let (all, draft, published, archived) = futures::try_join!(
            count(None),
            count(Some(PostStatus::Draft)),
            count(Some(PostStatus::Published)),
            count(Some(PostStatus::Archived))
        )?;

        Ok(AdminPostStatusCounts {
            all,
            draft,
            published,
            archived,
        })
    }

    pub async fn recent(
        &self,
        token: &AccessToken,
        limit: usize,
    ) -> Result<Vec<PostRecord>, AdminPostError> {
        let page = self
            .reader
            .list_all(
                token,
                &AdminPostQuery {
                    status: None,
                    limit: SLUG_SCAN_LIMIT,
                    offset: 0,
                },
            )
            .await?;
        let mut posts = page.posts;
        posts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        posts.truncate(limit);
        Ok(posts)
    }

    pub async fn load(&self, token: &AccessToken, id: Uuid) -> Result<PostRecord, AdminPostError> {
        Ok(self.reader.find_by_id(token, id).await?)
    }

    pub async fn create(
        &self,
        token: &AccessToken,
        form: &PostForm,
        intent: SaveIntent,
    ) -> Result<PostRecord, AdminPostError> {
        form.validate()?;
        let status = intent.status().unwrap_or(PostStatus::Draft);
        let mut draft = form.to_draft(Some(status));

        if draft.slug.is_none() {
            let taken = self.known_slugs(token).await?;
            draft.slug = Some(generate_unique_slug(&draft.title, |candidate| {
                !taken.contains(candidate)
            })?);
        }

        let mut created = self.writer.create_post(token, &draft).await?;

        // Upstream creation always stores a draft and derives the slug from the title.
        if let Some(wanted) = draft.slug.as_deref() {
            if created.slug != wanted {
                created = self.writer.update_post(token, created.id, &draft).await?;
            }
        }
        if intent == SaveIntent::Publish && !created.is_published() {
            self.writer.publish_post(token, created.id).await?;
            created = self.reader.find_by_id(token, created.id).await?;
        }

        info!(
            target = "quire::application::admin::posts",
            post_id = %created.id,
            slug = %created.slug,
            status = %created.status,
            "post created"
        );
        Ok(created)
    }

    pub async fn update(
        &self,
        token: &AccessToken,
        id: Uuid,
        form: &PostForm,
        intent: SaveIntent,
    ) -> Result<PostRecord, AdminPostError> {
        form.validate()?;
        let draft = self.draft_for_update(token, id, form, intent).await?;
        let updated = self.writer.update_post(token, id, &draft).await?;
        info!(
            target = "quire::application::admin::posts",
            post_id = %updated.id,
            status = %updated.status,
            "post updated"
        );
        Ok(updated)
    }

    /// Save without form validation; autosave runs on half-written posts.
    pub async fn save_draft_silently(
        &self,
        token: &AccessToken,
        id: Uuid,
        form: &PostForm,
    ) -> Result<PostRecord, AdminPostError> {
        let draft = self
            .draft_for_update(token, id, form, SaveIntent::Keep)
            .await?;
        Ok(self.writer.update_post(token, id, &draft).await?)
    }

    async fn draft_for_update(
        &self,
        token: &AccessToken,
        id: Uuid,
        form: &PostForm,
        intent: SaveIntent,
    ) -> Result<PostDraft, AdminPostError> {
        let mut draft = form.to_draft(intent.status());
        if draft.slug.is_none() {
            let current = self.reader.find_by_id(token, id).await?;
            draft.slug = Some(current.slug);
        }
        Ok(draft)
    }

    pub async fn publish(&self, token: &AccessToken, id: Uuid) -> Result<(), AdminPostError> {
        self.writer.publish_post(token, id).await?;
        info!(target = "quire::application::admin::posts", post_id = %id, "post published");
        Ok(())
    }

    pub async fn unpublish(&self, token: &AccessToken, id: Uuid) -> Result<(), AdminPostError> {
        self.writer.unpublish_post(token, id).await?;
        info!(target = "quire::application::admin::posts", post_id = %id, "post unpublished");
        Ok(())
    }

    pub async fn delete(&self, token: &AccessToken, id: Uuid) -> Result<(), AdminPostError> {
        self.writer.delete_post(token, id).await?;
        info!(target = "quire::application::admin::posts", post_id = %id, "post deleted");
        Ok(())
    }

    pub async fn upload_featured_image(
        &self,
        token: &AccessToken,
        upload: ImageUpload,
    ) -> Result<String, AdminPostError> {
        if upload.bytes.is_empty() {
            return Err(AdminPostError::ConstraintViolation("Choose an image to upload"));
        }
        if !ALLOWED_IMAGE_TYPES.contains(&upload.content_type.as_str()) {
            return Err(AdminPostError::ConstraintViolation(
                "Only JPEG, PNG, GIF and WebP images are supported",
            ));
        }

        let url = self.writer.upload_featured_image(token, upload).await?;
        info!(
            target = "quire::application::admin::posts",
            url = %url,
            "featured image uploaded"
        );
        Ok(url)
    }

    async fn known_slugs(&self, token: &AccessToken) -> Result<HashSet<String>, AdminPostError> {
        let page = self
            .reader
            .list_all(
                token,
                &AdminPostQuery {
                    status: None,
                    limit: SLUG_SCAN_LIMIT,
                    offset: 0,
                },
            )
            .await?;
        Ok(page.posts.into_iter().map(|post| post.slug).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::application::repos::{PostPage, PublishedQuery};

    /// Mirrors the upstream create endpoint: new posts are drafts with a title-derived slug.
    #[derive(Default)]
    struct UpstreamPosts {
        posts: Mutex<Vec<PostRecord>>,
        updates: Mutex<Vec<(Uuid, PostDraft)>>,
        published: Mutex<Vec<Uuid>>,
    }

    fn record(title: &str, slug: &str) -> PostRecord {
        PostRecord {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            title: title.to_string(),
            excerpt: String::new(),
            body_markdown: String::new(),
            featured_img: String::new(),
            status: PostStatus::Draft,
            author: None,
            view_count: 0,
            categories: Vec::new(),
            tags: Vec::new(),
            comments: Vec::new(),
            published_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    impl UpstreamPosts {
        fn stored(&self, id: Uuid) -> Result<PostRecord, RepoError> {
            self.posts
                .lock()
                .expect("lock")
                .iter()
                .find(|post| post.id == id)
                .cloned()
                .ok_or(RepoError::NotFound)
        }
    }

    #[async_trait]
    impl PostsRepo for UpstreamPosts {
        async fn list_published(&self, _query: &PublishedQuery) -> Result<PostPage, RepoError> {
            Ok(PostPage::default())
        }

        async fn find_published(&self, _slug: &str) -> Result<PostRecord, RepoError> {
            Err(RepoError::NotFound)
        }

        async fn list_all(
            &self,
            _token: &AccessToken,
            _query: &AdminPostQuery,
        ) -> Result<PostPage, RepoError> {
            let posts = self.posts.lock().expect("lock").clone();
            Ok(PostPage {
                total: posts.len() as u64,
                posts,
            })
        }

        async fn find_by_id(&self, _token: &AccessToken, id: Uuid) -> Result<PostRecord, RepoError> {
            self.stored(id)
        }
    }

    #[async_trait]
    impl PostsWriteRepo for UpstreamPosts {
        async fn create_post(
            &self,
            _token: &AccessToken,
            draft: &PostDraft,
        ) -> Result<PostRecord, RepoError> {
            let created = record(&draft.title, &slugify_title(&draft.title));
            self.posts.lock().expect("lock").push(created.clone());
            Ok(created)
        }

        async fn update_post(
            &self,
            _token: &AccessToken,
            id: Uuid,
            draft: &PostDraft,
        ) -> Result<PostRecord, RepoError> {
            self.updates.lock().expect("lock").push((id, draft.clone()));
            let mut posts = self.posts.lock().expect("lock");
            let post = posts
                .iter_mut()
                .find(|post| post.id == id)
                .ok_or(RepoError::NotFound)?;
            if let Some(slug) = &draft.slug {
                post.slug = slug.clone();
            }
            Ok(post.clone())
        }

        async fn delete_post(&self, _token: &AccessToken, _id: Uuid) -> Result<(), RepoError> {
            Ok(())
        }

        async fn publish_post(&self, _token: &AccessToken, id: Uuid) -> Result<(), RepoError> {
            self.published.lock().expect("lock").push(id);
            let mut posts = self.posts.lock().expect("lock");
            if let Some(post) = posts.iter_mut().find(|post| post.id == id) {
                post.status = PostStatus::Published;
            }
            Ok(())
        }

        async fn unpublish_post(&self, _token: &AccessToken, _id: Uuid) -> Result<(), RepoError> {
            Ok(())
        }

        async fn upload_featured_image(
            &self,
            _token: &AccessToken,
            _upload: ImageUpload,
        ) -> Result<String, RepoError> {
            Ok(String::new())
        }
    }

    fn service(upstream: &Arc<UpstreamPosts>) -> AdminPostService {
        AdminPostService::new(upstream.clone(), upstream.clone())
    }

    fn form(title: &str, slug: &str) -> PostForm {
        PostForm {
            title: title.into(),
            slug: slug.into(),
            body_markdown: "Body".into(),
            ..PostForm::default()
        }
    }

    #[tokio::test]
    async fn publish_intent_publishes_new_post() {
        let upstream = Arc::new(UpstreamPosts::default());
        let created = service(&upstream)
            .create(&AccessToken::new("tok"), &form("Launch Day", ""), SaveIntent::Publish)
            .await
            .expect("created");

        assert_eq!(created.status, PostStatus::Published);
        assert_eq!(upstream.published.lock().expect("lock").as_slice(), [created.id]);
        assert!(upstream.updates.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn draft_intent_leaves_post_unpublished() {
        let upstream = Arc::new(UpstreamPosts::default());
        let created = service(&upstream)
            .create(&AccessToken::new("tok"), &form("Notes", ""), SaveIntent::Draft)
            .await
            .expect("created");

        assert_eq!(created.status, PostStatus::Draft);
        assert!(upstream.published.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn custom_slug_is_applied_after_create() {
        let upstream = Arc::new(UpstreamPosts::default());
        let created = service(&upstream)
            .create(
                &AccessToken::new("tok"),
                &form("Launch Day", "launch-notes"),
                SaveIntent::Draft,
            )
            .await
            .expect("created");

        assert_eq!(created.slug, "launch-notes");
        let updates = upstream.updates.lock().expect("lock");
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, created.id);
    }

    #[tokio::test]
    async fn unique_slug_survives_title_collision() {
        let upstream = Arc::new(UpstreamPosts::default());
        upstream
            .posts
            .lock()
            .expect("lock")
            .push(record("Launch Day", "launch-day"));

        let created = service(&upstream)
            .create(&AccessToken::new("tok"), &form("Launch Day", ""), SaveIntent::Draft)
            .await
            .expect("created");

        assert_ne!(created.slug, "launch-day");
        assert!(created.slug.starts_with("launch-day"));
    }

    #[test]
    fn intent_parses_submit_buttons() {
        assert_eq!(SaveIntent::parse(Some("publish")), SaveIntent::Publish);
        assert_eq!(SaveIntent::parse(Some("draft")), SaveIntent::Draft);
        assert_eq!(SaveIntent::parse(None), SaveIntent::Keep);
    }

    #[test]
    fn draft_normalises_slug_and_tags() {
        let form = PostForm {
            title: "  Hello World ".into(),
            slug: "My Custom Slug!".into(),
            tags: "rust, Web, rust,".into(),
            body_markdown: "body".into(),
            ..PostForm::default()
        };
        let draft = form.to_draft(Some(PostStatus::Draft));
        assert_eq!(draft.title, "Hello World");
        assert_eq!(draft.slug.as_deref(), Some("my-custom-slug"));
        assert_eq!(draft.tags, vec!["rust", "Web"]);
    }

    #[test]
    fn blank_slug_is_left_for_generation() {
        let form = PostForm {
            title: "Title".into(),
            slug: "  ".into(),
            ..PostForm::default()
        };
        assert_eq!(form.to_draft(None).slug, None);
    }

    #[test]
    fn validation_requires_title_and_body() {
        let form = PostForm {
            title: "Title".into(),
            ..PostForm::default()
        };
        assert!(matches!(
            form.validate(),
            Err(AdminPostError::ConstraintViolation("Content is required"))
        ));
    }
}
