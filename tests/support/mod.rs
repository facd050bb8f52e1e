#![allow(dead_code)]

//! In-memory stand-in for the remote content API plus router builders for the HTTP tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, Response, header};
use time::OffsetDateTime;
use uuid::Uuid;

use quire::application::admin::{
    chrome::AdminChromeService, comments::AdminCommentService, dashboard::AdminDashboardService,
    posts::AdminPostService, subscribers::AdminSubscriberService, taxonomy::AdminTaxonomyService,
};
use quire::application::auth::AuthService;
use quire::application::autosave::Autosaver;
use quire::application::chrome::ChromeService;
use quire::application::comments::CommentService;
use quire::application::feed::FeedService;
use quire::application::newsletter::NewsletterService;
use quire::application::repos::{
    AccessToken, AdminPostQuery, CategoryDraft, CommentPage, CommentQuery, CommentSubmission,
    CommentsRepo, HealthRepo, ImageUpload, NewsletterRepo, PostDraft, PostPage, PostsRepo,
    PostsWriteRepo, PublishedQuery, RepoError, Session, SessionRepo, TaxonomyRepo,
};
use quire::config::{SessionSettings, SiteSettings};
use quire::domain::entities::{
    CategoryRecord, CommentRecord, PostRecord, SubscriberRecord, TagRecord, UserRecord,
};
use quire::domain::types::{CommentStatus, PostStatus, UserRole};
use quire::infra::http::{AdminState, HttpState, build_admin_router, build_router};

pub const EDITOR_EMAIL: &str = "editor@example.com";
pub const EDITOR_PASSWORD: &str = "correct horse";
pub const EDITOR_TOKEN: &str = "token-editor";
pub const COOKIE_NAME: &str = "quire_session";

pub struct FakeApi {
    pub posts: Mutex<Vec<PostRecord>>,
    pub categories: Mutex<Vec<CategoryRecord>>,
    pub tags: Mutex<Vec<TagRecord>>,
    pub comments: Mutex<Vec<CommentRecord>>,
    pub submissions: Mutex<Vec<CommentSubmission>>,
    pub subscribers: Mutex<Vec<SubscriberRecord>>,
    pub subscribed: Mutex<Vec<String>>,
    pub published_calls: Mutex<Vec<Uuid>>,
    pub unavailable: AtomicBool,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            posts: Mutex::new(Vec::new()),
            categories: Mutex::new(Vec::new()),
            tags: Mutex::new(Vec::new()),
            comments: Mutex::new(Vec::new()),
            submissions: Mutex::new(Vec::new()),
            subscribers: Mutex::new(Vec::new()),
            subscribed: Mutex::new(Vec::new()),
            published_calls: Mutex::new(Vec::new()),
            unavailable: AtomicBool::new(false),
        }
    }
}

impl FakeApi {
    pub fn seeded() -> Arc<Self> {
        let api = Self::default();
        let rust = category("Rust", "#DEA584");
        {
            let mut posts = api.posts.lock().expect("posts lock");
            let mut first = post("hello-world", "Hello World", PostStatus::Published);
            first.categories = vec![rust.clone()];
            first.tags = vec!["intro".into(), "axum".into()];
            first.body_markdown = "# Hello\n\nFirst **post**.\n\n## Details\n\nMore.".into();
            first.comments = vec![
                comment(first.id, "Ada", "Lovely write-up, thanks!", CommentStatus::Approved),
                comment(first.id, "Spam", "Buy cheap watches now", CommentStatus::Pending),
            ];
            posts.push(first);
            posts.push(post("second-post", "Second Post", PostStatus::Published));
            posts.push(post("work-in-progress", "Work In Progress", PostStatus::Draft));
        }
        api.categories.lock().expect("categories lock").push(rust);
        api.tags.lock().expect("tags lock").extend([tag("intro"), tag("axum")]);
        Arc::new(api)
    }

    pub fn set_unavailable(&self, value: bool) {
        self.unavailable.store(value, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), RepoError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(RepoError::unavailable("connection refused"))
        } else {
            Ok(())
        }
    }

    fn authorize(&self, token: &AccessToken) -> Result<(), RepoError> {
        self.check()?;
        if token.expose() == EDITOR_TOKEN {
            Ok(())
        } else {
            Err(RepoError::Unauthorized)
        }
    }

    pub fn post_by_slug(&self, slug: &str) -> Option<PostRecord> {
        self.posts
            .lock()
            .expect("posts lock")
            .iter()
            .find(|post| post.slug == slug)
            .cloned()
    }

    fn update_post_with<F>(&self, id: Uuid, apply: F) -> Result<PostRecord, RepoError>
    where
        F: FnOnce(&mut PostRecord),
    {
        let mut posts = self.posts.lock().expect("posts lock");
        let post = posts
            .iter_mut()
            .find(|post| post.id == id)
            .ok_or(RepoError::NotFound)?;
        apply(post);
        Ok(post.clone())
    }
}

pub fn editor() -> UserRecord {
    UserRecord {
        id: Uuid::new_v4(),
        username: "editor".into(),
        email: EDITOR_EMAIL.into(),
        name: "Eddie Editor".into(),
        role: UserRole::Admin,
        is_active: true,
    }
}

pub fn post(slug: &str, title: &str, status: PostStatus) -> PostRecord {
    let now = OffsetDateTime::now_utc();
    PostRecord {
        id: Uuid::new_v4(),
        slug: slug.into(),
        title: title.into(),
        excerpt: format!("About {title}"),
        body_markdown: format!("Body of {title}."),
        featured_img: String::new(),
        status,
        author: Some(editor()),
        view_count: 3,
        categories: Vec::new(),
        tags: Vec::new(),
        comments: Vec::new(),
        published_at: (status == PostStatus::Published).then_some(now),
        created_at: Some(now),
        updated_at: Some(now),
    }
}

pub fn category(name: &str, color: &str) -> CategoryRecord {
    CategoryRecord {
        id: Uuid::new_v4(),
        name: name.into(),
        slug: name.to_lowercase(),
        description: format!("Posts about {name}"),
        color: color.into(),
    }
}

pub fn tag(name: &str) -> TagRecord {
    TagRecord {
        id: Uuid::new_v4(),
        name: name.into(),
        slug: name.to_lowercase(),
    }
}

pub fn comment(post_id: Uuid, name: &str, content: &str, status: CommentStatus) -> CommentRecord {
    CommentRecord {
        id: Uuid::new_v4(),
        post_id,
        parent_id: None,
        name: name.into(),
        email: format!("{}@example.com", name.to_lowercase()),
        website: String::new(),
        content: content.into(),
        status,
        created_at: Some(OffsetDateTime::now_utc()),
        post: None,
    }
}

fn page<T: Clone>(items: &[T], offset: u64, limit: u32) -> Vec<T> {
    items
        .iter()
        .skip(offset as usize)
        .take(limit.max(1) as usize)
        .cloned()
        .collect()
}

#[async_trait]
impl PostsRepo for FakeApi {
    async fn list_published(&self, query: &PublishedQuery) -> Result<PostPage, RepoError> {
        self.check()?;
        let posts = self.posts.lock().expect("posts lock");
        let matching: Vec<PostRecord> = posts
            .iter()
            .filter(|post| post.is_published())
            .filter(|post| {
                query
                    .category
                    .as_deref()
                    .is_none_or(|slug| post.in_category(slug))
            })
            .filter(|post| {
                query
                    .tags
                    .iter()
                    .all(|wanted| post.tags.iter().any(|tag| tag.eq_ignore_ascii_case(wanted)))
            })
            .filter(|post| {
                query.search.as_deref().is_none_or(|needle| {
                    post.title.to_lowercase().contains(&needle.to_lowercase())
                })
            })
            .cloned()
            .collect();
        Ok(PostPage {
            total: matching.len() as u64,
            posts: page(&matching, query.offset(), query.limit),
        })
    }

    async fn find_published(&self, slug: &str) -> Result<PostRecord, RepoError> {
        self.check()?;
        self.post_by_slug(slug)
            .filter(PostRecord::is_published)
            .ok_or(RepoError::NotFound)
    }

    async fn list_all(
        &self,
        token: &AccessToken,
        query: &AdminPostQuery,
    ) -> Result<PostPage, RepoError> {
        self.authorize(token)?;
        let posts = self.posts.lock().expect("posts lock");
        let matching: Vec<PostRecord> = posts
            .iter()
            .filter(|post| query.status.is_none_or(|status| post.status == status))
            .cloned()
            .collect();
        Ok(PostPage {
            total: matching.len() as u64,
            posts: page(&matching, query.offset, query.limit),
        })
    }

    async fn find_by_id(&self, token: &AccessToken, id: Uuid) -> Result<PostRecord, RepoError> {
        self.authorize(token)?;
        self.posts
            .lock()
            .expect("posts lock")
            .iter()
            .find(|post| post.id == id)
            .cloned()
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostsWriteRepo for FakeApi {
    async fn create_post(
        &self,
        token: &AccessToken,
        draft: &PostDraft,
    ) -> Result<PostRecord, RepoError> {
        self.authorize(token)?;
        let slug = draft
            .slug
            .clone()
            .unwrap_or_else(|| draft.title.to_lowercase().replace(' ', "-"));
        if self.post_by_slug(&slug).is_some() {
            return Err(RepoError::Rejected {
                status: 409,
                message: "Slug already exists".into(),
            });
        }
        let mut record = post(&slug, &draft.title, draft.status.unwrap_or(PostStatus::Draft));
        record.body_markdown = draft.body_markdown.clone();
        record.excerpt = draft.excerpt.clone();
        record.tags = draft.tags.clone();
        self.posts.lock().expect("posts lock").push(record.clone());
        Ok(record)
    }

    async fn update_post(
        &self,
        token: &AccessToken,
        id: Uuid,
        draft: &PostDraft,
    ) -> Result<PostRecord, RepoError> {
        self.authorize(token)?;
        self.update_post_with(id, |post| {
            post.title = draft.title.clone();
            if let Some(slug) = draft.slug.clone() {
                post.slug = slug;
            }
            post.body_markdown = draft.body_markdown.clone();
            post.excerpt = draft.excerpt.clone();
            post.featured_img = draft.featured_img.clone();
            post.tags = draft.tags.clone();
            if let Some(status) = draft.status {
                post.status = status;
            }
        })
    }

    async fn delete_post(&self, token: &AccessToken, id: Uuid) -> Result<(), RepoError> {
        self.authorize(token)?;
        let mut posts = self.posts.lock().expect("posts lock");
        let before = posts.len();
        posts.retain(|post| post.id != id);
        if posts.len() == before {
            Err(RepoError::NotFound)
        } else {
            Ok(())
        }
    }

    async fn publish_post(&self, token: &AccessToken, id: Uuid) -> Result<(), RepoError> {
        self.authorize(token)?;
        self.published_calls.lock().expect("calls lock").push(id);
        self.update_post_with(id, |post| {
            post.status = PostStatus::Published;
            post.published_at = Some(OffsetDateTime::now_utc());
        })
        .map(|_| ())
    }

    async fn unpublish_post(&self, token: &AccessToken, id: Uuid) -> Result<(), RepoError> {
        self.authorize(token)?;
        self.update_post_with(id, |post| post.status = PostStatus::Draft)
            .map(|_| ())
    }

    async fn upload_featured_image(
        &self,
        token: &AccessToken,
        upload: ImageUpload,
    ) -> Result<String, RepoError> {
        self.authorize(token)?;
        Ok(format!("/uploads/{}", upload.file_name))
    }
}

#[async_trait]
impl TaxonomyRepo for FakeApi {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError> {
        self.check()?;
        Ok(self.categories.lock().expect("categories lock").clone())
    }

    async fn list_tags(&self) -> Result<Vec<TagRecord>, RepoError> {
        self.check()?;
        Ok(self.tags.lock().expect("tags lock").clone())
    }

    async fn create_category(
        &self,
        token: &AccessToken,
        draft: &CategoryDraft,
    ) -> Result<CategoryRecord, RepoError> {
        self.authorize(token)?;
        let record = category(&draft.name, &draft.color);
        self.categories
            .lock()
            .expect("categories lock")
            .push(record.clone());
        Ok(record)
    }

    async fn update_category(
        &self,
        token: &AccessToken,
        id: Uuid,
        draft: &CategoryDraft,
    ) -> Result<CategoryRecord, RepoError> {
        self.authorize(token)?;
        let mut categories = self.categories.lock().expect("categories lock");
        let record = categories
            .iter_mut()
            .find(|category| category.id == id)
            .ok_or(RepoError::NotFound)?;
        record.name = draft.name.clone();
        record.description = draft.description.clone();
        record.color = draft.color.clone();
        Ok(record.clone())
    }

    async fn delete_category(&self, token: &AccessToken, id: Uuid) -> Result<(), RepoError> {
        self.authorize(token)?;
        self.categories
            .lock()
            .expect("categories lock")
            .retain(|category| category.id != id);
        Ok(())
    }

    async fn create_tag(&self, token: &AccessToken, name: &str) -> Result<TagRecord, RepoError> {
        self.authorize(token)?;
        let record = tag(name);
        self.tags.lock().expect("tags lock").push(record.clone());
        Ok(record)
    }

    async fn update_tag(
        &self,
        token: &AccessToken,
        id: Uuid,
        name: &str,
    ) -> Result<TagRecord, RepoError> {
        self.authorize(token)?;
        let mut tags = self.tags.lock().expect("tags lock");
        let record = tags
            .iter_mut()
            .find(|tag| tag.id == id)
            .ok_or(RepoError::NotFound)?;
        record.name = name.to_string();
        Ok(record.clone())
    }

    async fn delete_tag(&self, token: &AccessToken, id: Uuid) -> Result<(), RepoError> {
        self.authorize(token)?;
        self.tags.lock().expect("tags lock").retain(|tag| tag.id != id);
        Ok(())
    }
}

#[async_trait]
impl CommentsRepo for FakeApi {
    async fn submit_comment(&self, submission: &CommentSubmission) -> Result<(), RepoError> {
        self.check()?;
        self.submissions
            .lock()
            .expect("submissions lock")
            .push(submission.clone());
        Ok(())
    }

    async fn list_comments(
        &self,
        token: &AccessToken,
        query: &CommentQuery,
    ) -> Result<CommentPage, RepoError> {
        self.authorize(token)?;
        let comments = self.comments.lock().expect("comments lock");
        Ok(CommentPage {
            total: comments.len() as u64,
            comments: page(&comments, query.offset, query.limit),
        })
    }

    async fn approve_comment(&self, token: &AccessToken, id: Uuid) -> Result<(), RepoError> {
        self.authorize(token)?;
        set_comment_status(&self.comments, id, CommentStatus::Approved)
    }

    async fn reject_comment(&self, token: &AccessToken, id: Uuid) -> Result<(), RepoError> {
        self.authorize(token)?;
        set_comment_status(&self.comments, id, CommentStatus::Rejected)
    }

    async fn delete_comment(&self, token: &AccessToken, id: Uuid) -> Result<(), RepoError> {
        self.authorize(token)?;
        self.comments
            .lock()
            .expect("comments lock")
            .retain(|comment| comment.id != id);
        Ok(())
    }

    async fn update_comment(
        &self,
        token: &AccessToken,
        id: Uuid,
        content: &str,
    ) -> Result<CommentRecord, RepoError> {
        self.authorize(token)?;
        let mut comments = self.comments.lock().expect("comments lock");
        let record = comments
            .iter_mut()
            .find(|comment| comment.id == id)
            .ok_or(RepoError::NotFound)?;
        record.content = content.to_string();
        Ok(record.clone())
    }
}

fn set_comment_status(
    comments: &Mutex<Vec<CommentRecord>>,
    id: Uuid,
    status: CommentStatus,
) -> Result<(), RepoError> {
    let mut comments = comments.lock().expect("comments lock");
    let record = comments
        .iter_mut()
        .find(|comment| comment.id == id)
        .ok_or(RepoError::NotFound)?;
    record.status = status;
    Ok(())
}

#[async_trait]
impl NewsletterRepo for FakeApi {
    async fn subscribe(&self, email: &str) -> Result<(), RepoError> {
        self.check()?;
        self.subscribed
            .lock()
            .expect("subscribed lock")
            .push(email.to_string());
        Ok(())
    }

    async fn unsubscribe(&self, token: &str) -> Result<(), RepoError> {
        self.check()?;
        if token == "known-token" {
            Ok(())
        } else {
            Err(RepoError::NotFound)
        }
    }

    async fn list_subscribers(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<SubscriberRecord>, RepoError> {
        self.authorize(token)?;
        Ok(self.subscribers.lock().expect("subscribers lock").clone())
    }

    async fn delete_subscriber(&self, token: &AccessToken, id: Uuid) -> Result<(), RepoError> {
        self.authorize(token)?;
        self.subscribers
            .lock()
            .expect("subscribers lock")
            .retain(|subscriber| subscriber.id != id);
        Ok(())
    }
}

#[async_trait]
impl SessionRepo for FakeApi {
    async fn login(&self, email: &str, password: &str) -> Result<Session, RepoError> {
        self.check()?;
        if email == EDITOR_EMAIL && password == EDITOR_PASSWORD {
            Ok(Session {
                token: AccessToken::new(EDITOR_TOKEN),
                user: editor(),
            })
        } else {
            Err(RepoError::Unauthorized)
        }
    }

    async fn current_user(&self, token: &AccessToken) -> Result<UserRecord, RepoError> {
        self.authorize(token)?;
        Ok(editor())
    }

    async fn refresh(&self, token: &AccessToken) -> Result<AccessToken, RepoError> {
        self.authorize(token)?;
        Ok(AccessToken::new(EDITOR_TOKEN))
    }
}

#[async_trait]
impl HealthRepo for FakeApi {
    async fn ping(&self) -> Result<(), RepoError> {
        self.check()
    }
}

pub fn site_settings() -> SiteSettings {
    SiteSettings {
        title: "Quire".into(),
        description: "Notes, essays and tutorials.".into(),
        public_url: "http://localhost:3000".into(),
        footer: String::new(),
    }
}

pub fn session_settings() -> SessionSettings {
    SessionSettings {
        cookie_name: COOKIE_NAME.into(),
        secure: false,
        max_age_hours: std::num::NonZeroU32::new(24).expect("non-zero"),
    }
}

pub fn public_router(api: Arc<FakeApi>) -> axum::Router {
    let state = HttpState {
        feed: Arc::new(FeedService::new(
            api.clone(),
            api.clone(),
            "http://localhost:8080",
        )),
        chrome: Arc::new(ChromeService::new(site_settings())),
        comments: Arc::new(CommentService::new(api.clone())),
        newsletter: Arc::new(NewsletterService::new(api.clone())),
        health: api,
    };
    build_router(state)
}

pub fn admin_router(api: Arc<FakeApi>) -> axum::Router {
    let posts = AdminPostService::new(api.clone(), api.clone());
    let comments = AdminCommentService::new(api.clone());
    let subscribers = AdminSubscriberService::new(api.clone());
    let state = AdminState {
        chrome: Arc::new(AdminChromeService::new(site_settings())),
        auth: Arc::new(AuthService::new(api.clone())),
        dashboard: Arc::new(AdminDashboardService::new(
            posts.clone(),
            comments.clone(),
            subscribers.clone(),
        )),
        autosave: Arc::new(Autosaver::new(posts.clone(), Duration::from_millis(20))),
        posts: Arc::new(posts),
        comments: Arc::new(comments),
        taxonomy: Arc::new(AdminTaxonomyService::new(api.clone())),
        subscribers: Arc::new(subscribers),
        health: api,
        session: session_settings(),
        api_origin: "http://localhost:8080".into(),
    };
    build_admin_router(state, 1024 * 1024)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build")
}

pub fn get_with_session(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::COOKIE, format!("{COOKIE_NAME}={EDITOR_TOKEN}"))
        .body(Body::empty())
        .expect("request should build")
}

pub fn post_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

/// Form post carrying the editor's session cookie and the Datastar request header.
pub fn datastar_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::COOKIE, format!("{COOKIE_NAME}={EDITOR_TOKEN}"))
        .header("datastar-request", "true")
        .body(Body::from(body.to_string()))
        .expect("request should build")
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    String::from_utf8(bytes.to_vec()).expect("body should be utf-8")
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
