use std::sync::Arc;

use axum::{
    Form, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use url::form_urlencoded;

use crate::{
    application::{
        chrome::ChromeService,
        comments::{COMMENT_FAILED_MESSAGE, COMMENT_SUBMITTED_MESSAGE, CommentError, CommentService},
        error::HttpError,
        feed::{BlogQuery, CategoriesQuery, CategorySort, FeedService},
        newsletter::{NewsletterError, NewsletterService, SubscribeOutcome},
        pagination::parse_page,
        repos::{HealthRepo, RepoError},
    },
    domain::{comments::CommentDraft, posts::parse_tag_names},
    presentation::views::{
        AboutTemplate, AboutView, BlogTemplate, CategoriesTemplate, FlashView, HomeTemplate,
        LayoutContext, PostTemplate, UnsubscribeTemplate, UnsubscribeView,
        encode_query_value, render_http_error_page, render_not_found_response,
        render_template_response,
    },
};

use super::{
    is_local_path,
    middleware::{log_responses, set_request_context},
    upstream_health_response,
};

#[derive(Clone)]
pub struct HttpState {
    pub feed: Arc<FeedService>,
    pub chrome: Arc<ChromeService>,
    pub comments: Arc<CommentService>,
    pub newsletter: Arc<NewsletterService>,
    pub health: Arc<dyn HealthRepo>,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/blog", get(blog))
        .route("/blog/{slug}", get(post_detail))
        .route("/blog/{slug}/comments", post(submit_comment))
        .route("/categories", get(categories))
        .route("/about", get(about))
        .route("/search", get(search))
        .route("/newsletter/subscribe", post(newsletter_subscribe))
        .route("/newsletter/unsubscribe/{token}", get(newsletter_unsubscribe))
        .route("/_health", get(public_health))
        .route(
            "/static/public/{*path}",
            get(crate::infra::assets::serve_public),
        )
        .route(
            "/static/common/{*path}",
            get(crate::infra::assets::serve_common),
        )
        .fallback(fallback)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

/// `?newsletter=` outcome left behind by the subscribe redirect.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FlashQuery {
    newsletter: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BlogParams {
    page: Option<String>,
    category: Option<String>,
    tags: Option<String>,
    q: Option<String>,
    newsletter: Option<String>,
}

impl BlogParams {
    fn to_query(&self) -> BlogQuery {
        BlogQuery {
            page: parse_page(self.page.as_deref()),
            category: non_blank(self.category.as_deref()),
            tags: self
                .tags
                .as_deref()
                .map(parse_tag_names)
                .unwrap_or_default(),
            search: non_blank(self.q.as_deref()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CategoriesParams {
    page: Option<String>,
    category: Option<String>,
    search: Option<String>,
    sort: Option<String>,
    newsletter: Option<String>,
}

impl CategoriesParams {
    fn to_query(&self) -> CategoriesQuery {
        CategoriesQuery {
            category: non_blank(self.category.as_deref()),
            search: non_blank(self.search.as_deref()),
            sort: CategorySort::parse(self.sort.as_deref()),
            page: parse_page(self.page.as_deref()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PostParams {
    comment: Option<String>,
    newsletter: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SearchParams {
    q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SubscribeForm {
    email: String,
    return_to: String,
}

async fn index(State(state): State<HttpState>, Query(flash): Query<FlashQuery>) -> Response {
    let chrome = state
        .chrome
        .load("/")
        .with_newsletter_flash(newsletter_flash(flash.newsletter.as_deref()));

    match state.feed.home().await {
        Ok(content) => {
            let view = LayoutContext::new(chrome, content);
            render_template_response(HomeTemplate { view }, StatusCode::OK)
        }
        Err(err) => render_http_error_page(chrome, err.into()),
    }
}

async fn blog(State(state): State<HttpState>, Query(params): Query<BlogParams>) -> Response {
    let query = params.to_query();
    let chrome = state
        .chrome
        .load(&query.href(query.page))
        .with_title("Blog")
        .with_newsletter_flash(newsletter_flash(params.newsletter.as_deref()));

    match state.feed.blog(&query).await {
        Ok(content) => {
            let chrome = chrome.with_title(&content.heading);
            let view = LayoutContext::new(chrome, content);
            render_template_response(BlogTemplate { view }, StatusCode::OK)
        }
        Err(err) => render_http_error_page(chrome, err.into()),
    }
}

async fn categories(
    State(state): State<HttpState>,
    Query(params): Query<CategoriesParams>,
) -> Response {
    let query = params.to_query();
    let chrome = state
        .chrome
        .load(&query.href(query.page))
        .with_newsletter_flash(newsletter_flash(params.newsletter.as_deref()));

    match state.feed.categories(&query).await {
        Ok(content) => {
            let chrome = chrome.with_title(&content.heading);
            let view = LayoutContext::new(chrome, content);
            render_template_response(CategoriesTemplate { view }, StatusCode::OK)
        }
        Err(err) => render_http_error_page(chrome, err.into()),
    }
}

async fn post_detail(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
    Query(params): Query<PostParams>,
) -> Response {
    let chrome = state
        .chrome
        .load(&post_path(&slug))
        .with_newsletter_flash(newsletter_flash(params.newsletter.as_deref()));

    match state.feed.post_detail(&slug).await {
        Ok(mut content) => {
            if params.comment.as_deref() == Some("submitted") {
                content.form.notice = Some(FlashView::success(COMMENT_SUBMITTED_MESSAGE));
            }
            let chrome = chrome
                .with_title(&content.title)
                .with_description(&content.excerpt);
            let view = LayoutContext::new(chrome, content);
            render_template_response(PostTemplate { view }, StatusCode::OK)
        }
        Err(err) => render_http_error_page(chrome, err.into()),
    }
}

async fn submit_comment(
    State(state): State<HttpState>,
    Path(slug): Path<String>,
    Form(draft): Form<CommentDraft>,
) -> Response {
    let chrome = state.chrome.load(&post_path(&slug));

    let post = match state.feed.find_post(&slug).await {
        Ok(post) => post,
        Err(err) => return render_http_error_page(chrome, err.into()),
    };

    let (status, errors, notice) = match state.comments.submit(post.id, &draft).await {
        Ok(()) => {
            let target = format!("{}?comment=submitted#comments", post_path(&post.slug));
            return Redirect::to(&target).into_response();
        }
        Err(CommentError::Invalid(errors)) => (StatusCode::UNPROCESSABLE_ENTITY, errors, None),
        Err(CommentError::Repo(err)) => {
            let status = match &err {
                RepoError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::BAD_GATEWAY,
            };
            let message = err.user_message().unwrap_or(COMMENT_FAILED_MESSAGE).to_string();
            (status, Default::default(), Some(FlashView::error(message)))
        }
    };

    let mut content = match state.feed.post_context(&post) {
        Ok(content) => content,
        Err(err) => return render_http_error_page(chrome, err.into()),
    };
    content.form.values = draft;
    content.form.errors = errors;
    content.form.notice = notice;

    let chrome = chrome
        .with_title(&content.title)
        .with_description(&content.excerpt);
    let view = LayoutContext::new(chrome, content);
    render_template_response(PostTemplate { view }, status)
}

async fn about(State(state): State<HttpState>, Query(flash): Query<FlashQuery>) -> Response {
    let chrome = state
        .chrome
        .load("/about")
        .with_title("About")
        .with_newsletter_flash(newsletter_flash(flash.newsletter.as_deref()));
    let site = state.chrome.site();
    let content = AboutView {
        title: format!("About {}", site.title),
        description: site.description.clone(),
    };
    let view = LayoutContext::new(chrome, content);
    render_template_response(AboutTemplate { view }, StatusCode::OK)
}

async fn search(Query(params): Query<SearchParams>) -> Redirect {
    let query = BlogQuery {
        page: 1,
        search: non_blank(params.q.as_deref()),
        ..BlogQuery::default()
    };
    Redirect::to(&query.href(1))
}

async fn newsletter_subscribe(
    State(state): State<HttpState>,
    Form(form): Form<SubscribeForm>,
) -> Redirect {
    let outcome = state.newsletter.subscribe_outcome(&form.email).await;
    Redirect::to(&newsletter_redirect(&form.return_to, outcome))
}

async fn newsletter_unsubscribe(
    State(state): State<HttpState>,
    Path(token): Path<String>,
) -> Response {
    let chrome = state.chrome.load("/newsletter/unsubscribe");

    let (status, content) = match state.newsletter.unsubscribe(&token).await {
        Ok(()) => (
            StatusCode::OK,
            UnsubscribeView {
                succeeded: true,
                title: "You have been unsubscribed".to_string(),
                message: "You will no longer receive newsletter emails from us.".to_string(),
            },
        ),
        Err(NewsletterError::Invalid(_)) | Err(NewsletterError::Repo(RepoError::NotFound)) => (
            StatusCode::NOT_FOUND,
            UnsubscribeView {
                succeeded: false,
                title: "Link not recognised".to_string(),
                message: "This unsubscribe link is invalid or has already been used.".to_string(),
            },
        ),
        Err(NewsletterError::Repo(err)) => {
            let error = HttpError::from_error(
                "infra::http::public::newsletter_unsubscribe",
                StatusCode::SERVICE_UNAVAILABLE,
                "Service temporarily unavailable",
                &err,
            );
            return render_http_error_page(chrome, error);
        }
    };

    let chrome = chrome.with_title(&content.title);
    let view = LayoutContext::new(chrome, content);
    render_template_response(UnsubscribeTemplate { view }, status)
}

async fn public_health(State(state): State<HttpState>) -> Response {
    upstream_health_response(&state.health).await
}

async fn fallback(State(state): State<HttpState>) -> Response {
    render_not_found_response(state.chrome.load(""))
}

fn newsletter_flash(raw: Option<&str>) -> Option<FlashView> {
    let outcome = SubscribeOutcome::parse(raw?)?;
    Some(if outcome.is_success() {
        FlashView::success(outcome.message())
    } else {
        FlashView::error(outcome.message())
    })
}

/// Target of the post-subscribe redirect: the page the form was on, with `newsletter=<outcome>`
/// replacing any earlier outcome. Anything other than a local path falls back to `/`.
fn newsletter_redirect(return_to: &str, outcome: SubscribeOutcome) -> String {
    let return_to = return_to.trim();
    let return_to = if is_local_path(return_to) {
        return_to
    } else {
        "/"
    };
    let return_to = return_to.split('#').next().unwrap_or("/");
    let (path, query) = return_to.split_once('?').unwrap_or((return_to, ""));

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if key != "newsletter" {
            serializer.append_pair(&key, &value);
        }
    }
    serializer.append_pair("newsletter", outcome.as_str());
    format!("{path}?{}#newsletter", serializer.finish())
}

fn post_path(slug: &str) -> String {
    format!("/blog/{}", encode_query_value(slug).replace('+', "%20"))
}

fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
