use crate::application::error::{ErrorReport, HttpError};
use crate::application::pagination::PageWindow;
use crate::domain::comments::{CommentDraft, CommentFieldErrors};
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response(chrome: LayoutChrome) -> Response {
    render_error_page(
        chrome,
        ErrorPageView::not_found(),
        StatusCode::NOT_FOUND,
        ErrorReport::from_message(
            "presentation::views::render_not_found_response",
            StatusCode::NOT_FOUND,
            "Resource not found",
        ),
    )
}

/// Full error page for a failure that already carries a report; the report is kept on the response
/// so the access log still sees the cause.
pub fn render_http_error_page(chrome: LayoutChrome, error: HttpError) -> Response {
    let status = error.status();
    let content = match status {
        StatusCode::NOT_FOUND => ErrorPageView::not_found(),
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => ErrorPageView::unavailable(),
        _ => ErrorPageView::internal(),
    };
    render_error_page(chrome, content, status, error.report().clone())
}

fn render_error_page(
    chrome: LayoutChrome,
    content: ErrorPageView,
    status: StatusCode,
    report: ErrorReport,
) -> Response {
    let chrome = chrome.with_title(&content.title);
    let view = LayoutContext::new(chrome, content);
    let mut response = render_template_response(ErrorTemplate { view }, status);
    report.attach(&mut response);
    response
}

#[derive(Clone)]
pub struct NavigationView {
    pub entries: Vec<NavigationLinkView>,
}

#[derive(Clone)]
pub struct NavigationLinkView {
    pub label: String,
    pub href: String,
    pub is_active: bool,
}

#[derive(Clone)]
pub struct BrandView {
    pub title: String,
    pub href: String,
}

#[derive(Clone)]
pub struct FooterView {
    pub copy: String,
    pub description: String,
    pub newsletter: NewsletterBlockView,
}

/// Subscribe form rendered in every page footer.
#[derive(Clone, Default)]
pub struct NewsletterBlockView {
    pub return_to: String,
    pub flash: Option<FlashView>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlashView {
    pub tone: &'static str,
    pub message: String,
}

impl FlashView {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            tone: "success",
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            tone: "error",
            message: message.into(),
        }
    }
}

#[derive(Clone)]
pub struct PageMetaView {
    pub title: String,
    pub description: String,
    pub canonical: String,
}

impl PageMetaView {
    pub fn with_canonical(self, canonical: String) -> Self {
        Self { canonical, ..self }
    }
}

#[derive(Clone)]
pub struct LayoutChrome {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub meta: PageMetaView,
}

impl LayoutChrome {
    pub fn with_canonical(self, canonical: String) -> Self {
        Self {
            meta: self.meta.with_canonical(canonical),
            ..self
        }
    }

    /// Prefix the document title with a page name, keeping the site title as suffix.
    pub fn with_title(mut self, page: &str) -> Self {
        if !page.is_empty() {
            self.meta.title = format!("{page} · {}", self.brand.title);
        }
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        if !description.trim().is_empty() {
            self.meta.description = description.trim().to_string();
        }
        self
    }

    pub fn with_newsletter_flash(mut self, flash: Option<FlashView>) -> Self {
        self.footer.newsletter.flash = flash;
        self
    }
}

#[derive(Clone)]
pub struct LayoutContext<T> {
    pub brand: BrandView,
    pub navigation: NavigationView,
    pub footer: FooterView,
    pub meta: PageMetaView,
    pub content: T,
}

impl<T> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, content: T) -> Self {
        Self {
            brand: chrome.brand,
            navigation: chrome.navigation,
            footer: chrome.footer,
            meta: chrome.meta,
            content,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryBadge {
    pub name: String,
    pub slug: String,
    pub color: String,
    pub href: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagBadge {
    pub label: String,
    pub href: String,
}

#[derive(Clone, Debug)]
pub struct PostCard {
    pub slug: String,
    pub href: String,
    pub title: String,
    pub excerpt: String,
    pub image_url: String,
    pub date: String,
    pub iso_date: String,
    pub reading_time: String,
    pub author: String,
    pub categories: Vec<CategoryBadge>,
    pub tags: Vec<TagBadge>,
}

/// A link in a filter bar (category chips, sort options).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterLinkView {
    pub label: String,
    pub value: String,
    pub href: String,
    pub is_active: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageLinkView {
    pub number: u32,
    pub href: String,
    pub is_current: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaginationView {
    pub current: u32,
    pub total_pages: u32,
    pub previous: Option<String>,
    pub next: Option<String>,
    pub pages: Vec<PageLinkView>,
}

impl PaginationView {
    /// Links for every page of `window`. Nothing is rendered for single-page listings.
    pub fn build(window: &PageWindow, href_for: impl Fn(u32) -> String) -> Option<Self> {
        let total_pages = window.total_pages();
        if total_pages <= 1 {
            return None;
        }

        let pages = (1..=total_pages)
            .map(|number| PageLinkView {
                number,
                href: href_for(number),
                is_current: number == window.page,
            })
            .collect();

        Some(Self {
            current: window.page,
            total_pages,
            previous: window.previous().map(&href_for),
            next: window.next().map(&href_for),
            pages,
        })
    }
}

pub struct HomeContext {
    pub featured_lead: Vec<PostCard>,
    pub featured_rest: Vec<PostCard>,
    pub recent: Vec<PostCard>,
    pub categories: Vec<CategoryBadge>,
    pub has_posts: bool,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub view: LayoutContext<HomeContext>,
}

pub struct BlogContext {
    pub heading: String,
    pub posts: Vec<PostCard>,
    pub total: u64,
    pub has_results: bool,
    pub search: String,
    pub tags: String,
    pub active_category: String,
    pub categories: Vec<FilterLinkView>,
    pub pagination: Option<PaginationView>,
    pub is_filtered: bool,
}

#[derive(Template)]
#[template(path = "blog.html")]
pub struct BlogTemplate {
    pub view: LayoutContext<BlogContext>,
}

pub struct CategoryGroupView {
    pub category: CategoryBadge,
    pub description: String,
    pub posts: Vec<PostCard>,
    pub total: usize,
}

pub struct CategoriesContext {
    pub is_overview: bool,
    pub groups: Vec<CategoryGroupView>,
    pub posts: Vec<PostCard>,
    pub result_count: usize,
    pub heading: String,
    pub search: String,
    pub active_category: String,
    pub sort: String,
    pub categories: Vec<FilterLinkView>,
    pub sort_options: Vec<FilterLinkView>,
    pub pagination: Option<PaginationView>,
}

#[derive(Template)]
#[template(path = "categories.html")]
pub struct CategoriesTemplate {
    pub view: LayoutContext<CategoriesContext>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocEntryView {
    pub id: String,
    pub text: String,
    pub level: u8,
}

#[derive(Clone, Debug)]
pub struct CommentView {
    pub name: String,
    pub website: Option<String>,
    pub date: String,
    pub iso_date: String,
    pub content: String,
}

/// State of the reader comment form: kept values, field errors and the post-submit notice.
#[derive(Clone, Debug, Default)]
pub struct CommentFormView {
    pub action: String,
    pub values: CommentDraft,
    pub errors: CommentFieldErrors,
    pub notice: Option<FlashView>,
}

pub struct PostDetailContext {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub body_html: String,
    pub date: String,
    pub iso_date: String,
    pub author: String,
    pub reading_time: String,
    pub word_count: usize,
    pub image_url: Option<String>,
    pub categories: Vec<CategoryBadge>,
    pub tags: Vec<TagBadge>,
    pub toc: Vec<TocEntryView>,
    pub comments: Vec<CommentView>,
    pub comments_label: String,
    pub form: CommentFormView,
}

#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub view: LayoutContext<PostDetailContext>,
}

pub struct AboutView {
    pub title: String,
    pub description: String,
}

#[derive(Template)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    pub view: LayoutContext<AboutView>,
}

pub struct UnsubscribeView {
    pub succeeded: bool,
    pub title: String,
    pub message: String,
}

#[derive(Template)]
#[template(path = "unsubscribe.html")]
pub struct UnsubscribeTemplate {
    pub view: LayoutContext<UnsubscribeView>,
}

pub struct ErrorPageView {
    pub title: String,
    pub message: String,
    pub primary_action: Option<ErrorAction>,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            title: "Page Not Found".to_string(),
            message: "The page you requested does not exist. Try returning to the homepage to continue exploring.".to_string(),
            primary_action: Some(ErrorAction::home()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            title: "Temporarily Unavailable".to_string(),
            message: "We could not reach the content service. Please try again in a moment."
                .to_string(),
            primary_action: Some(ErrorAction::home()),
        }
    }

    pub fn internal() -> Self {
        Self {
            title: "Something Went Wrong".to_string(),
            message: "An unexpected error occurred while rendering this page.".to_string(),
            primary_action: Some(ErrorAction::home()),
        }
    }
}

pub struct ErrorAction {
    pub href: String,
    pub label: String,
}

impl ErrorAction {
    pub fn home() -> Self {
        Self {
            href: "/".to_string(),
            label: "Back to home".to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}

pub fn build_tag_badges<'a, T>(tags: T) -> Vec<TagBadge>
where
    T: IntoIterator<Item = &'a String>,
{
    tags.into_iter()
        .map(|name| TagBadge {
            label: format!("#{name}"),
            href: format!("/blog?tags={}", encode_query_value(name)),
        })
        .collect()
}

/// Percent-encode a single query value.
pub fn encode_query_value(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_is_skipped_for_single_pages() {
        let window = PageWindow::new(1, 12, 12);
        assert!(PaginationView::build(&window, |page| format!("?page={page}")).is_none());
    }

    #[test]
    fn pagination_marks_current_page_and_neighbours() {
        let window = PageWindow::new(2, 12, 30);
        let view = PaginationView::build(&window, |page| format!("/blog?page={page}"))
            .expect("three pages");

        assert_eq!(view.total_pages, 3);
        assert_eq!(view.previous.as_deref(), Some("/blog?page=1"));
        assert_eq!(view.next.as_deref(), Some("/blog?page=3"));
        let current: Vec<_> = view.pages.iter().filter(|p| p.is_current).collect();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].number, 2);
    }

    #[test]
    fn tag_badges_link_to_filtered_blog() {
        let tags = vec!["rust lang".to_string()];
        let badges = build_tag_badges(&tags);
        assert_eq!(badges[0].label, "#rust lang");
        assert_eq!(badges[0].href, "/blog?tags=rust+lang");
    }
}
