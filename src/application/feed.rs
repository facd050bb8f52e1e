use std::cmp::Ordering;
use std::sync::Arc;

use thiserror::Error;
use url::form_urlencoded;

use crate::application::pagination::PageWindow;
use crate::application::render::{EXCERPT_CHARS, RenderError, render_service, summarize_markdown};
use crate::application::repos::{PostsRepo, PublishedQuery, RepoError, TaxonomyRepo};
use crate::domain::entities::{CategoryRecord, PostRecord};
use crate::domain::posts::{
    DEFAULT_TRUNCATE_CHARS, HUMAN_DATE_FORMAT, LONG_DATE_FORMAT, comment_count_label, format_date,
    format_reading_time, image_url, truncate_text,
};
use crate::presentation::views::{
    BlogContext, CategoriesContext, CategoryBadge, CategoryGroupView, CommentFormView,
    CommentView, FilterLinkView, HomeContext, PaginationView, PostCard, PostDetailContext,
    TocEntryView, build_tag_badges, encode_query_value,
};

pub const HOME_FEATURED_LIMIT: u32 = 6;
pub const HOME_FEATURED_LEAD: usize = 3;
pub const HOME_RECENT_LIMIT: u32 = 6;
pub const BLOG_PAGE_SIZE: u32 = 12;
pub const CATEGORY_BROWSER_FETCH: u32 = 100;
pub const CATEGORY_PREVIEW_SIZE: usize = 3;
pub const CATEGORY_PAGE_SIZE: u32 = 12;
const CARD_TAG_LIMIT: usize = 3;
const FEATURED_CARD_TAG_LIMIT: usize = 4;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("post `{0}` not found")]
    PostNotFound(String),
    #[error("content service unavailable")]
    Unavailable(#[source] RepoError),
    #[error("content service request failed")]
    Repo(#[source] RepoError),
    #[error("failed to render post body")]
    Render(#[source] RenderError),
}

impl From<RepoError> for FeedError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Unavailable(_) => Self::Unavailable(err),
            other => Self::Repo(other),
        }
    }
}

/// Filters accepted by the blog listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlogQuery {
    pub page: u32,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub search: Option<String>,
}

impl BlogQuery {
    pub fn is_filtered(&self) -> bool {
        self.category.is_some() || !self.tags.is_empty() || self.search.is_some()
    }

    /// `/blog` link for `page` that keeps the active filters.
    pub fn href(&self, page: u32) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        if let Some(category) = &self.category {
            query.append_pair("category", category);
        }
        if !self.tags.is_empty() {
            query.append_pair("tags", &self.tags.join(","));
        }
        if let Some(search) = &self.search {
            query.append_pair("q", search);
        }
        if page > 1 {
            query.append_pair("page", &page.to_string());
        }
        with_query("/blog", query.finish())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategorySort {
    #[default]
    Newest,
    Oldest,
    Title,
}

impl CategorySort {
    pub const ALL: [CategorySort; 3] = [Self::Newest, Self::Oldest, Self::Title];

    /// Unknown values fall back to newest first.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("oldest") => Self::Oldest,
            Some("title") => Self::Title,
            _ => Self::Newest,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::Title => "title",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Newest => "Newest first",
            Self::Oldest => "Oldest first",
            Self::Title => "Title (A-Z)",
        }
    }

    fn compare(self, left: &PostRecord, right: &PostRecord) -> Ordering {
        match self {
            Self::Newest => right.created_at.cmp(&left.created_at),
            Self::Oldest => left.created_at.cmp(&right.created_at),
            Self::Title => left.title.to_lowercase().cmp(&right.title.to_lowercase()),
        }
    }
}

/// State of the categories browser, as carried in its query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoriesQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: CategorySort,
    pub page: u32,
}

impl CategoriesQuery {
    /// Overview groups posts by category; any filter switches to a flat result list.
    pub fn is_overview(&self) -> bool {
        self.category.is_none() && self.search.is_none()
    }

    /// Query string for this state at `page`, leaving out defaults. Empty when nothing is set.
    pub fn canonical_query(&self, page: u32) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        if let Some(category) = &self.category {
            query.append_pair("category", category);
        }
        if let Some(search) = &self.search {
            query.append_pair("search", search);
        }
        if self.sort != CategorySort::Newest {
            query.append_pair("sort", self.sort.as_str());
        }
        if page > 1 {
            query.append_pair("page", &page.to_string());
        }
        query.finish()
    }

    pub fn href(&self, page: u32) -> String {
        with_query("/categories", self.canonical_query(page))
    }
}

fn with_query(path: &str, query: String) -> String {
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}

/// Read side of the public site.
#[derive(Clone)]
pub struct FeedService {
    posts: Arc<dyn PostsRepo>,
    taxonomy: Arc<dyn TaxonomyRepo>,
    api_origin: String,
}

impl FeedService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        taxonomy: Arc<dyn TaxonomyRepo>,
        api_origin: impl Into<String>,
    ) -> Self {
        Self {
            posts,
            taxonomy,
            api_origin: api_origin.into(),
        }
    }

    pub async fn home(&self) -> Result<HomeContext, FeedError> {
        let featured_query = PublishedQuery::page(1, HOME_FEATURED_LIMIT);
        let recent_query = PublishedQuery::page(1, HOME_RECENT_LIMIT);
        let (featured, recent, categories) = futures::try_join!(
            self.posts.list_published(&featured_query),
            self.posts.list_published(&recent_query),
            self.taxonomy.list_categories(),
        )?;

        let mut featured_lead = Vec::new();
        let mut featured_rest = Vec::new();
        for (index, post) in featured.posts.iter().enumerate() {
            if index < HOME_FEATURED_LEAD {
                featured_lead.push(self.card(post, FEATURED_CARD_TAG_LIMIT));
            } else {
                featured_rest.push(self.card(post, CARD_TAG_LIMIT));
            }
        }

        let recent: Vec<PostCard> = recent
            .posts
            .iter()
            .map(|post| self.card(post, CARD_TAG_LIMIT))
            .collect();

        Ok(HomeContext {
            has_posts: !featured_lead.is_empty() || !recent.is_empty(),
            featured_lead,
            featured_rest,
            recent,
            categories: categories.iter().map(category_badge).collect(),
        })
    }

    pub async fn blog(&self, query: &BlogQuery) -> Result<BlogContext, FeedError> {
        let request = PublishedQuery {
            page: query.page.max(1),
            limit: BLOG_PAGE_SIZE,
            category: query.category.clone(),
            tags: query.tags.clone(),
            search: query.search.clone(),
        };

        let (page, categories) = futures::try_join!(
            self.posts.list_published(&request),
            self.taxonomy.list_categories(),
        )?;

        let window = PageWindow::new(request.page, BLOG_PAGE_SIZE, page.total);
        let posts: Vec<PostCard> = if window.is_out_of_range() {
            Vec::new()
        } else {
            page.posts
                .iter()
                .map(|post| self.card(post, CARD_TAG_LIMIT))
                .collect()
        };

        let active_category = query.category.clone().unwrap_or_default();
        let mut filters = vec![FilterLinkView {
            label: "All".to_string(),
            value: String::new(),
            href: BlogQuery {
                category: None,
                page: 1,
                ..query.clone()
            }
            .href(1),
            is_active: query.category.is_none(),
        }];
        filters.extend(categories.iter().map(|category| FilterLinkView {
            label: category.name.clone(),
            value: category.slug.clone(),
            href: BlogQuery {
                category: Some(category.slug.clone()),
                page: 1,
                ..query.clone()
            }
            .href(1),
            is_active: category.slug.eq_ignore_ascii_case(&active_category),
        }));

        let heading = match &query.search {
            Some(search) => format!("Results for \"{search}\""),
            None => categories
                .iter()
                .find(|category| category.slug.eq_ignore_ascii_case(&active_category))
                .map(|category| category.name.clone())
                .unwrap_or_else(|| "All Posts".to_string()),
        };

        Ok(BlogContext {
            heading,
            has_results: !posts.is_empty(),
            posts,
            total: page.total,
            search: query.search.clone().unwrap_or_default(),
            tags: query.tags.join(", "),
            active_category,
            categories: filters,
            pagination: PaginationView::build(&window, |number| query.href(number)),
            is_filtered: query.is_filtered(),
        })
    }

    pub async fn categories(
        &self,
        query: &CategoriesQuery,
    ) -> Result<CategoriesContext, FeedError> {
        let request = PublishedQuery::page(1, CATEGORY_BROWSER_FETCH);
        let (page, categories) = futures::try_join!(
            self.posts.list_published(&request),
            self.taxonomy.list_categories(),
        )?;

        let active_category = query.category.clone().unwrap_or_default();
        let category_links = categories
            .iter()
            .map(|category| {
                let state = CategoriesQuery {
                    category: Some(category.slug.clone()),
                    page: 1,
                    ..query.clone()
                };
                FilterLinkView {
                    label: category.name.clone(),
                    value: category.slug.clone(),
                    href: state.href(1),
                    is_active: category.slug.eq_ignore_ascii_case(&active_category),
                }
            })
            .collect();

        let sort_options = CategorySort::ALL
            .iter()
            .map(|sort| FilterLinkView {
                label: sort.label().to_string(),
                value: sort.as_str().to_string(),
                href: CategoriesQuery {
                    sort: *sort,
                    page: 1,
                    ..query.clone()
                }
                .href(1),
                is_active: *sort == query.sort,
            })
            .collect();

        let mut context = CategoriesContext {
            is_overview: query.is_overview(),
            groups: Vec::new(),
            posts: Vec::new(),
            result_count: 0,
            heading: "Categories".to_string(),
            search: query.search.clone().unwrap_or_default(),
            active_category,
            sort: query.sort.as_str().to_string(),
            categories: category_links,
            sort_options,
            pagination: None,
        };

        if query.is_overview() {
            context.groups = self.category_groups(&categories, &page.posts);
            return Ok(context);
        }

        let matches = filter_posts(&page.posts, query);
        if let Some(category) = categories
            .iter()
            .find(|category| category.slug.eq_ignore_ascii_case(&context.active_category))
        {
            context.heading = category.name.clone();
        }

        let window = PageWindow::new(query.page.max(1), CATEGORY_PAGE_SIZE, matches.len() as u64);
        context.result_count = matches.len();
        context.posts = window
            .slice(&matches)
            .iter()
            .map(|post| self.card(post, CARD_TAG_LIMIT))
            .collect();
        context.pagination = PaginationView::build(&window, |number| query.href(number));
        Ok(context)
    }

    /// Published post by slug, with its comments.
    pub async fn find_post(&self, slug: &str) -> Result<PostRecord, FeedError> {
        match self.posts.find_published(slug).await {
            Ok(post) => Ok(post),
            Err(RepoError::NotFound) => Err(FeedError::PostNotFound(slug.to_string())),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn post_detail(&self, slug: &str) -> Result<PostDetailContext, FeedError> {
        let post = self.find_post(slug).await?;
        self.post_context(&post)
    }

    /// Detail view for an already loaded post, with an empty comment form.
    pub fn post_context(&self, post: &PostRecord) -> Result<PostDetailContext, FeedError> {
        let rendered = render_service()
            .render(&post.body_markdown)
            .map_err(FeedError::Render)?;

        let comments: Vec<CommentView> = post
            .approved_comments()
            .map(|comment| CommentView {
                name: comment.name.clone(),
                website: Some(comment.website.trim())
                    .filter(|site| !site.is_empty())
                    .map(str::to_string),
                date: format_date(comment.created_at, HUMAN_DATE_FORMAT),
                iso_date: iso_date(comment.created_at),
                content: comment.content.clone(),
            })
            .collect();

        let excerpt = if post.excerpt.trim().is_empty() {
            rendered.excerpt.clone()
        } else {
            post.excerpt.trim().to_string()
        };

        Ok(PostDetailContext {
            id: post.id.to_string(),
            slug: post.slug.clone(),
            title: post.title.clone(),
            excerpt,
            body_html: rendered.html,
            date: format_date(post.display_date(), LONG_DATE_FORMAT),
            iso_date: iso_date(post.display_date()),
            author: post
                .author
                .as_ref()
                .map(|author| author.display_name().to_string())
                .unwrap_or_default(),
            reading_time: format_reading_time(rendered.reading_time),
            word_count: rendered.word_count,
            image_url: Some(post.featured_img.trim())
                .filter(|path| !path.is_empty())
                .map(|path| image_url(path, &self.api_origin)),
            categories: post.categories.iter().map(category_badge).collect(),
            tags: build_tag_badges(&post.tags),
            toc: rendered
                .headings
                .iter()
                .filter(|heading| heading.level >= 2 && heading.level <= 3)
                .map(|heading| TocEntryView {
                    id: heading.id.clone(),
                    text: heading.text.clone(),
                    level: heading.level,
                })
                .collect(),
            comments_label: comment_count_label(comments.len()),
            comments,
            form: CommentFormView {
                action: format!("/blog/{}/comments", encode_path_segment(&post.slug)),
                ..CommentFormView::default()
            },
        })
    }

    fn category_groups(
        &self,
        categories: &[CategoryRecord],
        posts: &[PostRecord],
    ) -> Vec<CategoryGroupView> {
        categories
            .iter()
            .filter_map(|category| {
                let mut members: Vec<&PostRecord> = posts
                    .iter()
                    .filter(|post| post.in_category(&category.slug))
                    .collect();
                if members.is_empty() {
                    return None;
                }
                members.sort_by(|left, right| CategorySort::Newest.compare(left, right));
                Some(CategoryGroupView {
                    category: category_badge(category),
                    description: category.description.clone(),
                    total: members.len(),
                    posts: members
                        .into_iter()
                        .take(CATEGORY_PREVIEW_SIZE)
                        .map(|post| self.card(post, CARD_TAG_LIMIT))
                        .collect(),
                })
            })
            .collect()
    }

    fn card(&self, record: &PostRecord, tag_limit: usize) -> PostCard {
        let summary = summarize_markdown(&record.body_markdown, EXCERPT_CHARS);
        let excerpt = if record.excerpt.trim().is_empty() {
            summary.excerpt
        } else {
            record.excerpt.trim().to_string()
        };

        PostCard {
            slug: record.slug.clone(),
            href: format!("/blog/{}", encode_path_segment(&record.slug)),
            title: record.title.clone(),
            excerpt: truncate_text(&excerpt, DEFAULT_TRUNCATE_CHARS),
            image_url: image_url(&record.featured_img, &self.api_origin),
            date: format_date(record.display_date(), HUMAN_DATE_FORMAT),
            iso_date: iso_date(record.display_date()),
            reading_time: format_reading_time(summary.reading_time),
            author: record
                .author
                .as_ref()
                .map(|author| author.display_name().to_string())
                .unwrap_or_default(),
            categories: record.categories.iter().map(category_badge).collect(),
            tags: build_tag_badges(record.tags.iter().take(tag_limit)),
        }
    }
}

/// Posts matching the category and search filters of `query`, in its sort order.
fn filter_posts<'a>(posts: &'a [PostRecord], query: &CategoriesQuery) -> Vec<&'a PostRecord> {
    let needle = query
        .search
        .as_deref()
        .map(|term| term.to_lowercase())
        .unwrap_or_default();

    let mut matches: Vec<&PostRecord> = posts
        .iter()
        .filter(|post| {
            query
                .category
                .as_deref()
                .is_none_or(|slug| post.in_category(slug))
        })
        .filter(|post| {
            needle.is_empty()
                || post.title.to_lowercase().contains(&needle)
                || post.excerpt.to_lowercase().contains(&needle)
                || post
                    .tags
                    .iter()
                    .any(|tag| tag.to_lowercase().contains(&needle))
        })
        .collect();

    matches.sort_by(|left, right| query.sort.compare(left, right));
    matches
}

fn category_badge(category: &CategoryRecord) -> CategoryBadge {
    CategoryBadge {
        name: category.name.clone(),
        slug: category.slug.clone(),
        color: category.color.clone(),
        href: format!("/categories?category={}", encode_query_value(&category.slug)),
    }
}

fn iso_date(value: Option<time::OffsetDateTime>) -> String {
    value
        .and_then(|timestamp| {
            timestamp
                .format(&time::format_description::well_known::Rfc3339)
                .ok()
        })
        .unwrap_or_default()
}

fn encode_path_segment(value: &str) -> String {
    encode_query_value(value).replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use uuid::Uuid;

    use crate::domain::types::PostStatus;

    fn post(title: &str, created: time::OffsetDateTime, category: Option<&str>) -> PostRecord {
        PostRecord {
            id: Uuid::new_v4(),
            slug: title.to_lowercase().replace(' ', "-"),
            title: title.to_string(),
            excerpt: format!("About {title}"),
            body_markdown: "word ".repeat(10),
            featured_img: String::new(),
            status: PostStatus::Published,
            author: None,
            view_count: 0,
            categories: category
                .map(|slug| {
                    vec![CategoryRecord {
                        id: Uuid::new_v4(),
                        name: slug.to_string(),
                        slug: slug.to_string(),
                        description: String::new(),
                        color: "#6B7280".to_string(),
                    }]
                })
                .unwrap_or_default(),
            tags: vec!["rust".to_string()],
            comments: Vec::new(),
            published_at: None,
            created_at: Some(created),
            updated_at: None,
        }
    }

    #[test]
    fn canonical_query_omits_defaults() {
        let query = CategoriesQuery {
            page: 1,
            ..CategoriesQuery::default()
        };
        assert_eq!(query.canonical_query(1), "");
        assert_eq!(query.href(1), "/categories");

        let query = CategoriesQuery {
            category: Some("rust".into()),
            search: Some("async io".into()),
            sort: CategorySort::Oldest,
            page: 2,
        };
        assert_eq!(
            query.canonical_query(2),
            "category=rust&search=async+io&sort=oldest&page=2"
        );
    }

    #[test]
    fn sort_parsing_falls_back_to_newest() {
        assert_eq!(CategorySort::parse(Some("title")), CategorySort::Title);
        assert_eq!(CategorySort::parse(Some("bogus")), CategorySort::Newest);
        assert_eq!(CategorySort::parse(None), CategorySort::Newest);
    }

    #[test]
    fn filter_posts_applies_category_search_and_sort() {
        let posts = vec![
            post("Beta", datetime!(2024-01-02 00:00 UTC), Some("rust")),
            post("alpha", datetime!(2024-01-03 00:00 UTC), Some("rust")),
            post("Gamma", datetime!(2024-01-01 00:00 UTC), Some("go")),
        ];

        let by_title = CategoriesQuery {
            category: Some("rust".into()),
            sort: CategorySort::Title,
            ..CategoriesQuery::default()
        };
        let titles: Vec<_> = filter_posts(&posts, &by_title)
            .iter()
            .map(|post| post.title.as_str())
            .collect();
        assert_eq!(titles, vec!["alpha", "Beta"]);

        let oldest = CategoriesQuery {
            search: Some("RUST".into()),
            sort: CategorySort::Oldest,
            ..CategoriesQuery::default()
        };
        let titles: Vec<_> = filter_posts(&posts, &oldest)
            .iter()
            .map(|post| post.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Gamma", "Beta", "alpha"]);
    }

    #[test]
    fn blog_href_keeps_filters() {
        let query = BlogQuery {
            page: 1,
            category: Some("web".into()),
            tags: vec!["rust".into(), "axum".into()],
            search: None,
        };
        assert_eq!(query.href(3), "/blog?category=web&tags=rust%2Caxum&page=3");
        assert_eq!(BlogQuery::default().href(1), "/blog");
    }

    #[test]
    fn unavailable_repo_errors_are_classified() {
        assert!(matches!(
            FeedError::from(RepoError::unavailable("refused")),
            FeedError::Unavailable(_)
        ));
        assert!(matches!(
            FeedError::from(RepoError::Decode("bad".into())),
            FeedError::Repo(_)
        ));
    }
}
