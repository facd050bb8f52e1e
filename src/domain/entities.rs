//! Domain entities mirrored from the remote API.
//!
//! Conversions from the wire types are total: timestamps that fail to parse become `None` rather than
//! rejecting the whole record, since upstream payloads are not always complete.

use quire_api_types::{CategoryDto, CommentDto, PostDto, SubscriberDto, TagDto, UserDto};
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

use crate::domain::types::{CommentStatus, PostStatus, UserRole};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRecord {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub body_markdown: String,
    pub featured_img: String,
    pub status: PostStatus,
    pub author: Option<UserRecord>,
    pub view_count: u64,
    pub categories: Vec<CategoryRecord>,
    pub tags: Vec<String>,
    pub comments: Vec<CommentRecord>,
    pub published_at: Option<OffsetDateTime>,
    pub created_at: Option<OffsetDateTime>,
    pub updated_at: Option<OffsetDateTime>,
}

impl PostRecord {
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    /// The timestamp readers see: publication time when known, creation time otherwise.
    pub fn display_date(&self) -> Option<OffsetDateTime> {
        self.published_at.or(self.created_at)
    }

    pub fn approved_comments(&self) -> impl Iterator<Item = &CommentRecord> {
        self.comments
            .iter()
            .filter(|comment| comment.status == CommentStatus::Approved)
    }

    pub fn in_category(&self, slug: &str) -> bool {
        self.categories
            .iter()
            .any(|category| category.slug.eq_ignore_ascii_case(slug))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRecord {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagRecord {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentRecord {
    pub id: Uuid,
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub website: String,
    pub content: String,
    pub status: CommentStatus,
    pub created_at: Option<OffsetDateTime>,
    /// Title and slug of the parent post, when the listing carried them.
    pub post: Option<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub is_active: bool,
}

impl UserRecord {
    pub fn display_name(&self) -> &str {
        [self.name.as_str(), self.username.as_str(), self.email.as_str()]
            .into_iter()
            .find(|value| !value.trim().is_empty())
            .unwrap_or("Anonymous")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriberRecord {
    pub id: Uuid,
    pub email: String,
    pub is_active: bool,
    pub confirmed_at: Option<OffsetDateTime>,
    pub created_at: Option<OffsetDateTime>,
}

/// Parse an RFC 3339 timestamp, treating blanks and garbage as absent.
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    OffsetDateTime::parse(trimmed, &Rfc3339).ok()
}

impl From<PostDto> for PostRecord {
    fn from(dto: PostDto) -> Self {
        let categories = dto
            .category_list()
            .into_iter()
            .map(CategoryRecord::from)
            .collect();

        Self {
            id: dto.id,
            slug: dto.slug,
            title: dto.title,
            excerpt: dto.excerpt,
            body_markdown: dto.content,
            featured_img: dto.featured_img,
            status: dto.status.into(),
            author: dto.author.map(UserRecord::from),
            view_count: dto.view_count,
            categories,
            tags: dto.tags.into_vec(),
            comments: dto.comments.into_iter().map(CommentRecord::from).collect(),
            published_at: dto.published_at.as_deref().and_then(parse_timestamp),
            created_at: parse_timestamp(&dto.created_at),
            updated_at: parse_timestamp(&dto.updated_at),
        }
    }
}

impl From<CategoryDto> for CategoryRecord {
    fn from(dto: CategoryDto) -> Self {
        let slug = if dto.slug.trim().is_empty() {
            crate::domain::slug::slugify_title(&dto.name)
        } else {
            dto.slug
        };

        Self {
            id: dto.id,
            name: dto.name,
            slug,
            description: dto.description,
            color: dto.color,
        }
    }
}

impl From<TagDto> for TagRecord {
    fn from(dto: TagDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            slug: dto.slug,
        }
    }
}

impl From<CommentDto> for CommentRecord {
    fn from(dto: CommentDto) -> Self {
        Self {
            id: dto.id,
            post_id: dto.post_id,
            parent_id: dto.parent_id,
            name: dto.name,
            email: dto.email,
            website: dto.website,
            content: dto.content,
            status: dto.status.into(),
            created_at: parse_timestamp(&dto.created_at),
            post: dto.post.map(|post| (post.title, post.slug)),
        }
    }
}

impl From<UserDto> for UserRecord {
    fn from(dto: UserDto) -> Self {
        Self {
            id: dto.id,
            username: dto.username,
            email: dto.email,
            name: dto.name,
            role: dto.role.into(),
            is_active: dto.is_active,
        }
    }
}

impl From<SubscriberDto> for SubscriberRecord {
    fn from(dto: SubscriberDto) -> Self {
        Self {
            id: dto.id,
            email: dto.email,
            is_active: dto.is_active,
            confirmed_at: dto.confirmed_at.as_deref().and_then(parse_timestamp),
            created_at: parse_timestamp(&dto.created_at),
        }
    }
}
