//! Shared request and response types for the blog REST API consumed by Quire.
//!
//! Field names follow the upstream JSON contract (`snake_case`). Every response type tolerates missing
//! optional fields so older or partial payloads still decode; see [`normalize`] for the collection
//! envelope and tag-shape rules.

pub mod normalize;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use normalize::{CategoryField, Listing, TagNames};

/// Default colour assigned to categories that do not carry one.
pub const DEFAULT_CATEGORY_COLOR: &str = "#6B7280";

fn default_category_color() -> String {
    DEFAULT_CATEGORY_COLOR.to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PostStatusDto {
    #[default]
    Draft,
    Published,
    Archived,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CommentStatusDto {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UserRoleDto {
    Admin,
    #[default]
    Author,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserDto {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub name: String,
    pub bio: String,
    pub avatar: String,
    pub role: UserRoleDto,
    pub is_active: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub color: String,
}

impl Default for CategoryDto {
    fn default() -> Self {
        Self {
            id: Uuid::nil(),
            name: String::new(),
            slug: String::new(),
            description: String::new(),
            color: default_category_color(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TagDto {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentDto {
    pub id: Uuid,
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub website: String,
    pub content: String,
    pub status: CommentStatusDto,
    pub created_at: String,
    /// Present on admin listings, where the upstream preloads the parent post.
    pub post: Option<CommentPostRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentPostRef {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostDto {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub featured_img: String,
    pub status: PostStatusDto,
    pub author: Option<UserDto>,
    pub view_count: u64,
    pub published_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub categories: Vec<CategoryDto>,
    /// Legacy single-category shape; merged with `categories` by [`PostDto::category_list`].
    pub category: Option<CategoryField>,
    pub tags: TagNames,
    pub comments: Vec<CommentDto>,
}

impl PostDto {
    /// Categories attached to the post, regardless of which upstream shape carried them.
    pub fn category_list(&self) -> Vec<CategoryDto> {
        let mut list = self.categories.clone();
        if let Some(legacy) = self.category.as_ref() {
            let legacy = legacy.clone().into_category();
            let known = list
                .iter()
                .any(|existing| existing.name.eq_ignore_ascii_case(&legacy.name));
            if !known && !legacy.name.is_empty() {
                list.push(legacy);
            }
        }
        list
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriberDto {
    pub id: Uuid,
    pub email: String,
    pub is_active: bool,
    pub confirmed_at: Option<String>,
    pub created_at: String,
}

/// Paged post collection returned by `GET /public/posts` and `GET /posts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostListResponse {
    pub posts: Vec<PostDto>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: UserDto,
    pub token: String,
}

/// Body accepted by `POST /posts` and `PUT /posts/{id}`.
///
/// `category` is a single category name and `tags` a comma-separated list of tag names; the upstream
/// creates missing taxonomy entries on the fly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostWriteRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub content: String,
    pub excerpt: String,
    pub featured_img: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatusDto>,
    pub category: String,
    pub tags: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentCreateRequest {
    pub post_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub website: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentUpdateRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryWriteRequest {
    pub name: String,
    pub description: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagWriteRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    /// Human-readable failure text, preferring `error` over `message`.
    pub fn text(&self) -> Option<&str> {
        [self.error.as_str(), self.message.as_str()]
            .into_iter()
            .map(str::trim)
            .find(|value| !value.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturedImageResponse {
    pub featured_img_url: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthResponse {
    pub status: String,
}
