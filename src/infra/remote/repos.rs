use async_trait::async_trait;
use quire_api_types::{
    CategoryDto, CategoryWriteRequest, CommentCreateRequest, CommentDto, CommentUpdateRequest,
    FeaturedImageResponse, Listing, LoginRequest, LoginResponse, PostDto, PostStatusDto,
    PostWriteRequest, SubscribeRequest, SubscriberDto, TagDto, TagWriteRequest, UserDto,
};
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use uuid::Uuid;

use super::{RemoteApi, entity, listing_total};
use crate::application::repos::{
    AccessToken, AdminPostQuery, CategoryDraft, CommentPage, CommentQuery, CommentSubmission,
    CommentsRepo, HealthRepo, ImageUpload, NewsletterRepo, PostDraft, PostPage, PostsRepo,
    PostsWriteRepo, PublishedQuery, RepoError, Session, SessionRepo, TaxonomyRepo,
};
use crate::domain::entities::{
    CategoryRecord, CommentRecord, PostRecord, SubscriberRecord, TagRecord, UserRecord,
};
use crate::domain::types::PostStatus;

const SUBSCRIBER_FETCH_LIMIT: u32 = 500;
const FEATURED_IMAGE_FIELD: &str = "featured_image";

fn decode_items<T: serde::de::DeserializeOwned>(value: Value, key: &str) -> Result<Vec<T>, RepoError> {
    Listing::new(value).into_items(key).map_err(|err| RepoError::Decode(err.to_string()))
}

fn post_page(value: Value) -> Result<PostPage, RepoError> {
    let total_hint = value.clone();
    let posts: Vec<PostDto> = decode_items(value, "posts")?;
    let total = listing_total(&total_hint, posts.len());
    Ok(PostPage {
        posts: posts.into_iter().map(PostRecord::from).collect(),
        total,
    })
}

fn write_request(draft: &PostDraft) -> PostWriteRequest {
    PostWriteRequest {
        title: draft.title.clone(),
        slug: draft.slug.clone(),
        content: draft.body_markdown.clone(),
        excerpt: draft.excerpt.clone(),
        featured_img: draft.featured_img.clone(),
        status: draft.status.map(status_dto),
        category: draft.category.clone(),
        tags: draft.tags.join(","),
    }
}

fn status_dto(status: PostStatus) -> PostStatusDto {
    match status {
        PostStatus::Draft => PostStatusDto::Draft,
        PostStatus::Published => PostStatusDto::Published,
        PostStatus::Archived => PostStatusDto::Archived,
    }
}

fn category_request(draft: &CategoryDraft) -> CategoryWriteRequest {
    CategoryWriteRequest {
        name: draft.name.clone(),
        description: draft.description.clone(),
        color: draft.color.clone(),
    }
}

#[async_trait]
impl PostsRepo for RemoteApi {
    async fn list_published(&self, query: &PublishedQuery) -> Result<PostPage, RepoError> {
        let mut params = vec![
            ("page", query.page.to_string()),
            ("limit", query.limit.to_string()),
            ("offset", query.offset().to_string()),
        ];
        if let Some(category) = query.category.as_deref() {
            params.push(("category", category.to_string()));
        }
        if !query.tags.is_empty() {
            params.push(("tags", query.tags.join(",")));
        }
        if let Some(search) = query.search.as_deref() {
            params.push(("q", search.to_string()));
        }

        post_page(self.get_value("public/posts", &params, None).await?)
    }

    async fn find_published(&self, slug: &str) -> Result<PostRecord, RepoError> {
        let path = format!("public/posts/{}", encode_segment(slug));
        let value = self.get_value(&path, &[], None).await?;
        entity::<PostDto>(value, "post").map(PostRecord::from)
    }

    async fn list_all(
        &self,
        token: &AccessToken,
        query: &AdminPostQuery,
    ) -> Result<PostPage, RepoError> {
        let mut params = vec![
            ("limit", query.limit.to_string()),
            ("offset", query.offset.to_string()),
        ];
        if let Some(status) = query.status {
            params.push(("status", status.as_str().to_string()));
        }
        post_page(self.get_value("posts/", &params, Some(token)).await?)
    }

    async fn find_by_id(&self, token: &AccessToken, id: Uuid) -> Result<PostRecord, RepoError> {
        let value = self
            .get_value(&format!("posts/{id}"), &[], Some(token))
            .await?;
        entity::<PostDto>(value, "post").map(PostRecord::from)
    }
}

#[async_trait]
impl PostsWriteRepo for RemoteApi {
    async fn create_post(
        &self,
        token: &AccessToken,
        draft: &PostDraft,
    ) -> Result<PostRecord, RepoError> {
        let request = self
            .request(Method::POST, "posts/", &[], Some(token))?
            .json(&write_request(draft));
        let value: Value = self.json(request).await?;
        entity::<PostDto>(value, "post").map(PostRecord::from)
    }

    async fn update_post(
        &self,
        token: &AccessToken,
        id: Uuid,
        draft: &PostDraft,
    ) -> Result<PostRecord, RepoError> {
        let request = self
            .request(Method::PUT, &format!("posts/{id}"), &[], Some(token))?
            .json(&write_request(draft));
        let value: Value = self.json(request).await?;
        entity::<PostDto>(value, "post").map(PostRecord::from)
    }

    async fn delete_post(&self, token: &AccessToken, id: Uuid) -> Result<(), RepoError> {
        let request = self.request(Method::DELETE, &format!("posts/{id}"), &[], Some(token))?;
        self.unit(request).await
    }

    async fn publish_post(&self, token: &AccessToken, id: Uuid) -> Result<(), RepoError> {
        let request =
            self.request(Method::POST, &format!("posts/{id}/publish"), &[], Some(token))?;
        self.unit(request).await
    }

    async fn unpublish_post(&self, token: &AccessToken, id: Uuid) -> Result<(), RepoError> {
        let request =
            self.request(Method::POST, &format!("posts/{id}/unpublish"), &[], Some(token))?;
        self.unit(request).await
    }

    async fn upload_featured_image(
        &self,
        token: &AccessToken,
        upload: ImageUpload,
    ) -> Result<String, RepoError> {
        let part = Part::bytes(upload.bytes.to_vec())
            .file_name(upload.file_name)
            .mime_str(&upload.content_type)
            .map_err(|err| RepoError::invalid_input(err.to_string()))?;
        let form = Form::new().part(FEATURED_IMAGE_FIELD, part);

        let request = self
            .request(Method::POST, "images/featured", &[], Some(token))?
            .multipart(form);
        let response: FeaturedImageResponse = self.json(request).await?;
        if response.featured_img_url.trim().is_empty() {
            return Err(RepoError::Decode(
                "upload response carried no featured_img_url".to_string(),
            ));
        }
        Ok(response.featured_img_url)
    }
}

#[async_trait]
impl TaxonomyRepo for RemoteApi {
    async fn list_categories(&self) -> Result<Vec<CategoryRecord>, RepoError> {
        let value = self.get_value("public/categories", &[], None).await?;
        let items: Vec<CategoryDto> = decode_items(value, "categories")?;
        Ok(items.into_iter().map(CategoryRecord::from).collect())
    }

    async fn list_tags(&self) -> Result<Vec<TagRecord>, RepoError> {
        let value = self.get_value("public/tags", &[], None).await?;
        let items: Vec<TagDto> = decode_items(value, "tags")?;
        Ok(items.into_iter().map(TagRecord::from).collect())
    }

    async fn create_category(
        &self,
        token: &AccessToken,
        draft: &CategoryDraft,
    ) -> Result<CategoryRecord, RepoError> {
        let request = self
            .request(Method::POST, "categories/", &[], Some(token))?
            .json(&category_request(draft));
        let value: Value = self.json(request).await?;
        entity::<CategoryDto>(value, "category").map(CategoryRecord::from)
    }

    async fn update_category(
        &self,
        token: &AccessToken,
        id: Uuid,
        draft: &CategoryDraft,
    ) -> Result<CategoryRecord, RepoError> {
        let request = self
            .request(Method::PUT, &format!("categories/{id}"), &[], Some(token))?
            .json(&category_request(draft));
        let value: Value = self.json(request).await?;
        entity::<CategoryDto>(value, "category").map(CategoryRecord::from)
    }

    async fn delete_category(&self, token: &AccessToken, id: Uuid) -> Result<(), RepoError> {
        let request =
            self.request(Method::DELETE, &format!("categories/{id}"), &[], Some(token))?;
        self.unit(request).await
    }

    async fn create_tag(&self, token: &AccessToken, name: &str) -> Result<TagRecord, RepoError> {
        let request = self
            .request(Method::POST, "tags/", &[], Some(token))?
            .json(&TagWriteRequest {
                name: name.to_string(),
            });
        let value: Value = self.json(request).await?;
        entity::<TagDto>(value, "tag").map(TagRecord::from)
    }

    async fn update_tag(
        &self,
        token: &AccessToken,
        id: Uuid,
        name: &str,
    ) -> Result<TagRecord, RepoError> {
        let request = self
            .request(Method::PUT, &format!("tags/{id}"), &[], Some(token))?
            .json(&TagWriteRequest {
                name: name.to_string(),
            });
        let value: Value = self.json(request).await?;
        entity::<TagDto>(value, "tag").map(TagRecord::from)
    }

    async fn delete_tag(&self, token: &AccessToken, id: Uuid) -> Result<(), RepoError> {
        let request = self.request(Method::DELETE, &format!("tags/{id}"), &[], Some(token))?;
        self.unit(request).await
    }
}

#[async_trait]
impl CommentsRepo for RemoteApi {
    async fn submit_comment(&self, submission: &CommentSubmission) -> Result<(), RepoError> {
        let comment = &submission.comment;
        let body = CommentCreateRequest {
            post_id: submission.post_id,
            parent_id: submission.parent_id,
            name: comment.name.clone(),
            email: comment.email.clone(),
            website: comment.website.clone(),
            content: comment.content.clone(),
        };
        let request = self
            .request(Method::POST, "public/comments", &[], None)?
            .json(&body);
        self.unit(request).await
    }

    async fn list_comments(
        &self,
        token: &AccessToken,
        query: &CommentQuery,
    ) -> Result<CommentPage, RepoError> {
        let params = [
            ("limit", query.limit.to_string()),
            ("offset", query.offset.to_string()),
        ];
        let value = self.get_value("comments/", &params, Some(token)).await?;
        let total_hint = value.clone();
        let comments: Vec<CommentDto> = decode_items(value, "comments")?;
        let total = listing_total(&total_hint, comments.len());
        Ok(CommentPage {
            comments: comments.into_iter().map(CommentRecord::from).collect(),
            total,
        })
    }

    async fn approve_comment(&self, token: &AccessToken, id: Uuid) -> Result<(), RepoError> {
        let request =
            self.request(Method::POST, &format!("comments/{id}/approve"), &[], Some(token))?;
        self.unit(request).await
    }

    async fn reject_comment(&self, token: &AccessToken, id: Uuid) -> Result<(), RepoError> {
        let request =
            self.request(Method::POST, &format!("comments/{id}/reject"), &[], Some(token))?;
        self.unit(request).await
    }

    async fn delete_comment(&self, token: &AccessToken, id: Uuid) -> Result<(), RepoError> {
        let request =
            self.request(Method::DELETE, &format!("comments/{id}"), &[], Some(token))?;
        self.unit(request).await
    }

    async fn update_comment(
        &self,
        token: &AccessToken,
        id: Uuid,
        content: &str,
    ) -> Result<CommentRecord, RepoError> {
        let request = self
            .request(Method::PUT, &format!("comments/{id}"), &[], Some(token))?
            .json(&CommentUpdateRequest {
                content: content.to_string(),
            });
        let value: Value = self.json(request).await?;
        entity::<CommentDto>(value, "comment").map(CommentRecord::from)
    }
}

#[async_trait]
impl NewsletterRepo for RemoteApi {
    async fn subscribe(&self, email: &str) -> Result<(), RepoError> {
        let request = self
            .request(Method::POST, "public/newsletter/subscribe", &[], None)?
            .json(&SubscribeRequest {
                email: email.to_string(),
            });
        self.unit(request).await
    }

    async fn unsubscribe(&self, token: &str) -> Result<(), RepoError> {
        let path = format!("public/newsletter/unsubscribe/{}", encode_segment(token));
        let request = self.request(Method::GET, &path, &[], None)?;
        self.unit(request).await
    }

    async fn list_subscribers(
        &self,
        token: &AccessToken,
    ) -> Result<Vec<SubscriberRecord>, RepoError> {
        let params = [("limit", SUBSCRIBER_FETCH_LIMIT.to_string())];
        let value = self
            .get_value("newsletter/subscribers", &params, Some(token))
            .await?;
        let items: Vec<SubscriberDto> = decode_items(value, "subscribers")?;
        Ok(items.into_iter().map(SubscriberRecord::from).collect())
    }

    async fn delete_subscriber(&self, token: &AccessToken, id: Uuid) -> Result<(), RepoError> {
        let request = self.request(
            Method::DELETE,
            &format!("newsletter/subscribers/{id}"),
            &[],
            Some(token),
        )?;
        self.unit(request).await
    }
}

#[async_trait]
impl SessionRepo for RemoteApi {
    async fn login(&self, email: &str, password: &str) -> Result<Session, RepoError> {
        let request = self
            .request(Method::POST, "auth/login", &[], None)?
            .json(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            });
        let response: LoginResponse = self.json(request).await?;
        if response.token.trim().is_empty() {
            return Err(RepoError::Decode("login response carried no token".to_string()));
        }
        Ok(Session {
            token: AccessToken::new(response.token),
            user: UserRecord::from(response.user),
        })
    }

    async fn current_user(&self, token: &AccessToken) -> Result<UserRecord, RepoError> {
        let value = self.get_value("users/me", &[], Some(token)).await?;
        entity::<UserDto>(value, "user").map(UserRecord::from)
    }

    async fn refresh(&self, token: &AccessToken) -> Result<AccessToken, RepoError> {
        let request = self.request(Method::POST, "auth/refresh", &[], Some(token))?;
        let value: Value = self.json(request).await?;
        value
            .get("token")
            .and_then(Value::as_str)
            .filter(|token| !token.trim().is_empty())
            .map(AccessToken::new)
            .ok_or_else(|| RepoError::Decode("refresh response carried no token".to_string()))
    }
}

#[async_trait]
impl HealthRepo for RemoteApi {
    async fn ping(&self) -> Result<(), RepoError> {
        let request = self.request(Method::GET, "/health", &[], None)?;
        self.unit(request).await
    }
}

fn encode_segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
