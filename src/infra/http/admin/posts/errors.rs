use axum::http::StatusCode;

use crate::{
    application::{admin::posts::AdminPostError, error::HttpError},
    infra::http::repo_error_to_http,
};

pub(super) fn admin_post_error(source: &'static str, err: AdminPostError) -> HttpError {
    match err {
        AdminPostError::ConstraintViolation(message) => HttpError::new(
            source,
            StatusCode::UNPROCESSABLE_ENTITY,
            "Post could not be saved",
            message,
        ),
        AdminPostError::NotFound => HttpError::new(
            source,
            StatusCode::NOT_FOUND,
            "Post not found",
            "The post no longer exists",
        ),
        AdminPostError::Slug(err) => HttpError::new(
            source,
            StatusCode::UNPROCESSABLE_ENTITY,
            "Post could not be saved",
            format!("Could not derive a slug: {err}"),
        ),
        AdminPostError::Repo(err) => repo_error_to_http(source, err),
    }
}
