use askama::{Error as AskamaError, Template};
use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use datastar::prelude::ElementPatchMode;
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

use super::selectors::TOAST_STACK;
use crate::{
    application::{error::HttpError, stream::StreamBuilder},
    infra::http::DATASTAR_REQUEST_HEADER,
    presentation::{admin::views as admin_views, views::TemplateRenderError},
};

pub(super) fn blank_to_none_opt(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// `offset` form/query value; anything unparsable is the first page.
pub(super) fn parse_offset(value: Option<&str>) -> u64 {
    value
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .unwrap_or(0)
}

pub(super) fn is_datastar_request(headers: &HeaderMap) -> bool {
    headers.contains_key(DATASTAR_REQUEST_HEADER)
}

#[derive(Clone)]
pub(super) struct Toast {
    pub id: Uuid,
    pub kind: ToastKind,
    pub text: String,
    pub ttl: Duration,
}

#[derive(Clone, Copy)]
pub(super) enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    fn as_variant(self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
        }
    }
}

const DEFAULT_TOAST_TTL: Duration = Duration::from_millis(6000);

impl Toast {
    pub fn success(text: impl Into<String>) -> Self {
        Self::new(ToastKind::Success, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(ToastKind::Error, text)
    }

    fn new(kind: ToastKind, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            text: text.into(),
            ttl: DEFAULT_TOAST_TTL,
        }
    }
}

pub(super) fn push_toasts(stream: &mut StreamBuilder, toasts: &[Toast]) -> Result<(), HttpError> {
    let view_items = toasts
        .iter()
        .map(|toast| admin_views::AdminToastItem {
            id: toast.id.to_string(),
            kind: toast.kind.as_variant(),
            text: toast.text.clone(),
            ttl_ms: toast.ttl.as_millis() as u64,
        })
        .collect::<Vec<_>>();

    let template = admin_views::AdminToastStackTemplate { toasts: view_items };
    let html = render_fragment(template, "infra::http::admin::push_toasts")?;

    stream.push_patch(html, TOAST_STACK, ElementPatchMode::Replace);
    Ok(())
}

pub(super) fn datastar_replace(selector: &str, html: String) -> StreamBuilder {
    let mut stream = StreamBuilder::new();
    stream.push_patch(html, selector, ElementPatchMode::Replace);
    stream
}

/// Replace `selector` with `html` and announce `toast`.
pub(super) fn stream_panel_with_toast(selector: &str, html: String, toast: Toast) -> Response {
    let mut stream = datastar_replace(selector, html);
    if let Err(err) = push_toasts(&mut stream, &[toast]) {
        return err.into_response();
    }
    stream.into_response()
}

/// Answer a failed Datastar action.
///
/// Input the editor can fix (validation, upstream 4xx) becomes an error toast; an expired session
/// sends the browser back to the login page; everything else is a plain error response.
pub(super) fn stream_action_error(err: HttpError) -> Response {
    match err.status() {
        StatusCode::UNAUTHORIZED => {
            let mut stream = StreamBuilder::new();
            stream.push_redirect("/login");
            stream.into_response()
        }
        StatusCode::BAD_REQUEST
        | StatusCode::NOT_FOUND
        | StatusCode::CONFLICT
        | StatusCode::UNPROCESSABLE_ENTITY => {
            let report = err.report();
            warn!(
                target = "quire::http::admin",
                source = report.source,
                status = err.status().as_u16(),
                detail = report.messages.first().map(String::as_str).unwrap_or_default(),
                "admin action rejected"
            );
            let text = report
                .messages
                .first()
                .cloned()
                .unwrap_or_else(|| err.public_message().to_string());
            let mut stream = StreamBuilder::new();
            if let Err(err) = push_toasts(&mut stream, &[Toast::error(text)]) {
                return err.into_response();
            }
            stream.into_response()
        }
        _ => err.into_response(),
    }
}

pub(super) fn render_fragment<T: Template>(
    template: T,
    source: &'static str,
) -> Result<String, HttpError> {
    template
        .render()
        .map_err(|err| template_render_http_error(source, "Template rendering failed", err))
}

pub(super) fn template_render_http_error(
    source: &'static str,
    message: &'static str,
    err: AskamaError,
) -> HttpError {
    HttpError::from(TemplateRenderError::new(source, message, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_default_to_first_page() {
        assert_eq!(parse_offset(None), 0);
        assert_eq!(parse_offset(Some("40")), 40);
        assert_eq!(parse_offset(Some("-1")), 0);
    }

    #[test]
    fn validation_errors_become_toasts() {
        let err = HttpError::new(
            "test",
            StatusCode::UNPROCESSABLE_ENTITY,
            "Post could not be saved",
            "Title is required",
        );
        let response = stream_action_error(err);
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn server_errors_pass_through() {
        let err = HttpError::new(
            "test",
            StatusCode::BAD_GATEWAY,
            "Upstream request failed",
            "boom",
        );
        assert_eq!(stream_action_error(err).status(), StatusCode::BAD_GATEWAY);
    }
}
