use std::str::FromStr;

use axum::{
    Extension,
    extract::{Form, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    application::{
        admin::comments::{ADMIN_COMMENT_PAGE_SIZE, AdminCommentError, ModerationAction},
        error::HttpError,
        repos::Session,
    },
    domain::{
        entities::CommentRecord,
        posts::{ADMIN_TIMESTAMP_FORMAT, format_date},
        types::CommentStatus,
    },
    infra::http::repo_error_to_http,
    presentation::{admin::views as admin_views, views::render_template_response},
};

use super::{
    AdminState,
    selectors::COMMENTS_PANEL,
    shared::{
        Toast, datastar_replace, parse_offset, render_fragment, stream_action_error,
        stream_panel_with_toast,
    },
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct AdminCommentListQuery {
    status: Option<String>,
    offset: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct AdminCommentActionForm {
    status_filter: Option<String>,
    offset: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct AdminCommentEditForm {
    content: String,
    status_filter: Option<String>,
    offset: Option<String>,
}

struct CommentFilter {
    status: Option<CommentStatus>,
    offset: u64,
}

fn comment_filter(status: Option<&str>, offset: Option<&str>) -> Result<CommentFilter, HttpError> {
    let status = match status.map(str::trim).filter(|raw| !raw.is_empty()) {
        None => None,
        Some(raw) => Some(CommentStatus::from_str(raw).map_err(|_| {
            HttpError::new(
                "infra::http::admin::comment_filter",
                StatusCode::BAD_REQUEST,
                "Unknown status filter",
                format!("Status `{raw}` is not recognised"),
            )
        })?),
    };
    Ok(CommentFilter {
        status,
        offset: parse_offset(offset),
    })
}

fn admin_comment_error(source: &'static str, err: AdminCommentError) -> HttpError {
    match err {
        AdminCommentError::ConstraintViolation(message) => HttpError::new(
            source,
            StatusCode::UNPROCESSABLE_ENTITY,
            "Comment could not be saved",
            message,
        ),
        AdminCommentError::Repo(err) => repo_error_to_http(source, err),
    }
}

pub(super) async fn admin_comments(
    State(state): State<AdminState>,
    Extension(session): Extension<Session>,
    Query(query): Query<AdminCommentListQuery>,
) -> Response {
    let chrome = state.chrome.load("/comments", &session.user);

    let filter = match comment_filter(query.status.as_deref(), query.offset.as_deref()) {
        Ok(filter) => filter,
        Err(err) => return err.into_response(),
    };

    let content = match build_comment_list_view(&state, &session, &filter).await {
        Ok(content) => content,
        Err(err) => return admin_comment_error("infra::http::admin_comments", err).into_response(),
    };

    let view = admin_views::AdminLayout::new(chrome, content);
    render_template_response(admin_views::AdminCommentsTemplate { view }, StatusCode::OK)
}

pub(super) async fn admin_comments_panel(
    State(state): State<AdminState>,
    Extension(session): Extension<Session>,
    Form(form): Form<AdminCommentListQuery>,
) -> Response {
    const SOURCE: &str = "infra::http::admin_comments_panel";

    let filter = match comment_filter(form.status.as_deref(), form.offset.as_deref()) {
        Ok(filter) => filter,
        Err(err) => return stream_action_error(err),
    };

    let content = match build_comment_list_view(&state, &session, &filter).await {
        Ok(content) => content,
        Err(err) => return stream_action_error(admin_comment_error(SOURCE, err)),
    };

    match render_fragment(admin_views::AdminCommentsPanelTemplate { content }, SOURCE) {
        Ok(html) => datastar_replace(COMMENTS_PANEL, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(super) async fn admin_comment_approve(
    State(state): State<AdminState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Form(form): Form<AdminCommentActionForm>,
) -> Response {
    moderate(&state, &session, id, &form, ModerationAction::Approve).await
}

pub(super) async fn admin_comment_reject(
    State(state): State<AdminState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Form(form): Form<AdminCommentActionForm>,
) -> Response {
    moderate(&state, &session, id, &form, ModerationAction::Reject).await
}

pub(super) async fn admin_comment_delete(
    State(state): State<AdminState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Form(form): Form<AdminCommentActionForm>,
) -> Response {
    moderate(&state, &session, id, &form, ModerationAction::Delete).await
}

async fn moderate(
    state: &AdminState,
    session: &Session,
    id: Uuid,
    form: &AdminCommentActionForm,
    action: ModerationAction,
) -> Response {
    const SOURCE: &str = "infra::http::admin_comment_moderate";

    let filter = match comment_filter(form.status_filter.as_deref(), form.offset.as_deref()) {
        Ok(filter) => filter,
        Err(err) => return stream_action_error(err),
    };

    if let Err(err) = state.comments.moderate(&session.token, id, action).await {
        return stream_action_error(admin_comment_error(SOURCE, err));
    }

    respond_with_panel(
        state,
        session,
        &filter,
        Toast::success(format!("Comment {}", action.past_tense())),
    )
    .await
}

pub(super) async fn admin_comment_update(
    State(state): State<AdminState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Form(form): Form<AdminCommentEditForm>,
) -> Response {
    const SOURCE: &str = "infra::http::admin_comment_update";

    let filter = match comment_filter(form.status_filter.as_deref(), form.offset.as_deref()) {
        Ok(filter) => filter,
        Err(err) => return stream_action_error(err),
    };

    if let Err(err) = state
        .comments
        .update_content(&session.token, id, &form.content)
        .await
    {
        return stream_action_error(admin_comment_error(SOURCE, err));
    }

    respond_with_panel(&state, &session, &filter, Toast::success("Comment updated")).await
}

async fn respond_with_panel(
    state: &AdminState,
    session: &Session,
    filter: &CommentFilter,
    toast: Toast,
) -> Response {
    const SOURCE: &str = "infra::http::admin_comments_panel";

    let content = match build_comment_list_view(state, session, filter).await {
        Ok(content) => content,
        Err(err) => return stream_action_error(admin_comment_error(SOURCE, err)),
    };

    match render_fragment(admin_views::AdminCommentsPanelTemplate { content }, SOURCE) {
        Ok(html) => stream_panel_with_toast(COMMENTS_PANEL, html, toast),
        Err(err) => err.into_response(),
    }
}

async fn build_comment_list_view(
    state: &AdminState,
    session: &Session,
    filter: &CommentFilter,
) -> Result<admin_views::AdminCommentListView, AdminCommentError> {
    let queue = state
        .comments
        .list(&session.token, filter.status, filter.offset)
        .await?;
    let page = queue.page;
    let counts = queue.counts;

    let mut filters = vec![admin_views::AdminStatusFilterView {
        value: String::new(),
        label: "All".to_string(),
        count: Some(counts.all),
        is_active: filter.status.is_none(),
    }];
    filters.extend(CommentStatus::ALL.iter().map(|status| {
        admin_views::AdminStatusFilterView {
            value: status.as_str().to_string(),
            label: status.label().to_string(),
            count: Some(counts.for_status(Some(*status))),
            is_active: filter.status == Some(*status),
        }
    }));

    let comments: Vec<_> = page
        .comments
        .iter()
        .map(|comment| comment_row(state, comment))
        .collect();

    let pagination = admin_views::AdminPaginationView::build(
        filter.offset,
        ADMIN_COMMENT_PAGE_SIZE,
        comments.len(),
        page.total,
    );

    let empty_message = match filter.status {
        Some(CommentStatus::Pending) => "Nothing waiting for moderation.",
        Some(_) => "No comments with this status.",
        None => "No comments yet.",
    };

    Ok(admin_views::AdminCommentListView {
        heading: "Comments".to_string(),
        filters,
        comments,
        active_status: filter
            .status
            .map(|status| status.as_str().to_string())
            .unwrap_or_default(),
        offset: filter.offset,
        total: page.total,
        pagination,
        panel_action: "/comments/panel".to_string(),
        empty_message: empty_message.to_string(),
    })
}

fn comment_row(state: &AdminState, comment: &CommentRecord) -> admin_views::AdminCommentRowView {
    let id = comment.id;
    let (post_title, post_href) = match &comment.post {
        Some((title, slug)) => (title.clone(), Some(state.chrome.public_post_href(slug))),
        None => (String::new(), None),
    };

    admin_views::AdminCommentRowView {
        id: id.to_string(),
        author: comment.name.clone(),
        email: comment.email.clone(),
        website: comment.website.clone(),
        content: comment.content.clone(),
        status_key: comment.status.as_str().to_string(),
        status_label: comment.status.label().to_string(),
        created: format_date(comment.created_at, ADMIN_TIMESTAMP_FORMAT),
        post_title,
        post_href,
        can_approve: comment.status != CommentStatus::Approved,
        can_reject: comment.status != CommentStatus::Rejected,
        approve_action: format!("/comments/{id}/approve"),
        reject_action: format!("/comments/{id}/reject"),
        update_action: format!("/comments/{id}/edit"),
        delete_action: format!("/comments/{id}/delete"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_filter_parses_status() {
        let filter = comment_filter(Some("pending"), Some("20")).expect("filter");
        assert_eq!(filter.status, Some(CommentStatus::Pending));
        assert_eq!(filter.offset, 20);

        let all = comment_filter(Some(""), None).expect("all");
        assert_eq!(all.status, None);
    }

    #[test]
    fn unknown_comment_status_is_bad_request() {
        let err = comment_filter(Some("spam"), None)
            .err()
            .expect("unknown status");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn empty_edit_is_unprocessable() {
        let err = admin_comment_error(
            "test",
            AdminCommentError::ConstraintViolation("Comment content cannot be empty"),
        );
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
