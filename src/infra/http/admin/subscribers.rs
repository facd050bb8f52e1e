use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{
    application::{error::HttpError, repos::Session},
    domain::{
        entities::SubscriberRecord,
        posts::{ADMIN_TIMESTAMP_FORMAT, format_date},
    },
    infra::http::repo_error_to_http,
    presentation::{admin::views as admin_views, views::render_template_response},
};

use super::{
    AdminState,
    selectors::SUBSCRIBERS_PANEL,
    shared::{Toast, render_fragment, stream_action_error, stream_panel_with_toast},
};

pub(super) async fn admin_subscribers(
    State(state): State<AdminState>,
    Extension(session): Extension<Session>,
) -> Response {
    let chrome = state.chrome.load("/subscribers", &session.user);

    let content = match build_subscribers_view(&state, &session).await {
        Ok(content) => content,
        Err(err) => return err.into_response(),
    };

    let view = admin_views::AdminLayout::new(chrome, content);
    render_template_response(admin_views::AdminSubscribersTemplate { view }, StatusCode::OK)
}

pub(super) async fn admin_subscriber_delete(
    State(state): State<AdminState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Response {
    const SOURCE: &str = "infra::http::admin_subscriber_delete";

    if let Err(err) = state.subscribers.delete(&session.token, id).await {
        return stream_action_error(repo_error_to_http(SOURCE, err));
    }

    let content = match build_subscribers_view(&state, &session).await {
        Ok(content) => content,
        Err(err) => return stream_action_error(err),
    };

    match render_fragment(admin_views::AdminSubscribersPanelTemplate { content }, SOURCE) {
        Ok(html) => stream_panel_with_toast(SUBSCRIBERS_PANEL, html, Toast::success("Subscriber removed")),
        Err(err) => err.into_response(),
    }
}

async fn build_subscribers_view(
    state: &AdminState,
    session: &Session,
) -> Result<admin_views::AdminSubscribersView, HttpError> {
    let subscribers = state
        .subscribers
        .list(&session.token)
        .await
        .map_err(|err| repo_error_to_http("infra::http::admin_subscribers", err))?;

    let active = subscribers.iter().filter(|s| s.is_active).count();
    let rows: Vec<_> = subscribers.iter().map(subscriber_row).collect();

    Ok(admin_views::AdminSubscribersView {
        heading: "Subscribers".to_string(),
        total: rows.len(),
        active,
        subscribers: rows,
        empty_message: "Nobody has subscribed yet.".to_string(),
    })
}

fn subscriber_row(subscriber: &SubscriberRecord) -> admin_views::AdminSubscriberRowView {
    admin_views::AdminSubscriberRowView {
        id: subscriber.id.to_string(),
        email: subscriber.email.clone(),
        is_active: subscriber.is_active,
        status_label: if subscriber.is_active {
            "Active"
        } else {
            "Unsubscribed"
        },
        subscribed: format_date(subscriber.created_at, ADMIN_TIMESTAMP_FORMAT),
        confirmed: format_date(subscriber.confirmed_at, ADMIN_TIMESTAMP_FORMAT),
        delete_action: format!("/subscribers/{}/delete", subscriber.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_subscribers_read_as_unsubscribed() {
        let row = subscriber_row(&SubscriberRecord {
            id: Uuid::nil(),
            email: "reader@example.com".into(),
            is_active: false,
            confirmed_at: None,
            created_at: None,
        });
        assert_eq!(row.status_label, "Unsubscribed");
        assert_eq!(row.confirmed, "");
        assert!(row.delete_action.ends_with("/delete"));
    }
}
