use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    application::repos::Session,
    presentation::{admin::views as admin_views, views::render_template_response},
};

use super::AdminState;

pub(super) async fn admin_dashboard(
    State(state): State<AdminState>,
    Extension(session): Extension<Session>,
) -> Response {
    let chrome = state.chrome.load("/", &session.user);

    let content = match state.dashboard.overview(&session.token).await {
        Ok(view) => view,
        Err(err) => return err.into_response(),
    };

    let view = admin_views::AdminLayout::new(chrome, content);
    render_template_response(admin_views::AdminDashboardTemplate { view }, StatusCode::OK)
}
