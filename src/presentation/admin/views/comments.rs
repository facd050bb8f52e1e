use askama::Template;

use super::{AdminLayout, AdminPaginationView, AdminStatusFilterView};

#[derive(Clone)]
pub struct AdminCommentRowView {
    pub id: String,
    pub author: String,
    pub email: String,
    pub website: String,
    pub content: String,
    pub status_key: String,
    pub status_label: String,
    pub created: String,
    pub post_title: String,
    pub post_href: Option<String>,
    pub can_approve: bool,
    pub can_reject: bool,
    pub approve_action: String,
    pub reject_action: String,
    pub update_action: String,
    pub delete_action: String,
}

#[derive(Clone)]
pub struct AdminCommentListView {
    pub heading: String,
    pub filters: Vec<AdminStatusFilterView>,
    pub comments: Vec<AdminCommentRowView>,
    pub active_status: String,
    pub offset: u64,
    pub total: u64,
    pub pagination: Option<AdminPaginationView>,
    pub panel_action: String,
    pub empty_message: String,
}

#[derive(Template)]
#[template(path = "admin/comments.html")]
pub struct AdminCommentsTemplate {
    pub view: AdminLayout<AdminCommentListView>,
}

#[derive(Template)]
#[template(path = "admin/comments_panel.html")]
pub struct AdminCommentsPanelTemplate {
    pub content: AdminCommentListView,
}
