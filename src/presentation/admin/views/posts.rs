use askama::Template;

use super::{AdminLayout, AdminPaginationView, AdminStatusFilterView};

#[derive(Clone)]
pub struct AdminPostRowView {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub status_key: String,
    pub status_label: String,
    pub category: String,
    pub tags: String,
    pub created: String,
    pub updated: String,
    pub edit_href: String,
    pub public_href: Option<String>,
    pub actions: Vec<AdminPostRowActionView>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminPostRowActionView {
    pub action: String,
    pub label: &'static str,
    pub is_danger: bool,
    pub confirm: Option<&'static str>,
}

#[derive(Clone)]
pub struct AdminPostListView {
    pub heading: String,
    pub filters: Vec<AdminStatusFilterView>,
    pub posts: Vec<AdminPostRowView>,
    pub filter_search: String,
    pub active_status: String,
    pub offset: u64,
    pub total: u64,
    pub pagination: Option<AdminPaginationView>,
    pub panel_action: String,
    pub new_post_href: String,
    pub empty_message: String,
}

#[derive(Template)]
#[template(path = "admin/posts.html")]
pub struct AdminPostsTemplate {
    pub view: AdminLayout<AdminPostListView>,
}

#[derive(Template)]
#[template(path = "admin/posts_panel.html")]
pub struct AdminPostsPanelTemplate {
    pub content: AdminPostListView,
}
