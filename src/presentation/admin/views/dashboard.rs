use askama::Template;

use super::AdminLayout;

#[derive(Clone)]
pub struct AdminMetricView {
    pub label: String,
    pub value: u64,
    pub hint: Option<String>,
    pub href: String,
}

#[derive(Clone)]
pub struct AdminRecentPostView {
    pub title: String,
    pub status_key: String,
    pub status_label: String,
    pub updated: String,
    pub edit_href: String,
}

#[derive(Clone)]
pub struct AdminDashboardView {
    pub title: String,
    pub metrics: Vec<AdminMetricView>,
    pub recent_posts: Vec<AdminRecentPostView>,
    pub new_post_href: String,
    pub empty_message: String,
}

impl AdminDashboardView {
    pub fn has_recent_posts(&self) -> bool {
        !self.recent_posts.is_empty()
    }
}

#[derive(Template)]
#[template(path = "admin/dashboard.html")]
pub struct AdminDashboardTemplate {
    pub view: AdminLayout<AdminDashboardView>,
}
