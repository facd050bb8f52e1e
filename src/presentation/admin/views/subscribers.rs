use askama::Template;

use super::AdminLayout;

#[derive(Clone)]
pub struct AdminSubscriberRowView {
    pub id: String,
    pub email: String,
    pub is_active: bool,
    pub status_label: &'static str,
    pub subscribed: String,
    pub confirmed: String,
    pub delete_action: String,
}

#[derive(Clone)]
pub struct AdminSubscribersView {
    pub heading: String,
    pub subscribers: Vec<AdminSubscriberRowView>,
    pub total: usize,
    pub active: usize,
    pub empty_message: String,
}

#[derive(Template)]
#[template(path = "admin/subscribers.html")]
pub struct AdminSubscribersTemplate {
    pub view: AdminLayout<AdminSubscribersView>,
}

#[derive(Template)]
#[template(path = "admin/subscribers_panel.html")]
pub struct AdminSubscribersPanelTemplate {
    pub content: AdminSubscribersView,
}
