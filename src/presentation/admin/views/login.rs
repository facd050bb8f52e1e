use askama::Template;

#[derive(Clone, Default)]
pub struct AdminLoginView {
    pub title: String,
    pub email: String,
    pub error: Option<String>,
    pub form_action: String,
    pub next: String,
    pub asset_version: String,
}

#[derive(Template)]
#[template(path = "admin/login.html")]
pub struct AdminLoginTemplate {
    pub view: AdminLoginView,
}
