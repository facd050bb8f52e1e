use askama::Template;

use super::AdminLayout;

#[derive(Clone)]
pub struct AdminCategoryRowView {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub color: String,
    pub public_href: String,
    pub update_action: String,
    pub delete_action: String,
}

#[derive(Clone)]
pub struct AdminCategoriesView {
    pub heading: String,
    pub categories: Vec<AdminCategoryRowView>,
    pub create_action: String,
    pub default_color: String,
    pub empty_message: String,
}

#[derive(Template)]
#[template(path = "admin/categories.html")]
pub struct AdminCategoriesTemplate {
    pub view: AdminLayout<AdminCategoriesView>,
}

#[derive(Template)]
#[template(path = "admin/categories_panel.html")]
pub struct AdminCategoriesPanelTemplate {
    pub content: AdminCategoriesView,
}

#[derive(Clone)]
pub struct AdminTagRowView {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub public_href: String,
    pub update_action: String,
    pub delete_action: String,
}

#[derive(Clone)]
pub struct AdminTagListView {
    pub heading: String,
    pub tags: Vec<AdminTagRowView>,
    pub create_action: String,
    pub empty_message: String,
}

#[derive(Template)]
#[template(path = "admin/tags.html")]
pub struct AdminTagsTemplate {
    pub view: AdminLayout<AdminTagListView>,
}

#[derive(Template)]
#[template(path = "admin/tags_panel.html")]
pub struct AdminTagsPanelTemplate {
    pub content: AdminTagListView,
}
