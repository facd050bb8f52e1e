mod comments;
mod dashboard;
mod editor;
mod login;
mod posts;
mod subscribers;
mod taxonomy;

pub use comments::*;
pub use dashboard::*;
pub use editor::*;
pub use login::*;
pub use posts::*;
pub use subscribers::*;
pub use taxonomy::*;

use askama::Template;

#[derive(Clone)]
pub struct AdminBrandView {
    pub title: String,
}

#[derive(Clone)]
pub struct AdminNavigationItemView {
    pub label: String,
    pub href: String,
    pub is_active: bool,
    pub open_in_new_tab: bool,
}

#[derive(Clone)]
pub struct AdminNavigationView {
    pub items: Vec<AdminNavigationItemView>,
}

#[derive(Clone)]
pub struct AdminMetaView {
    pub title: String,
    pub description: String,
}

#[derive(Clone)]
pub struct AdminChrome {
    pub brand: AdminBrandView,
    pub navigation: AdminNavigationView,
    pub meta: AdminMetaView,
    pub user_name: String,
}

#[derive(Clone)]
pub struct AdminLayout<T> {
    pub chrome: AdminChrome,
    pub asset_version: String,
    pub content: T,
}

impl<T> AdminLayout<T> {
    pub fn new(chrome: AdminChrome, content: T) -> Self {
        Self {
            chrome,
            asset_version: asset_version(),
            content,
        }
    }
}

pub(crate) fn asset_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[derive(Clone)]
pub struct AdminToastItem {
    pub id: String,
    pub kind: &'static str,
    pub text: String,
    pub ttl_ms: u64,
}

#[derive(Template)]
#[template(path = "admin/toast_stack.html")]
pub struct AdminToastStackTemplate {
    pub toasts: Vec<AdminToastItem>,
}

/// One tab of a status filter bar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminStatusFilterView {
    pub value: String,
    pub label: String,
    pub count: Option<u64>,
    pub is_active: bool,
}

/// Offset-based paging for admin tables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminPaginationView {
    pub summary: String,
    pub previous_offset: Option<u64>,
    pub next_offset: Option<u64>,
}

impl AdminPaginationView {
    pub fn build(offset: u64, limit: u32, shown: usize, total: u64) -> Option<Self> {
        let limit = u64::from(limit.max(1));
        if total <= limit && offset == 0 {
            return None;
        }
        let first = if shown == 0 { 0 } else { offset + 1 };
        let last = offset + shown as u64;
        Some(Self {
            summary: format!("{first}–{last} of {total}"),
            previous_offset: (offset > 0).then(|| offset.saturating_sub(limit)),
            next_offset: (last < total).then_some(last),
        })
    }
}
