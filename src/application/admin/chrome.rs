use crate::config::SiteSettings;
use crate::domain::entities::UserRecord;
use crate::presentation::admin::views::{
    AdminBrandView, AdminChrome, AdminMetaView, AdminNavigationItemView, AdminNavigationView,
};

const NAV_ITEMS: &[(&str, &str)] = &[
    ("/", "Dashboard"),
    ("/posts", "Posts"),
    ("/posts/new", "New post"),
    ("/comments", "Comments"),
    ("/categories", "Categories"),
    ("/tags", "Tags"),
    ("/subscribers", "Subscribers"),
];

#[derive(Clone)]
pub struct AdminChromeService {
    site: SiteSettings,
}

impl AdminChromeService {
    pub fn new(site: SiteSettings) -> Self {
        Self { site }
    }

    pub fn load(&self, active_path: &str, user: &UserRecord) -> AdminChrome {
        let brand = AdminBrandView {
            title: self.brand_title(),
        };

        let mut items: Vec<AdminNavigationItemView> = NAV_ITEMS
            .iter()
            .map(|(href, label)| AdminNavigationItemView {
                label: (*label).to_string(),
                href: (*href).to_string(),
                is_active: *href == active_path,
                open_in_new_tab: false,
            })
            .collect();

        items.push(AdminNavigationItemView {
            label: "View site".to_string(),
            href: format!("{}/", self.site.public_url),
            is_active: false,
            open_in_new_tab: true,
        });

        let active_label = items
            .iter()
            .find(|item| item.is_active)
            .map(|item| item.label.as_str())
            .unwrap_or("Dashboard");

        let meta = AdminMetaView {
            title: format!("{} · {}", brand.title, active_label),
            description: "Content management".to_string(),
        };

        AdminChrome {
            brand,
            navigation: AdminNavigationView { items },
            meta,
            user_name: user.display_name().to_string(),
        }
    }

    /// Public URL of a post, for "view" links next to admin rows.
    pub fn public_post_href(&self, slug: &str) -> String {
        format!("{}/blog/{slug}", self.site.public_url)
    }

    pub fn brand_title(&self) -> String {
        format!("{} Admin", self.site.title)
    }

    pub fn public_url(&self) -> &str {
        &self.site.public_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    use crate::domain::types::UserRole;

    fn service() -> AdminChromeService {
        AdminChromeService::new(SiteSettings {
            title: "Quire".into(),
            description: String::new(),
            public_url: "https://blog.example.com".into(),
            footer: String::new(),
        })
    }

    fn editor() -> UserRecord {
        UserRecord {
            id: Uuid::nil(),
            username: "ed".into(),
            email: "ed@example.com".into(),
            name: String::new(),
            role: UserRole::Author,
            is_active: true,
        }
    }

    #[test]
    fn marks_active_item_and_titles_page() {
        let chrome = service().load("/comments", &editor());
        let active: Vec<_> = chrome
            .navigation
            .items
            .iter()
            .filter(|item| item.is_active)
            .map(|item| item.label.as_str())
            .collect();
        assert_eq!(active, vec!["Comments"]);
        assert_eq!(chrome.meta.title, "Quire Admin · Comments");
        assert_eq!(chrome.user_name, "ed");
    }

    #[test]
    fn view_site_opens_public_url() {
        let chrome = service().load("/", &editor());
        let last = chrome.navigation.items.last().expect("view site");
        assert_eq!(last.label, "View site");
        assert_eq!(last.href, "https://blog.example.com/");
        assert!(last.open_in_new_tab);
    }
}
