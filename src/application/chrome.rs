use crate::config::SiteSettings;
use crate::presentation::views::{
    BrandView, FooterView, LayoutChrome, NavigationLinkView, NavigationView, NewsletterBlockView,
    PageMetaView,
};

const NAV_ITEMS: &[(&str, &str)] = &[
    ("/", "Home"),
    ("/blog", "Blog"),
    ("/categories", "Categories"),
    ("/about", "About"),
];

/// Builds the page frame shared by every public page.
#[derive(Clone)]
pub struct ChromeService {
    site: SiteSettings,
}

impl ChromeService {
    pub fn new(site: SiteSettings) -> Self {
        Self { site }
    }

    pub fn site(&self) -> &SiteSettings {
        &self.site
    }

    /// Chrome for the page at `path`. The navigation entry owning `path` is marked active, and the
    /// footer newsletter form returns readers to `path`.
    pub fn load(&self, path: &str) -> LayoutChrome {
        let entries = NAV_ITEMS
            .iter()
            .map(|(href, label)| NavigationLinkView {
                label: (*label).to_string(),
                href: (*href).to_string(),
                is_active: is_active_section(href, path),
            })
            .collect();

        LayoutChrome {
            brand: BrandView {
                title: self.site.title.clone(),
                href: "/".to_string(),
            },
            navigation: NavigationView { entries },
            footer: FooterView {
                copy: self.site.footer.clone(),
                description: self.site.description.clone(),
                newsletter: NewsletterBlockView {
                    return_to: path.to_string(),
                    flash: None,
                },
            },
            meta: PageMetaView {
                title: self.site.title.clone(),
                description: self.site.description.clone(),
                canonical: self.canonical(path),
            },
        }
    }

    /// Absolute URL for `path_and_query` on the public site.
    pub fn canonical(&self, path_and_query: &str) -> String {
        format!("{}{}", self.site.public_url, path_and_query)
    }
}

fn is_active_section(href: &str, path: &str) -> bool {
    if href == "/" {
        return path == "/";
    }
    path == href
        || path
            .strip_prefix(href)
            .is_some_and(|rest| rest.starts_with('/'))
}
