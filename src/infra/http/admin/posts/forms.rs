use serde::Deserialize;

use crate::application::admin::posts::PostForm;

/// List filters, from the query string on page loads and from the filter form on panel refreshes.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AdminPostListQuery {
    pub(crate) status: Option<String>,
    pub(crate) search: Option<String>,
    pub(crate) offset: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AdminPostPanelForm {
    pub(crate) status: Option<String>,
    pub(crate) search: Option<String>,
    pub(crate) offset: Option<String>,
    pub(crate) clear: Option<String>,
}

/// Row actions carry the list state so the refreshed panel keeps its filters.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AdminPostActionForm {
    pub(crate) status_filter: Option<String>,
    pub(crate) filter_search: Option<String>,
    pub(crate) offset: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AdminPostForm {
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) excerpt: String,
    pub(crate) body_markdown: String,
    pub(crate) featured_img: String,
    pub(crate) category: String,
    pub(crate) tags: String,
    pub(crate) intent: Option<String>,
}

impl AdminPostForm {
    pub(crate) fn to_post_form(&self) -> PostForm {
        PostForm {
            title: self.title.clone(),
            slug: self.slug.clone(),
            excerpt: self.excerpt.clone(),
            body_markdown: self.body_markdown.clone(),
            featured_img: self.featured_img.clone(),
            category: self.category.clone(),
            tags: self.tags.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AdminPostIntentQuery {
    pub(crate) intent: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AdminPostPreviewForm {
    pub(crate) body_markdown: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AdminPostSlugForm {
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) stored_slug: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AdminPostTagsForm {
    pub(crate) tags: String,
    pub(crate) tag_query: String,
}

/// `toggle` flips one name; `add` takes the typed query as a new tag.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AdminPostTagsQuery {
    pub(crate) toggle: Option<String>,
    pub(crate) add: Option<String>,
}
