use tracing::warn;

use crate::{
    application::{
        admin::posts::PostForm, error::HttpError, render::render_service,
    },
    domain::{
        entities::PostRecord,
        posts::{TagSelection, filter_options, format_reading_time, image_url},
        slug::{slugify_title, suggest_slug},
        types::PostStatus,
    },
    infra::http::admin::{AdminState, taxonomy::admin_taxonomy_error},
    presentation::{admin::views as admin_views, views::encode_query_value},
};

const TAG_TOGGLE_ACTION: &str = "/posts/tags";

pub(super) async fn build_post_editor_view(
    state: &AdminState,
    post: Option<&PostRecord>,
    form: &PostForm,
) -> Result<admin_views::AdminPostEditorView, HttpError> {
    let (categories, tags) = tokio::try_join!(state.taxonomy.categories(), state.taxonomy.tags())
        .map_err(|err| admin_taxonomy_error("infra::http::admin::build_post_editor_view", err))?;

    let mut category_options: Vec<admin_views::AdminCategoryOptionView> = categories
        .iter()
        .map(|category| admin_views::AdminCategoryOptionView {
            name: category.name.clone(),
            is_selected: category.name.eq_ignore_ascii_case(form.category.trim()),
        })
        .collect();
    let current_category = form.category.trim();
    if !current_category.is_empty() && !category_options.iter().any(|option| option.is_selected) {
        category_options.push(admin_views::AdminCategoryOptionView {
            name: current_category.to_string(),
            is_selected: true,
        });
    }

    let tag_names: Vec<String> = tags.into_iter().map(|tag| tag.name).collect();
    let selection = TagSelection::from_field(&form.tags);
    let status = post.map(|post| post.status).unwrap_or(PostStatus::Draft);

    Ok(admin_views::AdminPostEditorView {
        heading: match post {
            Some(post) => format!("Edit Post: {}", post.title),
            None => "New Post".to_string(),
        },
        post_id: post.map(|post| post.id.to_string()),
        title: form.title.clone(),
        slug: form.slug.clone(),
        stored_slug: post.map(|post| post.slug.clone()),
        slug_hint: slug_hint_view(
            &form.title,
            &form.slug,
            post.map(|post| post.slug.as_str()),
        ),
        excerpt: form.excerpt.clone(),
        body_markdown: form.body_markdown.clone(),
        status_key: status.as_str().to_string(),
        status_label: status.label().to_string(),
        category_options,
        tag_picker: build_tag_picker_view(&tag_names, &selection, ""),
        featured: featured_image_view(state, &form.featured_img, None),
        preview: preview_view(&form.body_markdown),
        autosave: post.map(|_| admin_views::AdminAutosaveStatusView::idle()),
        form_action: match post {
            Some(post) => format!("/posts/{}/edit", post.id),
            None => "/posts/create".to_string(),
        },
        preview_action: "/posts/preview".to_string(),
        slug_action: "/posts/slug".to_string(),
        autosave_action: post.map(|post| format!("/posts/{}/autosave", post.id)),
        public_href: post
            .filter(|post| post.is_published())
            .map(|post| state.chrome.public_post_href(&post.slug)),
        error: None,
    })
}

/// Known tags plus any typed-in names, filtered by `query`.
pub(super) fn build_tag_picker_view(
    known: &[String],
    selection: &TagSelection,
    query: &str,
) -> admin_views::AdminTagPickerView {
    let mut names = known.to_vec();
    for name in selection.names() {
        if !names.iter().any(|known| known.eq_ignore_ascii_case(name)) {
            names.push(name.clone());
        }
    }

    let options = filter_options(&names, query)
        .into_iter()
        .map(|name| admin_views::AdminTagOptionView {
            name: name.to_string(),
            is_selected: selection.contains(name),
            toggle_href: format!("{TAG_TOGGLE_ACTION}?toggle={}", encode_query_value(name)),
        })
        .collect();

    admin_views::AdminTagPickerView {
        toggle_action: TAG_TOGGLE_ACTION.to_string(),
        field_value: selection.to_field(),
        query: query.trim().to_string(),
        options,
        selected: selection.names().to_vec(),
    }
}

/// Address preview under the slug field. A blank slug follows the title only for new posts;
/// saved posts keep `stored`.
pub(super) fn slug_hint_view(
    title: &str,
    slug: &str,
    stored: Option<&str>,
) -> admin_views::AdminSlugHintView {
    if !slug.trim().is_empty() {
        return admin_views::AdminSlugHintView {
            slug: slugify_title(slug),
            is_auto: false,
        };
    }

    match stored.map(str::trim).filter(|stored| !stored.is_empty()) {
        Some(stored) => admin_views::AdminSlugHintView {
            slug: stored.to_string(),
            is_auto: false,
        },
        None => admin_views::AdminSlugHintView {
            slug: suggest_slug(title),
            is_auto: true,
        },
    }
}

pub(super) fn preview_view(markdown: &str) -> admin_views::AdminPreviewView {
    if markdown.trim().is_empty() {
        return admin_views::AdminPreviewView::default();
    }

    match render_service().render(markdown) {
        Ok(output) => admin_views::AdminPreviewView {
            html: output.html,
            word_count: output.word_count,
            reading_time: format_reading_time(output.reading_time),
        },
        Err(err) => {
            warn!(
                target = "quire::http::admin::posts",
                error = %err,
                "markdown preview failed"
            );
            admin_views::AdminPreviewView::default()
        }
    }
}

pub(super) fn featured_image_view(
    state: &AdminState,
    value: &str,
    error: Option<String>,
) -> admin_views::AdminFeaturedImageView {
    let value = value.trim();
    admin_views::AdminFeaturedImageView {
        value: value.to_string(),
        preview_url: (!value.is_empty()).then(|| image_url(value, &state.api_origin)),
        upload_action: "/posts/featured".to_string(),
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_picker_keeps_typed_names_and_filters() {
        let known = vec!["Rust".to_string(), "Go".to_string()];
        let selection = TagSelection::from_field("rust, Tokio");

        let picker = build_tag_picker_view(&known, &selection, "");
        let names: Vec<_> = picker.options.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["Rust", "Go", "Tokio"]);
        assert!(picker.options[0].is_selected);
        assert!(!picker.options[1].is_selected);
        assert_eq!(picker.field_value, "rust, Tokio");

        let filtered = build_tag_picker_view(&known, &selection, "to");
        assert_eq!(filtered.options.len(), 1);
        assert_eq!(filtered.options[0].toggle_href, "/posts/tags?toggle=Tokio");
    }

    #[test]
    fn toggle_links_are_encoded() {
        let known = vec!["C & C++".to_string()];
        let picker = build_tag_picker_view(&known, &TagSelection::default(), "");
        assert_eq!(picker.options[0].toggle_href, "/posts/tags?toggle=C+%26+C%2B%2B");
    }

    #[test]
    fn slug_hint_prefers_explicit_slug() {
        assert!(slug_hint_view("Hello World", "", None).is_auto);
        let explicit = slug_hint_view("Hello World", "My Slug", None);
        assert!(!explicit.is_auto);
        assert_eq!(explicit.slug, "my-slug");
    }

    #[test]
    fn cleared_slug_keeps_stored_address_when_editing() {
        let hint = slug_hint_view("A Brand New Title", "  ", Some("original-post"));
        assert!(!hint.is_auto);
        assert_eq!(hint.slug, "original-post");
    }

    #[test]
    fn blank_markdown_has_no_preview() {
        assert!(!preview_view("   ").has_content());
        let preview = preview_view("# Title\n\nSome words here.");
        assert!(preview.has_content());
        assert!(preview.word_count >= 3);
    }
}
