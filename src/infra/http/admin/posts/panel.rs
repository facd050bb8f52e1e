use crate::{
    application::{
        admin::posts::{AdminPostError, AdminPostFilter},
        error::HttpError,
        repos::AccessToken,
    },
    domain::{
        entities::PostRecord,
        posts::{ADMIN_TIMESTAMP_FORMAT, format_date},
        types::PostStatus,
    },
    infra::http::admin::{AdminState, shared::render_fragment},
    presentation::admin::views as admin_views,
};

use super::status::status_filters;

pub(super) async fn build_post_list_view(
    state: &AdminState,
    token: &AccessToken,
    filter: &AdminPostFilter,
) -> Result<admin_views::AdminPostListView, AdminPostError> {
    let listing = state.posts.list(token, filter).await?;

    let posts: Vec<_> = listing
        .posts
        .iter()
        .map(|post| post_row(state, post))
        .collect();

    let is_filtered = filter.status.is_some() || filter.search.is_some();
    let empty_message = if is_filtered {
        "No posts match these filters."
    } else {
        "No posts yet. Write the first one."
    };

    let pagination = admin_views::AdminPaginationView::build(
        listing.offset,
        listing.limit,
        posts.len(),
        listing.total,
    );

    Ok(admin_views::AdminPostListView {
        heading: "Posts".to_string(),
        filters: status_filters(&listing.counts, filter.status),
        posts,
        filter_search: filter.search.clone().unwrap_or_default(),
        active_status: filter
            .status
            .map(|status| status.as_str().to_string())
            .unwrap_or_default(),
        offset: listing.offset,
        total: listing.total,
        pagination,
        panel_action: "/posts/panel".to_string(),
        new_post_href: "/posts/new".to_string(),
        empty_message: empty_message.to_string(),
    })
}

fn post_row(state: &AdminState, post: &PostRecord) -> admin_views::AdminPostRowView {
    admin_views::AdminPostRowView {
        id: post.id.to_string(),
        title: post.title.clone(),
        slug: post.slug.clone(),
        status_key: post.status.as_str().to_string(),
        status_label: post.status.label().to_string(),
        category: post
            .categories
            .first()
            .map(|category| category.name.clone())
            .unwrap_or_else(|| "—".to_string()),
        tags: post.tags.join(", "),
        created: format_date(post.created_at, ADMIN_TIMESTAMP_FORMAT),
        updated: format_date(post.updated_at, ADMIN_TIMESTAMP_FORMAT),
        edit_href: format!("/posts/{}/edit", post.id),
        public_href: post
            .is_published()
            .then(|| state.chrome.public_post_href(&post.slug)),
        actions: post_actions_for_status(&post.id.to_string(), post.status),
    }
}

pub(super) fn post_actions_for_status(
    id: &str,
    status: PostStatus,
) -> Vec<admin_views::AdminPostRowActionView> {
    let mut actions = Vec::new();

    match status {
        PostStatus::Published => actions.push(admin_views::AdminPostRowActionView {
            action: format!("/posts/{id}/unpublish"),
            label: "Unpublish",
            is_danger: false,
            confirm: None,
        }),
        PostStatus::Draft | PostStatus::Archived => {
            actions.push(admin_views::AdminPostRowActionView {
                action: format!("/posts/{id}/publish"),
                label: "Publish",
                is_danger: false,
                confirm: None,
            })
        }
    }

    actions.push(admin_views::AdminPostRowActionView {
        action: format!("/posts/{id}/delete"),
        label: "Delete",
        is_danger: true,
        confirm: Some("Delete this post permanently?"),
    });

    actions
}

pub(super) fn render_post_panel_html(
    content: admin_views::AdminPostListView,
    source: &'static str,
) -> Result<String, HttpError> {
    render_fragment(admin_views::AdminPostsPanelTemplate { content }, source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn published_rows_offer_unpublish() {
        let actions = post_actions_for_status("p1", PostStatus::Published);
        let labels: Vec<_> = actions.iter().map(|action| action.label).collect();
        assert_eq!(labels, vec!["Unpublish", "Delete"]);
        assert_eq!(actions[0].action, "/posts/p1/unpublish");
    }

    #[test]
    fn drafts_offer_publish_and_confirmed_delete() {
        let actions = post_actions_for_status("p2", PostStatus::Draft);
        assert_eq!(actions[0].action, "/posts/p2/publish");
        assert!(actions[1].is_danger);
        assert!(actions[1].confirm.is_some());
    }
}
