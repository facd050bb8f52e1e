use axum::{
    Extension,
    extract::{Form, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    application::{
        admin::taxonomy::{AdminTaxonomyError, DEFAULT_CATEGORY_COLOR},
        error::HttpError,
        repos::{CategoryDraft, Session},
    },
    domain::entities::{CategoryRecord, TagRecord},
    infra::http::repo_error_to_http,
    presentation::{
        admin::views as admin_views,
        views::{encode_query_value, render_template_response},
    },
};

use super::{
    AdminState,
    selectors::{CATEGORIES_PANEL, TAGS_PANEL},
    shared::{render_fragment, stream_action_error, stream_panel_with_toast, Toast},
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct AdminCategoryForm {
    name: String,
    description: String,
    color: String,
}

impl AdminCategoryForm {
    fn into_draft(self) -> CategoryDraft {
        CategoryDraft {
            name: self.name,
            description: self.description,
            color: self.color,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct AdminTagForm {
    name: String,
}

pub(super) fn admin_taxonomy_error(source: &'static str, err: AdminTaxonomyError) -> HttpError {
    match err {
        AdminTaxonomyError::ConstraintViolation(message) => HttpError::new(
            source,
            StatusCode::UNPROCESSABLE_ENTITY,
            "Taxonomy change rejected",
            message,
        ),
        AdminTaxonomyError::Repo(err) => repo_error_to_http(source, err),
    }
}

pub(super) async fn admin_categories(
    State(state): State<AdminState>,
    Extension(session): Extension<Session>,
) -> Response {
    let chrome = state.chrome.load("/categories", &session.user);

    let content = match build_categories_view(&state).await {
        Ok(content) => content,
        Err(err) => return err.into_response(),
    };

    let view = admin_views::AdminLayout::new(chrome, content);
    render_template_response(admin_views::AdminCategoriesTemplate { view }, StatusCode::OK)
}

pub(super) async fn admin_category_create(
    State(state): State<AdminState>,
    Extension(session): Extension<Session>,
    Form(form): Form<AdminCategoryForm>,
) -> Response {
    match state
        .taxonomy
        .create_category(&session.token, form.into_draft())
        .await
    {
        Ok(category) => {
            respond_with_categories(&state, Toast::success(format!("Added \"{}\"", category.name)))
                .await
        }
        Err(err) => stream_action_error(admin_taxonomy_error(
            "infra::http::admin_category_create",
            err,
        )),
    }
}

pub(super) async fn admin_category_update(
    State(state): State<AdminState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Form(form): Form<AdminCategoryForm>,
) -> Response {
    match state
        .taxonomy
        .update_category(&session.token, id, form.into_draft())
        .await
    {
        Ok(category) => {
            respond_with_categories(
                &state,
                Toast::success(format!("Updated \"{}\"", category.name)),
            )
            .await
        }
        Err(err) => stream_action_error(admin_taxonomy_error(
            "infra::http::admin_category_update",
            err,
        )),
    }
}

pub(super) async fn admin_category_delete(
    State(state): State<AdminState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Response {
    match state.taxonomy.delete_category(&session.token, id).await {
        Ok(()) => respond_with_categories(&state, Toast::success("Category deleted")).await,
        Err(err) => stream_action_error(admin_taxonomy_error(
            "infra::http::admin_category_delete",
            err,
        )),
    }
}

async fn respond_with_categories(state: &AdminState, toast: Toast) -> Response {
    const SOURCE: &str = "infra::http::admin_categories_panel";

    let content = match build_categories_view(state).await {
        Ok(content) => content,
        Err(err) => return stream_action_error(err),
    };

    match render_fragment(admin_views::AdminCategoriesPanelTemplate { content }, SOURCE) {
        Ok(html) => stream_panel_with_toast(CATEGORIES_PANEL, html, toast),
        Err(err) => err.into_response(),
    }
}

async fn build_categories_view(
    state: &AdminState,
) -> Result<admin_views::AdminCategoriesView, HttpError> {
    let categories = state
        .taxonomy
        .categories()
        .await
        .map_err(|err| admin_taxonomy_error("infra::http::admin_categories", err))?;

    Ok(admin_views::AdminCategoriesView {
        heading: "Categories".to_string(),
        categories: categories
            .iter()
            .map(|category| category_row(state, category))
            .collect(),
        create_action: "/categories/create".to_string(),
        default_color: DEFAULT_CATEGORY_COLOR.to_string(),
        empty_message: "No categories yet.".to_string(),
    })
}

fn category_row(state: &AdminState, category: &CategoryRecord) -> admin_views::AdminCategoryRowView {
    admin_views::AdminCategoryRowView {
        id: category.id.to_string(),
        name: category.name.clone(),
        slug: category.slug.clone(),
        description: category.description.clone(),
        color: category.color.clone(),
        public_href: format!(
            "{}/categories?category={}",
            state.chrome.public_url(),
            encode_query_value(&category.slug)
        ),
        update_action: format!("/categories/{}/edit", category.id),
        delete_action: format!("/categories/{}/delete", category.id),
    }
}

pub(super) async fn admin_tags(
    State(state): State<AdminState>,
    Extension(session): Extension<Session>,
) -> Response {
    let chrome = state.chrome.load("/tags", &session.user);

    let content = match build_tags_view(&state).await {
        Ok(content) => content,
        Err(err) => return err.into_response(),
    };

    let view = admin_views::AdminLayout::new(chrome, content);
    render_template_response(admin_views::AdminTagsTemplate { view }, StatusCode::OK)
}

pub(super) async fn admin_tag_create(
    State(state): State<AdminState>,
    Extension(session): Extension<Session>,
    Form(form): Form<AdminTagForm>,
) -> Response {
    match state.taxonomy.create_tag(&session.token, &form.name).await {
        Ok(tag) => respond_with_tags(&state, Toast::success(format!("Added \"{}\"", tag.name))).await,
        Err(err) => stream_action_error(admin_taxonomy_error("infra::http::admin_tag_create", err)),
    }
}

pub(super) async fn admin_tag_update(
    State(state): State<AdminState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Form(form): Form<AdminTagForm>,
) -> Response {
    match state.taxonomy.update_tag(&session.token, id, &form.name).await {
        Ok(tag) => {
            respond_with_tags(&state, Toast::success(format!("Renamed to \"{}\"", tag.name))).await
        }
        Err(err) => stream_action_error(admin_taxonomy_error("infra::http::admin_tag_update", err)),
    }
}

pub(super) async fn admin_tag_delete(
    State(state): State<AdminState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Response {
    match state.taxonomy.delete_tag(&session.token, id).await {
        Ok(()) => respond_with_tags(&state, Toast::success("Tag deleted")).await,
        Err(err) => stream_action_error(admin_taxonomy_error("infra::http::admin_tag_delete", err)),
    }
}

async fn respond_with_tags(state: &AdminState, toast: Toast) -> Response {
    const SOURCE: &str = "infra::http::admin_tags_panel";

    let content = match build_tags_view(state).await {
        Ok(content) => content,
        Err(err) => return stream_action_error(err),
    };

    match render_fragment(admin_views::AdminTagsPanelTemplate { content }, SOURCE) {
        Ok(html) => stream_panel_with_toast(TAGS_PANEL, html, toast),
        Err(err) => err.into_response(),
    }
}

async fn build_tags_view(state: &AdminState) -> Result<admin_views::AdminTagListView, HttpError> {
    let tags = state
        .taxonomy
        .tags()
        .await
        .map_err(|err| admin_taxonomy_error("infra::http::admin_tags", err))?;

    Ok(admin_views::AdminTagListView {
        heading: "Tags".to_string(),
        tags: tags.iter().map(|tag| tag_row(state, tag)).collect(),
        create_action: "/tags/create".to_string(),
        empty_message: "No tags yet.".to_string(),
    })
}

fn tag_row(state: &AdminState, tag: &TagRecord) -> admin_views::AdminTagRowView {
    admin_views::AdminTagRowView {
        id: tag.id.to_string(),
        name: tag.name.clone(),
        slug: tag.slug.clone(),
        public_href: format!(
            "{}/blog?tags={}",
            state.chrome.public_url(),
            encode_query_value(&tag.name)
        ),
        update_action: format!("/tags/{}/edit", tag.id),
        delete_action: format!("/tags/{}/delete", tag.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::repos::RepoError;

    #[test]
    fn constraint_violations_are_unprocessable() {
        let err = admin_taxonomy_error(
            "test",
            AdminTaxonomyError::ConstraintViolation("Category name is required"),
        );
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.report().messages[0], "Category name is required");
    }

    #[test]
    fn upstream_conflicts_keep_their_status() {
        let err = admin_taxonomy_error(
            "test",
            AdminTaxonomyError::Repo(RepoError::Rejected {
                status: 409,
                message: "name already exists".into(),
            }),
        );
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }
}
