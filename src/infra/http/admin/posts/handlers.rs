use axum::{
    Extension,
    extract::{Form, Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{
    application::{
        admin::posts::{AdminPostFilter, PostForm, SaveIntent},
        autosave::AutosaveOutcome,
        error::HttpError,
        repos::{ImageUpload, Session},
        stream::StreamBuilder,
    },
    domain::posts::TagSelection,
    infra::http::admin::{
        AdminState,
        selectors::{
            AUTOSAVE_STATUS, EDITOR, FEATURED_IMAGE, POST_PREVIEW, POSTS_PANEL, SLUG_HINT,
            TAG_PICKER,
        },
        shared::{
            Toast, blank_to_none_opt, datastar_replace, parse_offset, push_toasts,
            render_fragment, stream_action_error, stream_panel_with_toast,
        },
        taxonomy::admin_taxonomy_error,
    },
    presentation::{admin::views as admin_views, views::render_template_response},
};

use super::{
    errors::admin_post_error,
    forms::{
        AdminPostActionForm, AdminPostForm, AdminPostIntentQuery, AdminPostListQuery,
        AdminPostPanelForm, AdminPostPreviewForm, AdminPostSlugForm, AdminPostTagsForm,
        AdminPostTagsQuery,
    },
    panel::{build_post_list_view, render_post_panel_html},
    sections::{
        build_post_editor_view, build_tag_picker_view, featured_image_view, preview_view,
        slug_hint_view,
    },
    status::parse_post_status,
};

const FEATURED_IMAGE_FIELD: &str = "featured_image";

#[derive(Clone, Copy)]
enum RowAction {
    Publish,
    Unpublish,
    Delete,
}

impl RowAction {
    fn source(self) -> &'static str {
        match self {
            Self::Publish => "infra::http::admin_post_publish",
            Self::Unpublish => "infra::http::admin_post_unpublish",
            Self::Delete => "infra::http::admin_post_delete",
        }
    }

    fn done_message(self) -> &'static str {
        match self {
            Self::Publish => "Post published",
            Self::Unpublish => "Post moved back to drafts",
            Self::Delete => "Post deleted",
        }
    }
}

fn list_filter(
    status: Option<&str>,
    search: Option<String>,
    offset: Option<&str>,
) -> Result<AdminPostFilter, HttpError> {
    Ok(AdminPostFilter {
        status: parse_post_status(status)?,
        search: blank_to_none_opt(search),
        offset: parse_offset(offset),
    })
}

pub(crate) async fn admin_posts(
    State(state): State<AdminState>,
    Extension(session): Extension<Session>,
    Query(query): Query<AdminPostListQuery>,
) -> Response {
    let chrome = state.chrome.load("/posts", &session.user);

    let filter = match list_filter(
        query.status.as_deref(),
        query.search,
        query.offset.as_deref(),
    ) {
        Ok(filter) => filter,
        Err(err) => return err.into_response(),
    };

    let content = match build_post_list_view(&state, &session.token, &filter).await {
        Ok(content) => content,
        Err(err) => return admin_post_error("infra::http::admin_posts", err).into_response(),
    };

    let view = admin_views::AdminLayout::new(chrome, content);
    render_template_response(admin_views::AdminPostsTemplate { view }, StatusCode::OK)
}

pub(crate) async fn admin_posts_panel(
    State(state): State<AdminState>,
    Extension(session): Extension<Session>,
    Form(form): Form<AdminPostPanelForm>,
) -> Response {
    let filter = if form.clear.is_some() {
        AdminPostFilter::default()
    } else {
        match list_filter(
            form.status.as_deref(),
            form.search,
            form.offset.as_deref(),
        ) {
            Ok(filter) => filter,
            Err(err) => return stream_action_error(err),
        }
    };

    let content = match build_post_list_view(&state, &session.token, &filter).await {
        Ok(content) => content,
        Err(err) => {
            return stream_action_error(admin_post_error("infra::http::admin_posts_panel", err));
        }
    };

    match render_post_panel_html(content, "infra::http::admin_posts_panel") {
        Ok(html) => datastar_replace(POSTS_PANEL, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn admin_post_new(
    State(state): State<AdminState>,
    Extension(session): Extension<Session>,
) -> Response {
    let chrome = state.chrome.load("/posts/new", &session.user);

    let content = match build_post_editor_view(&state, None, &PostForm::default()).await {
        Ok(content) => content,
        Err(err) => return err.into_response(),
    };

    let view = admin_views::AdminLayout::new(chrome, content);
    render_template_response(admin_views::AdminPostEditTemplate { view }, StatusCode::OK)
}

pub(crate) async fn admin_post_create(
    State(state): State<AdminState>,
    Extension(session): Extension<Session>,
    Query(query): Query<AdminPostIntentQuery>,
    Form(form): Form<AdminPostForm>,
) -> Response {
    let intent = SaveIntent::parse(query.intent.as_deref().or(form.intent.as_deref()));

    match state
        .posts
        .create(&session.token, &form.to_post_form(), intent)
        .await
    {
        Ok(_) => {
            let mut stream = StreamBuilder::new();
            stream.push_redirect("/posts");
            stream.into_response()
        }
        Err(err) => stream_action_error(admin_post_error("infra::http::admin_post_create", err)),
    }
}

pub(crate) async fn admin_post_edit(
    State(state): State<AdminState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
) -> Response {
    let chrome = state.chrome.load("/posts", &session.user);

    let post = match state.posts.load(&session.token, id).await {
        Ok(post) => post,
        Err(err) => return admin_post_error("infra::http::admin_post_edit", err).into_response(),
    };

    let content =
        match build_post_editor_view(&state, Some(&post), &PostForm::from_record(&post)).await {
            Ok(content) => content,
            Err(err) => return err.into_response(),
        };

    let view = admin_views::AdminLayout::new(chrome, content);
    render_template_response(admin_views::AdminPostEditTemplate { view }, StatusCode::OK)
}

pub(crate) async fn admin_post_update(
    State(state): State<AdminState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Query(query): Query<AdminPostIntentQuery>,
    Form(form): Form<AdminPostForm>,
) -> Response {
    const SOURCE: &str = "infra::http::admin_post_update";

    let intent = SaveIntent::parse(query.intent.as_deref().or(form.intent.as_deref()));
    state.autosave.discard_pending(id).await;

    let post = match state
        .posts
        .update(&session.token, id, &form.to_post_form(), intent)
        .await
    {
        Ok(post) => post,
        Err(err) => return stream_action_error(admin_post_error(SOURCE, err)),
    };

    let content =
        match build_post_editor_view(&state, Some(&post), &PostForm::from_record(&post)).await {
            Ok(content) => content,
            Err(err) => return stream_action_error(err),
        };

    let html = match render_fragment(admin_views::AdminPostEditPanelTemplate { content }, SOURCE)
    {
        Ok(html) => html,
        Err(err) => return err.into_response(),
    };

    let message = match intent {
        SaveIntent::Publish => format!("Published \"{}\"", post.title),
        SaveIntent::Draft => format!("Saved \"{}\" as draft", post.title),
        SaveIntent::Keep => format!("Saved \"{}\"", post.title),
    };

    stream_panel_with_toast(EDITOR, html, Toast::success(message))
}

pub(crate) async fn admin_post_publish(
    State(state): State<AdminState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Form(form): Form<AdminPostActionForm>,
) -> Response {
    apply_row_action(&state, &session, id, &form, RowAction::Publish).await
}

pub(crate) async fn admin_post_unpublish(
    State(state): State<AdminState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Form(form): Form<AdminPostActionForm>,
) -> Response {
    apply_row_action(&state, &session, id, &form, RowAction::Unpublish).await
}

pub(crate) async fn admin_post_delete(
    State(state): State<AdminState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Form(form): Form<AdminPostActionForm>,
) -> Response {
    apply_row_action(&state, &session, id, &form, RowAction::Delete).await
}

async fn apply_row_action(
    state: &AdminState,
    session: &Session,
    id: Uuid,
    form: &AdminPostActionForm,
    action: RowAction,
) -> Response {
    let source = action.source();

    let filter = match list_filter(
        form.status_filter.as_deref(),
        form.filter_search.clone(),
        form.offset.as_deref(),
    ) {
        Ok(filter) => filter,
        Err(err) => return stream_action_error(err),
    };

    let result = match action {
        RowAction::Publish => state.posts.publish(&session.token, id).await,
        RowAction::Unpublish => state.posts.unpublish(&session.token, id).await,
        RowAction::Delete => {
            state.autosave.discard_pending(id).await;
            state.posts.delete(&session.token, id).await
        }
    };
    if let Err(err) = result {
        return stream_action_error(admin_post_error(source, err));
    }

    let content = match build_post_list_view(state, &session.token, &filter).await {
        Ok(content) => content,
        Err(err) => return stream_action_error(admin_post_error(source, err)),
    };

    match render_post_panel_html(content, source) {
        Ok(html) => stream_panel_with_toast(POSTS_PANEL, html, Toast::success(action.done_message())),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn admin_post_preview(Form(form): Form<AdminPostPreviewForm>) -> Response {
    let preview = preview_view(&form.body_markdown);
    match render_fragment(
        admin_views::AdminPostPreviewTemplate { preview },
        "infra::http::admin_post_preview",
    ) {
        Ok(html) => datastar_replace(POST_PREVIEW, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn admin_post_slug_hint(Form(form): Form<AdminPostSlugForm>) -> Response {
    let hint = slug_hint_view(&form.title, &form.slug, form.stored_slug.as_deref());
    match render_fragment(
        admin_views::AdminSlugHintTemplate { hint },
        "infra::http::admin_post_slug_hint",
    ) {
        Ok(html) => datastar_replace(SLUG_HINT, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn admin_post_tags(
    State(state): State<AdminState>,
    Query(params): Query<AdminPostTagsQuery>,
    Form(form): Form<AdminPostTagsForm>,
) -> Response {
    const SOURCE: &str = "infra::http::admin_post_tags";

    let mut selection = TagSelection::from_field(&form.tags);
    let mut query = form.tag_query;

    if let Some(name) = params.toggle.as_deref() {
        selection.toggle(name);
    } else if params.add.is_some() {
        let name = query.trim().to_string();
        if !selection.contains(&name) {
            selection.toggle(&name);
        }
        query.clear();
    }

    let known: Vec<String> = match state.taxonomy.tags().await {
        Ok(tags) => tags.into_iter().map(|tag| tag.name).collect(),
        Err(err) => return stream_action_error(admin_taxonomy_error(SOURCE, err)),
    };

    let picker = build_tag_picker_view(&known, &selection, &query);
    match render_fragment(admin_views::AdminTagPickerTemplate { picker }, SOURCE) {
        Ok(html) => datastar_replace(TAG_PICKER, html).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Debounced background save of an existing post. A request overtaken by a newer edit answers
/// `204` and leaves the status line alone.
pub(crate) async fn admin_post_autosave(
    State(state): State<AdminState>,
    Extension(session): Extension<Session>,
    Path(id): Path<Uuid>,
    Form(form): Form<AdminPostForm>,
) -> Response {
    let outcome = state
        .autosave
        .schedule(session.token.clone(), id, form.to_post_form())
        .await;

    let status = match &outcome {
        AutosaveOutcome::Superseded => return StatusCode::NO_CONTENT.into_response(),
        AutosaveOutcome::Failed(reason) => admin_views::AdminAutosaveStatusView::failed(reason),
        AutosaveOutcome::Saved { .. } => {
            admin_views::AdminAutosaveStatusView::saved(&outcome.clock().unwrap_or_default())
        }
    };

    match render_fragment(
        admin_views::AdminAutosaveStatusTemplate { status },
        "infra::http::admin_post_autosave",
    ) {
        Ok(html) => datastar_replace(AUTOSAVE_STATUS, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn admin_post_featured_upload(
    State(state): State<AdminState>,
    Extension(session): Extension<Session>,
    mut multipart: Multipart,
) -> Response {
    const SOURCE: &str = "infra::http::admin_post_featured_upload";

    let mut upload: Option<ImageUpload> = None;
    let mut current = String::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                return stream_action_error(HttpError::new(
                    SOURCE,
                    err.status(),
                    "Upload failed",
                    err.body_text(),
                ));
            }
        };

        match field.name() {
            Some(FEATURED_IMAGE_FIELD) => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "image".to_string());
                let content_type = field
                    .content_type()
                    .map(str::to_string)
                    .unwrap_or_else(|| {
                        mime_guess::from_path(&file_name)
                            .first_or_octet_stream()
                            .to_string()
                    });
                let bytes = match field.bytes().await {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        return stream_action_error(HttpError::new(
                            SOURCE,
                            err.status(),
                            "Upload failed",
                            err.body_text(),
                        ));
                    }
                };
                upload = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            Some("featured_img") => {
                current = field.text().await.unwrap_or_default();
            }
            _ => {}
        }
    }

    let Some(upload) = upload else {
        let image = featured_image_view(&state, &current, Some("Choose an image to upload".into()));
        return render_featured_image(image, None);
    };

    match state
        .posts
        .upload_featured_image(&session.token, upload)
        .await
    {
        Ok(url) => {
            let image = featured_image_view(&state, &url, None);
            render_featured_image(image, Some(Toast::success("Image uploaded")))
        }
        Err(err) => stream_action_error(admin_post_error(SOURCE, err)),
    }
}

fn render_featured_image(image: admin_views::AdminFeaturedImageView, toast: Option<Toast>) -> Response {
    const SOURCE: &str = "infra::http::admin_post_featured_upload";

    let html = match render_fragment(admin_views::AdminFeaturedImageTemplate { image }, SOURCE) {
        Ok(html) => html,
        Err(err) => return err.into_response(),
    };

    let mut stream = datastar_replace(FEATURED_IMAGE, html);
    if let Some(toast) = toast {
        if let Err(err) = push_toasts(&mut stream, &[toast]) {
            return err.into_response();
        }
    }
    stream.into_response()
}
