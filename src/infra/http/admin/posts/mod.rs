mod errors;
mod forms;
mod handlers;
mod panel;
mod sections;
mod status;

pub(super) use handlers::{
    admin_post_autosave, admin_post_create, admin_post_delete, admin_post_edit,
    admin_post_featured_upload, admin_post_new, admin_post_preview, admin_post_publish,
    admin_post_slug_hint, admin_post_tags, admin_post_unpublish, admin_post_update, admin_posts,
    admin_posts_panel,
};
