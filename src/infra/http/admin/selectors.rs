//! Shared CSS selectors used by admin Datastar responses.

pub const EDITOR: &str = "[data-role=\"editor\"]";
pub const TOAST_STACK: &str = "[data-admin-toast=\"stack\"]";

pub const POSTS_PANEL: &str = "[data-admin-panel=\"posts\"]";
pub const COMMENTS_PANEL: &str = "[data-admin-panel=\"comments\"]";
pub const CATEGORIES_PANEL: &str = "[data-admin-panel=\"categories\"]";
pub const TAGS_PANEL: &str = "[data-admin-panel=\"tags\"]";
pub const SUBSCRIBERS_PANEL: &str = "[data-admin-panel=\"subscribers\"]";

pub const POST_PREVIEW: &str = "[data-role=\"post-preview\"]";
pub const SLUG_HINT: &str = "[data-role=\"slug-hint\"]";
pub const TAG_PICKER: &str = "[data-role=\"tag-picker\"]";
pub const FEATURED_IMAGE: &str = "[data-role=\"featured-image\"]";
pub const AUTOSAVE_STATUS: &str = "[data-role=\"autosave-status\"]";
