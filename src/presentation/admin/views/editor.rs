use askama::Template;

use super::AdminLayout;

#[derive(Clone)]
pub struct AdminPostEditorView {
    pub heading: String,
    pub post_id: Option<String>,
    pub title: String,
    pub slug: String,
    /// Slug saved upstream; present only when editing.
    pub stored_slug: Option<String>,
    pub slug_hint: AdminSlugHintView,
    pub excerpt: String,
    pub body_markdown: String,
    pub status_key: String,
    pub status_label: String,
    pub category_options: Vec<AdminCategoryOptionView>,
    pub tag_picker: AdminTagPickerView,
    pub featured: AdminFeaturedImageView,
    pub preview: AdminPreviewView,
    pub autosave: Option<AdminAutosaveStatusView>,
    pub form_action: String,
    pub preview_action: String,
    pub slug_action: String,
    pub autosave_action: Option<String>,
    pub public_href: Option<String>,
    pub error: Option<String>,
}

impl AdminPostEditorView {
    pub fn is_new(&self) -> bool {
        self.post_id.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminCategoryOptionView {
    pub name: String,
    pub is_selected: bool,
}

/// Shown under the slug field; `slug` is what a blank field resolves to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminSlugHintView {
    pub slug: String,
    pub is_auto: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminTagPickerView {
    pub toggle_action: String,
    pub field_value: String,
    pub query: String,
    pub options: Vec<AdminTagOptionView>,
    pub selected: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminTagOptionView {
    pub name: String,
    pub is_selected: bool,
    pub toggle_href: String,
}

#[derive(Clone, Debug, Default)]
pub struct AdminPreviewView {
    pub html: String,
    pub word_count: usize,
    pub reading_time: String,
}

impl AdminPreviewView {
    pub fn has_content(&self) -> bool {
        !self.html.trim().is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminAutosaveStatusView {
    pub tone: &'static str,
    pub message: String,
}

impl AdminAutosaveStatusView {
    pub fn idle() -> Self {
        Self {
            tone: "idle",
            message: "Changes are saved automatically".to_string(),
        }
    }

    pub fn saved(clock: &str) -> Self {
        Self {
            tone: "saved",
            message: format!("Saved {clock}"),
        }
    }

    pub fn failed(reason: &str) -> Self {
        Self {
            tone: "error",
            message: format!("Autosave failed: {reason}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminFeaturedImageView {
    pub value: String,
    pub preview_url: Option<String>,
    pub upload_action: String,
    pub error: Option<String>,
}

#[derive(Template)]
#[template(path = "admin/post_edit.html")]
pub struct AdminPostEditTemplate {
    pub view: AdminLayout<AdminPostEditorView>,
}

#[derive(Template)]
#[template(path = "admin/post_editor_panel.html")]
pub struct AdminPostEditPanelTemplate {
    pub content: AdminPostEditorView,
}

#[derive(Template)]
#[template(path = "admin/post_preview.html")]
pub struct AdminPostPreviewTemplate {
    pub preview: AdminPreviewView,
}

#[derive(Template)]
#[template(path = "admin/post_slug_hint.html")]
pub struct AdminSlugHintTemplate {
    pub hint: AdminSlugHintView,
}

#[derive(Template)]
#[template(path = "admin/post_tag_picker.html")]
pub struct AdminTagPickerTemplate {
    pub picker: AdminTagPickerView,
}

#[derive(Template)]
#[template(path = "admin/post_featured_image.html")]
pub struct AdminFeaturedImageTemplate {
    pub image: AdminFeaturedImageView,
}

#[derive(Template)]
#[template(path = "admin/autosave_status.html")]
pub struct AdminAutosaveStatusTemplate {
    pub status: AdminAutosaveStatusView,
}
