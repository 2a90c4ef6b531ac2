use askama::Template;
use uuid::Uuid;

use crate::application::admin::editor::{EditorField, PostEditor};

use super::AdminLayout;

/// Everything the post form needs, captured from one editor under its lock.
#[derive(Clone)]
pub struct AdminEditorView {
    pub heading: &'static str,
    pub submit_label: &'static str,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub image_url: String,
    pub is_published: bool,
    pub slug_follows_title: bool,
    pub is_submitting: bool,
    pub error: String,
    pub error_field: &'static str,
    pub submit_action: String,
    pub cancel_action: String,
    pub field_action_prefix: String,
}

impl AdminEditorView {
    pub fn new(session_id: Uuid, editor: &PostEditor) -> Self {
        let draft = editor.draft();
        let is_edit = editor.mode().is_edit();
        let base = format!("/admin/editor/{session_id}");
        Self {
            heading: if is_edit { "Edit Post" } else { "Create New Post" },
            submit_label: if is_edit { "Update Post" } else { "Create Post" },
            title: draft.title.clone(),
            slug: draft.slug.clone(),
            excerpt: draft.excerpt.clone(),
            content: draft.content.clone(),
            image_url: draft.image_url.clone(),
            is_published: draft.is_published,
            slug_follows_title: editor.slug_follows_title(),
            is_submitting: editor.is_submitting(),
            error: String::new(),
            error_field: "",
            submit_action: format!("{base}/submit"),
            cancel_action: format!("{base}/cancel"),
            field_action_prefix: format!("{base}/fields"),
        }
    }

    pub fn with_error(self, message: impl Into<String>, field: Option<&'static str>) -> Self {
        Self {
            error: message.into(),
            error_field: field.unwrap_or(""),
            ..self
        }
    }

    pub fn field_action(&self, field: &str) -> String {
        format!("{}/{}", self.field_action_prefix, field)
    }

    pub fn has_error_on(&self, field: &str) -> bool {
        self.error_field == field
    }

    pub fn title_field(&self) -> &'static str {
        EditorField::Title.as_str()
    }

    pub fn slug_field(&self) -> &'static str {
        EditorField::Slug.as_str()
    }
}

#[derive(Template)]
#[template(path = "admin/editor.html")]
pub struct AdminEditorTemplate {
    pub view: AdminLayout<AdminEditorView>,
}

#[derive(Template)]
#[template(path = "admin/editor_panel.html")]
pub struct AdminEditorPanelTemplate {
    pub content: AdminEditorView,
}

#[derive(Template)]
#[template(path = "admin/slug_field.html")]
pub struct AdminSlugFieldTemplate {
    pub content: AdminEditorView,
}
