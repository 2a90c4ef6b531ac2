use serde::Deserialize;

use crate::application::admin::editor::{Draft, EditorField, parse_flag};

/// The post form as browsers send it; an unchecked checkbox is simply absent.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct EditorForm {
    pub(super) title: String,
    pub(super) slug: String,
    pub(super) excerpt: String,
    pub(super) content: String,
    pub(super) image_url: String,
    pub(super) is_published: Option<String>,
}

impl EditorForm {
    pub(super) fn into_draft(self) -> Draft {
        Draft {
            title: self.title,
            slug: self.slug,
            excerpt: self.excerpt,
            content: self.content,
            image_url: self.image_url,
            is_published: self.is_published.as_deref().is_some_and(parse_flag),
        }
    }

    /// The form value belonging to `field`.
    pub(super) fn value_of(&self, field: EditorField) -> &str {
        match field {
            EditorField::Title => &self.title,
            EditorField::Slug => &self.slug,
            EditorField::Excerpt => &self.excerpt,
            EditorField::Content => &self.content,
            EditorField::ImageUrl => &self.image_url,
            EditorField::IsPublished => self.is_published.as_deref().unwrap_or("false"),
        }
    }
}
