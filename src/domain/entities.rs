//! Domain entities mirrored from the hosted `posts` table.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A post row as returned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub author_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Full snapshot written on insert and on editor update.
///
/// `excerpt` and `image_url` serialize as `null` when absent so an update
/// clears previously stored values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostWrite {
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub image_url: Option<String>,
    pub is_published: bool,
    pub author_id: Option<Uuid>,
}

/// Partial update; absent fields are omitted from the wire body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<Option<Uuid>>,
}

impl PostPatch {
    /// Patch that only sets the publish flag.
    pub fn publish_state(is_published: bool) -> Self {
        Self {
            is_published: Some(is_published),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Apply the patch onto an in-memory record.
    pub fn apply_to(&self, record: &mut PostRecord) {
        if let Some(title) = &self.title {
            record.title = title.clone();
        }
        if let Some(slug) = &self.slug {
            record.slug = slug.clone();
        }
        if let Some(excerpt) = &self.excerpt {
            record.excerpt = excerpt.clone();
        }
        if let Some(content) = &self.content {
            record.content = content.clone();
        }
        if let Some(image_url) = &self.image_url {
            record.image_url = image_url.clone();
        }
        if let Some(is_published) = self.is_published {
            record.is_published = is_published;
        }
        if let Some(author_id) = self.author_id {
            record.author_id = author_id;
        }
    }
}

impl From<PostWrite> for PostPatch {
    fn from(write: PostWrite) -> Self {
        Self {
            title: Some(write.title),
            slug: Some(write.slug),
            excerpt: Some(write.excerpt),
            content: Some(write.content),
            image_url: Some(write.image_url),
            is_published: Some(write.is_published),
            author_id: Some(write.author_id),
        }
    }
}
