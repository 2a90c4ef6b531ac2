use std::str::FromStr;

use thiserror::Error;
use uuid::Uuid;

use crate::application::repos::RepoError;
use crate::domain::posts::DraftViolation;

pub const SLUG_TAKEN_MESSAGE: &str =
    "A post with this slug already exists. Please use a different slug.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit { id: Uuid, original_slug: String },
}

impl EditorMode {
    pub fn target_id(&self) -> Option<Uuid> {
        match self {
            Self::Create => None,
            Self::Edit { id, .. } => Some(*id),
        }
    }

    pub fn is_edit(&self) -> bool {
        matches!(self, Self::Edit { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorField {
    Title,
    Slug,
    Excerpt,
    Content,
    ImageUrl,
    IsPublished,
}

impl EditorField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Slug => "slug",
            Self::Excerpt => "excerpt",
            Self::Content => "content",
            Self::ImageUrl => "image_url",
            Self::IsPublished => "is_published",
        }
    }
}

impl FromStr for EditorField {
    type Err = UnknownField;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "title" => Ok(Self::Title),
            "slug" => Ok(Self::Slug),
            "excerpt" => Ok(Self::Excerpt),
            "content" => Ok(Self::Content),
            "image_url" => Ok(Self::ImageUrl),
            "is_published" => Ok(Self::IsPublished),
            other => Err(UnknownField(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown editor field `{0}`")]
pub struct UnknownField(pub String);

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum EditorError {
    #[error("A save is already in progress")]
    Busy,
    #[error(transparent)]
    Invalid(#[from] DraftViolation),
}

/// Why an editor submit did not produce a saved post.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error("{}", SLUG_TAKEN_MESSAGE)]
    SlugTaken(#[source] RepoError),
    #[error("Failed to save post: {0}")]
    Store(#[source] RepoError),
}

impl SubmitError {
    pub fn from_repo(err: RepoError) -> Self {
        if err.is_slug_conflict() || err.to_string().contains("duplicate key") {
            Self::SlugTaken(err)
        } else {
            Self::Store(err)
        }
    }

    /// Draft field to highlight, if the failure is tied to one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Editor(EditorError::Invalid(violation)) => Some(violation.field()),
            Self::SlugTaken(_) => Some("slug"),
            Self::Editor(EditorError::Busy) | Self::Store(_) => None,
        }
    }
}
