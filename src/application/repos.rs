//! Store port describing the hosted `posts` table.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::application::session::AccessToken;
use crate::domain::entities::{PostPatch, PostRecord, PostWrite};

/// Unique constraint guarding `posts.slug`.
pub const SLUG_CONSTRAINT: &str = "posts_slug_key";

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("{0}")]
    Persistence(String),
    #[error("duplicate key value violates unique constraint \"{constraint}\"")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("not authorized: {message}")]
    Unauthorized { message: String },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("store request timed out")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// True when the store rejected a write because the slug is taken.
    pub fn is_slug_conflict(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}

/// Row filter for `select`. Every set field must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub published_only: bool,
    pub slug: Option<String>,
    pub id: Option<Uuid>,
}

impl PostFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn published() -> Self {
        Self {
            published_only: true,
            ..Self::default()
        }
    }

    pub fn published_slug(slug: impl Into<String>) -> Self {
        Self {
            published_only: true,
            slug: Some(slug.into()),
            id: None,
        }
    }

    pub fn by_id(id: Uuid) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn matches(&self, record: &PostRecord) -> bool {
        if self.published_only && !record.is_published {
            return false;
        }
        if let Some(slug) = &self.slug
            && record.slug != *slug
        {
            return false;
        }
        if let Some(id) = self.id
            && record.id != id
        {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostOrder {
    /// Whatever order the store returns.
    #[default]
    Unspecified,
    /// `created_at` descending.
    NewestFirst,
}

/// Authenticated access to the hosted `posts` table.
///
/// Reads may be anonymous; the store decides which rows an anonymous caller
/// sees. Writes always carry the caller's access token.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn select(
        &self,
        auth: Option<&AccessToken>,
        filter: &PostFilter,
        order: PostOrder,
    ) -> Result<Vec<PostRecord>, RepoError>;

    async fn insert(&self, auth: &AccessToken, record: &PostWrite)
    -> Result<PostRecord, RepoError>;

    /// Update the row with `id`; `NotFound` when no row matched.
    async fn update(
        &self,
        auth: &AccessToken,
        id: Uuid,
        patch: &PostPatch,
    ) -> Result<PostRecord, RepoError>;

    async fn delete(&self, auth: &AccessToken, id: Uuid) -> Result<(), RepoError>;
}
