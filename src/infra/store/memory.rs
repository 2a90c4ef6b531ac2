//! In-process post store for local development and tests.
//!
//! Mirrors the rules the hosted table enforces: anonymous readers only see
//! published rows, writes need an access token, and slugs are unique.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use time::OffsetDateTime;
use tracing::warn;
use uuid::Uuid;

use crate::application::repos::{
    PostFilter, PostOrder, PostStore, RepoError, SLUG_CONSTRAINT,
};
use crate::application::session::AccessToken;
use crate::domain::entities::{PostPatch, PostRecord, PostWrite};

#[derive(Debug, Default)]
pub struct MemoryPostStore {
    rows: RwLock<Vec<PostRecord>>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_posts(posts: Vec<PostRecord>) -> Self {
        Self {
            rows: RwLock::new(posts),
        }
    }

    /// Insert a row directly, bypassing authentication and uniqueness checks.
    pub fn seed(&self, title: &str, slug: &str, content: &str, is_published: bool) -> PostRecord {
        let record = PostRecord {
            id: Uuid::new_v4(),
            title: title.to_string(),
            slug: slug.to_string(),
            excerpt: None,
            content: content.to_string(),
            image_url: None,
            is_published,
            author_id: None,
            created_at: OffsetDateTime::now_utc(),
        };
        write_rows(&self.rows, "seed").push(record.clone());
        record
    }

    /// Copy of every row in insertion order.
    pub fn snapshot(&self) -> Vec<PostRecord> {
        read_rows(&self.rows, "snapshot").clone()
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn select(
        &self,
        auth: Option<&AccessToken>,
        filter: &PostFilter,
        order: PostOrder,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let anonymous = auth.is_none_or(|token| token.as_str().is_empty());
        let rows = read_rows(&self.rows, "select");

        // Newer inserts first so equal timestamps still sort newest-first.
        let mut selected: Vec<PostRecord> = rows
            .iter()
            .rev()
            .filter(|row| !anonymous || row.is_published)
            .filter(|row| filter.matches(row))
            .cloned()
            .collect();

        match order {
            PostOrder::NewestFirst => {
                selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            }
            PostOrder::Unspecified => selected.reverse(),
        }
        Ok(selected)
    }

    async fn insert(
        &self,
        auth: &AccessToken,
        record: &PostWrite,
    ) -> Result<PostRecord, RepoError> {
        require_token(auth)?;
        let mut rows = write_rows(&self.rows, "insert");

        if rows.iter().any(|row| row.slug == record.slug) {
            return Err(duplicate_slug());
        }

        let created = PostRecord {
            id: Uuid::new_v4(),
            title: record.title.clone(),
            slug: record.slug.clone(),
            excerpt: record.excerpt.clone(),
            content: record.content.clone(),
            image_url: record.image_url.clone(),
            is_published: record.is_published,
            author_id: record.author_id,
            created_at: OffsetDateTime::now_utc(),
        };
        rows.push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        auth: &AccessToken,
        id: Uuid,
        patch: &PostPatch,
    ) -> Result<PostRecord, RepoError> {
        require_token(auth)?;
        let mut rows = write_rows(&self.rows, "update");

        if let Some(slug) = &patch.slug
            && rows.iter().any(|row| row.id != id && row.slug == *slug)
        {
            return Err(duplicate_slug());
        }

        let row = rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(RepoError::NotFound)?;
        patch.apply_to(row);
        Ok(row.clone())
    }

    async fn delete(&self, auth: &AccessToken, id: Uuid) -> Result<(), RepoError> {
        require_token(auth)?;
        write_rows(&self.rows, "delete").retain(|row| row.id != id);
        Ok(())
    }
}

fn require_token(auth: &AccessToken) -> Result<(), RepoError> {
    if auth.as_str().is_empty() {
        Err(RepoError::unauthorized("missing access token"))
    } else {
        Ok(())
    }
}

fn duplicate_slug() -> RepoError {
    RepoError::Duplicate {
        constraint: SLUG_CONSTRAINT.to_string(),
    }
}

fn read_rows<'a>(
    lock: &'a RwLock<Vec<PostRecord>>,
    op: &'static str,
) -> RwLockReadGuard<'a, Vec<PostRecord>> {
    lock.read().unwrap_or_else(|poisoned| {
        warn!(
            target: "blogcraft::store::memory",
            op,
            lock_kind = "rwlock.read",
            result = "poisoned_recovered",
            "Recovered from poisoned store lock"
        );
        poisoned.into_inner()
    })
}

fn write_rows<'a>(
    lock: &'a RwLock<Vec<PostRecord>>,
    op: &'static str,
) -> RwLockWriteGuard<'a, Vec<PostRecord>> {
    lock.write().unwrap_or_else(|poisoned| {
        warn!(
            target: "blogcraft::store::memory",
            op,
            lock_kind = "rwlock.write",
            result = "poisoned_recovered",
            "Recovered from poisoned store lock"
        );
        poisoned.into_inner()
    })
}
