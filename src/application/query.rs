//! Keyed cache of read results and the invalidation contract for mutations.
//!
//! Read paths fetch through [`QueryCache::fetch`]. Every mutation returns a
//! [`Mutation`] naming the keys it invalidated, so callers and tests can see
//! exactly which views will refetch.

use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use dashmap::DashMap;
use metrics::counter;
use tracing::debug;
use uuid::Uuid;

use crate::application::repos::RepoError;
use crate::domain::entities::PostRecord;

pub(crate) const METRIC_QUERY_HIT: &str = "blogcraft_query_cache_hit_total";
pub(crate) const METRIC_QUERY_MISS: &str = "blogcraft_query_cache_miss_total";
pub(crate) const METRIC_QUERY_INVALIDATE: &str = "blogcraft_query_cache_invalidate_total";

/// Identifies one cached read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// Public feed: published posts, newest first.
    PublishedPosts,
    /// Admin table: every post, newest first.
    AdminPosts,
    /// Public detail lookup by slug.
    PostBySlug(String),
    /// Editor load by id.
    PostForEdit(Uuid),
}

impl QueryKey {
    /// Keys that show `post` to readers or editors.
    pub fn for_post(id: Uuid, slug: &str) -> [QueryKey; 2] {
        [QueryKey::PostBySlug(slug.to_string()), QueryKey::PostForEdit(id)]
    }
}

/// Outcome of a successful write.
#[derive(Debug, Clone)]
pub struct Mutation<T> {
    pub value: T,
    pub message: String,
    pub invalidated: Vec<QueryKey>,
}

impl<T> Mutation<T> {
    pub fn new(value: T, message: impl Into<String>, invalidated: Vec<QueryKey>) -> Self {
        Self {
            value,
            message: message.into(),
            invalidated,
        }
    }
}

#[derive(Debug, Clone)]
struct CachedQuery {
    fetched_at: Instant,
    posts: Arc<Vec<PostRecord>>,
}

#[derive(Debug)]
pub struct QueryCache {
    enabled: bool,
    ttl: Duration,
    entries: DashMap<QueryKey, CachedQuery>,
    /// Bumped by every invalidation; a load that straddles a bump is not stored.
    generation: AtomicU64,
}

impl QueryCache {
    pub fn new(enabled: bool, ttl: Duration) -> Self {
        Self {
            enabled,
            ttl,
            entries: DashMap::new(),
            generation: AtomicU64::new(0),
        }
    }

    pub fn disabled() -> Self {
        Self::new(false, Duration::ZERO)
    }

    /// Return the fresh entry for `key`, or run `load` and remember its result.
    ///
    /// Failures are returned as-is and never stored. A result whose load
    /// overlapped an [`invalidate`](Self::invalidate) call is returned to the
    /// caller but not stored.
    pub async fn fetch<F, Fut>(
        &self,
        key: QueryKey,
        load: F,
    ) -> Result<Arc<Vec<PostRecord>>, RepoError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<PostRecord>, RepoError>>,
    {
        if !self.enabled {
            return load().await.map(Arc::new);
        }

        if let Some(posts) = self.fresh(&key) {
            counter!(METRIC_QUERY_HIT).increment(1);
            return Ok(posts);
        }

        counter!(METRIC_QUERY_MISS).increment(1);
        let started = self.generation.load(Ordering::Acquire);
        let posts = Arc::new(load().await?);
        if self.generation.load(Ordering::Acquire) == started {
            self.entries.insert(
                key,
                CachedQuery {
                    fetched_at: Instant::now(),
                    posts: Arc::clone(&posts),
                },
            );
        } else {
            debug!(target: "blogcraft::query", ?key, "discarded load that raced an invalidation");
        }
        Ok(posts)
    }

    pub fn invalidate(&self, keys: &[QueryKey]) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        for key in keys {
            if self.entries.remove(key).is_some() {
                counter!(METRIC_QUERY_INVALIDATE).increment(1);
                debug!(target: "blogcraft::query", ?key, "invalidated cached query");
            }
        }
    }

    /// True when a fresh entry exists for `key`.
    pub fn is_cached(&self, key: &QueryKey) -> bool {
        self.fresh(key).is_some()
    }

    fn fresh(&self, key: &QueryKey) -> Option<Arc<Vec<PostRecord>>> {
        let entry = self.entries.get(key)?;
        if entry.fetched_at.elapsed() < self.ttl {
            Some(Arc::clone(&entry.posts))
        } else {
            drop(entry);
            self.entries.remove(key);
            None
        }
    }
}
