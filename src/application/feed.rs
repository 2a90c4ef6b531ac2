use std::sync::Arc;

use tracing::warn;

use crate::application::query::{QueryCache, QueryKey};
use crate::application::repos::{PostFilter, PostOrder, PostStore};
use crate::application::view_state::ViewState;
use crate::domain::entities::PostRecord;

pub const LOAD_POSTS_ERROR: &str = "Failed to load posts. Please try again later.";

/// Public read paths. Anonymous; only published posts are ever returned.
#[derive(Clone)]
pub struct FeedService {
    store: Arc<dyn PostStore>,
    cache: Arc<QueryCache>,
}

impl FeedService {
    pub fn new(store: Arc<dyn PostStore>, cache: Arc<QueryCache>) -> Self {
        Self { store, cache }
    }

    /// Published posts, newest first.
    pub async fn published_posts(&self) -> ViewState<Vec<PostRecord>> {
        let filter = PostFilter::published();
        let result = self
            .cache
            .fetch(QueryKey::PublishedPosts, || {
                self.store.select(None, &filter, PostOrder::NewestFirst)
            })
            .await;

        // The store filters too; this guards against a misconfigured backend.
        let result = result.map(|posts| {
            posts
                .iter()
                .filter(|post| post.is_published)
                .cloned()
                .collect::<Vec<_>>()
        });
        ViewState::from_list(result, LOAD_POSTS_ERROR)
    }

    /// The published post with `slug`.
    ///
    /// Unpublished posts, missing posts and store failures all yield
    /// `Empty`/`Error`, which the detail page renders as not found.
    pub async fn post_by_slug(&self, slug: &str) -> ViewState<PostRecord> {
        let filter = PostFilter::published_slug(slug);
        let result = self
            .cache
            .fetch(QueryKey::PostBySlug(slug.to_string()), || {
                self.store.select(None, &filter, PostOrder::Unspecified)
            })
            .await;

        match result {
            Ok(posts) => posts
                .iter()
                .find(|post| post.is_published && post.slug == slug)
                .cloned()
                .map_or(ViewState::Empty, ViewState::Ready),
            Err(err) => {
                warn!(
                    target: "blogcraft::feed",
                    slug,
                    error = %err,
                    "post lookup failed"
                );
                ViewState::Error(err.to_string())
            }
        }
    }
}
