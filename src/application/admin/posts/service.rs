use std::sync::Arc;

use uuid::Uuid;

use crate::application::feed::LOAD_POSTS_ERROR;
use crate::application::query::{QueryCache, QueryKey};
use crate::application::repos::{PostFilter, PostOrder, PostStore, RepoError};
use crate::application::session::Session;
use crate::application::view_state::ViewState;
use crate::domain::entities::PostRecord;

/// Dashboard reads and row actions on posts.
#[derive(Clone)]
pub struct AdminPostService {
    pub(crate) store: Arc<dyn PostStore>,
    pub(crate) cache: Arc<QueryCache>,
}

impl AdminPostService {
    pub fn new(store: Arc<dyn PostStore>, cache: Arc<QueryCache>) -> Self {
        Self { store, cache }
    }

    /// Every post regardless of publish state, newest first.
    pub async fn list(&self, session: &Session) -> ViewState<Vec<PostRecord>> {
        let filter = PostFilter::all();
        let result = self
            .cache
            .fetch(QueryKey::AdminPosts, || {
                self.store
                    .select(Some(&session.token), &filter, PostOrder::NewestFirst)
            })
            .await;
        ViewState::from_list(result.map(|posts| posts.to_vec()), LOAD_POSTS_ERROR)
    }

    /// Uncached read of one post, used before acting on it.
    pub async fn find(&self, session: &Session, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        let posts = self
            .store
            .select(
                Some(&session.token),
                &PostFilter::by_id(id),
                PostOrder::Unspecified,
            )
            .await?;
        Ok(posts.into_iter().next())
    }
}
