use tracing::info;
use uuid::Uuid;

use crate::application::query::{Mutation, QueryKey};
use crate::application::session::Session;
use crate::domain::entities::{PostPatch, PostRecord};

use super::service::AdminPostService;
use super::types::AdminPostError;

impl AdminPostService {
    /// Flip `is_published` of exactly this post and nothing else.
    pub async fn toggle_publish(
        &self,
        session: &Session,
        id: Uuid,
    ) -> Result<Mutation<PostRecord>, AdminPostError> {
        let current = self
            .find(session, id)
            .await?
            .ok_or(AdminPostError::NotFound)?;

        let patch = PostPatch::publish_state(!current.is_published);
        let updated = self.store.update(&session.token, id, &patch).await?;

        let invalidated = affected_keys(&updated);
        self.cache.invalidate(&invalidated);

        let message = if updated.is_published {
            "Post published"
        } else {
            "Post unpublished"
        };
        info!(
            target: "blogcraft::admin::posts",
            post_id = %id,
            is_published = updated.is_published,
            "post publish state toggled"
        );
        Ok(Mutation::new(updated, message, invalidated))
    }

    /// Irreversibly delete the post.
    pub async fn delete(
        &self,
        session: &Session,
        id: Uuid,
    ) -> Result<Mutation<PostRecord>, AdminPostError> {
        let existing = self
            .find(session, id)
            .await?
            .ok_or(AdminPostError::NotFound)?;

        self.store.delete(&session.token, id).await?;

        let invalidated = affected_keys(&existing);
        self.cache.invalidate(&invalidated);

        info!(
            target: "blogcraft::admin::posts",
            post_id = %id,
            slug = %existing.slug,
            "post deleted"
        );
        Ok(Mutation::new(
            existing,
            "Post deleted successfully",
            invalidated,
        ))
    }
}

/// The admin table plus every public view that could show `post`.
fn affected_keys(post: &PostRecord) -> Vec<QueryKey> {
    let mut keys = vec![QueryKey::AdminPosts, QueryKey::PublishedPosts];
    keys.extend(QueryKey::for_post(post.id, &post.slug));
    keys
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use crate::application::query::QueryCache;
    use crate::application::session::{AccessToken, SessionUser};
    use crate::infra::store::MemoryPostStore;

    use super::*;

    fn session() -> Session {
        Session {
            user: SessionUser {
                id: Uuid::new_v4(),
                email: "admin@example.com".into(),
            },
            token: AccessToken::new("admin-token"),
            is_admin: true,
        }
    }

    fn service(store: Arc<MemoryPostStore>) -> AdminPostService {
        AdminPostService::new(
            store,
            Arc::new(QueryCache::new(true, Duration::from_secs(60))),
        )
    }

    #[tokio::test]
    async fn toggle_flips_only_the_target_post() {
        let store = Arc::new(MemoryPostStore::new());
        let target = store.seed("Target", "target", "Body", false);
        let other = store.seed("Other", "other", "Body", false);
        let service = service(Arc::clone(&store));

        let mutation = service
            .toggle_publish(&session(), target.id)
            .await
            .expect("toggled");

        assert_eq!(mutation.message, "Post published");
        let rows = store.snapshot();
        let find = |id| rows.iter().find(|row| row.id == id).expect("row");
        assert!(find(target.id).is_published);
        assert!(!find(other.id).is_published);
        assert_eq!(find(target.id).title, "Target");

        let mutation = service
            .toggle_publish(&session(), target.id)
            .await
            .expect("toggled back");
        assert_eq!(mutation.message, "Post unpublished");
        assert!(!mutation.value.is_published);
    }

    #[tokio::test]
    async fn toggle_invalidates_admin_and_public_keys() {
        let store = Arc::new(MemoryPostStore::new());
        let post = store.seed("Target", "target", "Body", true);
        let service = service(Arc::clone(&store));

        let mutation = service
            .toggle_publish(&session(), post.id)
            .await
            .expect("toggled");

        assert_eq!(mutation.invalidated.len(), 4);
        assert!(mutation.invalidated.contains(&QueryKey::AdminPosts));
        assert!(mutation.invalidated.contains(&QueryKey::PublishedPosts));
        assert!(
            mutation
                .invalidated
                .contains(&QueryKey::PostBySlug("target".into()))
        );
    }

    #[tokio::test]
    async fn deleted_post_disappears_from_the_admin_list() {
        let store = Arc::new(MemoryPostStore::new());
        let doomed = store.seed("Doomed", "doomed", "Body", true);
        store.seed("Kept", "kept", "Body", true);
        let service = service(Arc::clone(&store));
        let session = session();

        let before = service.list(&session).await;
        assert_eq!(before.ready().map(Vec::len), Some(2));

        let mutation = service.delete(&session, doomed.id).await.expect("deleted");
        assert_eq!(mutation.message, "Post deleted successfully");

        let after = service.list(&session).await;
        let titles: Vec<_> = after
            .ready()
            .expect("ready")
            .iter()
            .map(|post| post.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Kept"]);
    }

    #[tokio::test]
    async fn acting_on_unknown_post_is_not_found() {
        let service = service(Arc::new(MemoryPostStore::new()));

        let err = service
            .delete(&session(), Uuid::new_v4())
            .await
            .expect_err("missing");
        assert!(matches!(err, AdminPostError::NotFound));
        assert_eq!(
            format!("Failed to delete post: {err}"),
            "Failed to delete post: post not found"
        );
    }
}
