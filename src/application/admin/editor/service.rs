use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::application::query::{Mutation, QueryCache, QueryKey};
use crate::application::repos::{PostFilter, PostOrder, PostStore, RepoError};
use crate::application::session::Session;
use crate::domain::entities::{PostPatch, PostRecord};

use super::controller::{PostEditor, SubmitPlan};
use super::sessions::{EditorSessions, EditorSlot};
use super::types::SubmitError;

/// Opens editors and turns their drafts into store writes.
#[derive(Clone)]
pub struct EditorService {
    store: Arc<dyn PostStore>,
    cache: Arc<QueryCache>,
    sessions: Arc<EditorSessions>,
}

impl EditorService {
    pub fn new(
        store: Arc<dyn PostStore>,
        cache: Arc<QueryCache>,
        sessions: Arc<EditorSessions>,
    ) -> Self {
        Self {
            store,
            cache,
            sessions,
        }
    }

    pub fn sessions(&self) -> &EditorSessions {
        &self.sessions
    }

    pub fn open_create(&self, session: &Session) -> Arc<EditorSlot> {
        self.sessions.open(session.user.id, PostEditor::create())
    }

    /// Load `id` and open an editor on it. `None` when the post does not exist.
    pub async fn open_edit(
        &self,
        session: &Session,
        id: Uuid,
    ) -> Result<Option<(Arc<EditorSlot>, PostRecord)>, RepoError> {
        let filter = PostFilter::by_id(id);
        let posts = self
            .cache
            .fetch(QueryKey::PostForEdit(id), || {
                self.store
                    .select(Some(&session.token), &filter, PostOrder::Unspecified)
            })
            .await?;

        let Some(record) = posts.first().cloned() else {
            return Ok(None);
        };
        let slot = self
            .sessions
            .open(session.user.id, PostEditor::edit(&record));
        Ok(Some((slot, record)))
    }

    /// Submit the editor's draft: one insert or one update, then invalidation.
    ///
    /// On failure the draft is left exactly as it was.
    pub async fn submit(
        &self,
        slot: &Arc<EditorSlot>,
        session: &Session,
    ) -> Result<Mutation<PostRecord>, SubmitError> {
        let plan = slot.lock().await.begin_submit(Some(session.user.id))?;
        let flight = InFlight::new(Arc::clone(slot));

        let result = match &plan {
            SubmitPlan::Insert(write) => self.store.insert(&session.token, write).await,
            SubmitPlan::Update { id, write, .. } => {
                self.store
                    .update(&session.token, *id, &PostPatch::from(write.clone()))
                    .await
            }
        };
        flight.finish().await;

        let record = result.map_err(|err| {
            warn!(
                target: "blogcraft::editor",
                session = %slot.id(),
                error = %err,
                "post save failed"
            );
            SubmitError::from_repo(err)
        })?;

        let mut invalidated = vec![QueryKey::AdminPosts, QueryKey::PublishedPosts];
        invalidated.extend(QueryKey::for_post(record.id, &record.slug));
        let message = match &plan {
            SubmitPlan::Insert(_) => "Post created successfully",
            SubmitPlan::Update { previous_slug, .. } => {
                if *previous_slug != record.slug {
                    invalidated.push(QueryKey::PostBySlug(previous_slug.clone()));
                }
                "Post updated successfully"
            }
        };
        self.cache.invalidate(&invalidated);

        info!(
            target: "blogcraft::editor",
            post_id = %record.id,
            slug = %record.slug,
            message,
            "post saved"
        );
        Ok(Mutation::new(record, message, invalidated))
    }
}

/// Clears the editor's in-flight flag even if the submitting request is dropped.
struct InFlight {
    slot: Option<Arc<EditorSlot>>,
}

impl InFlight {
    fn new(slot: Arc<EditorSlot>) -> Self {
        Self { slot: Some(slot) }
    }

    async fn finish(mut self) {
        if let Some(slot) = self.slot.take() {
            slot.lock().await.finish_submit();
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let Some(slot) = self.slot.take() else {
            return;
        };
        if let Some(mut editor) = slot.try_lock() {
            editor.finish_submit();
            return;
        }
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                slot.lock().await.finish_submit();
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::application::admin::editor::types::{EditorError, SLUG_TAKEN_MESSAGE};
    use crate::application::session::{AccessToken, SessionUser};
    use crate::domain::posts::DraftViolation;
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

    fn service(store: Arc<MemoryPostStore>) -> EditorService {
        EditorService::new(
            store,
            Arc::new(QueryCache::new(true, Duration::from_secs(60))),
            Arc::new(EditorSessions::new(Duration::from_secs(60))),
        )
    }

    fn store() -> Arc<MemoryPostStore> {
        Arc::new(MemoryPostStore::new())
    }

    #[tokio::test]
    async fn create_submit_inserts_and_invalidates_lists() {
        let store = store();
        let service = service(Arc::clone(&store));
        let session = session();
        let slot = service.open_create(&session);
        {
            let mut editor = slot.lock().await;
            editor.set_title("Fresh Post").expect("title");
            editor.set_content("Line one\nLine two").expect("content");
        }

        let mutation = service.submit(&slot, &session).await.expect("saved");

        assert_eq!(mutation.message, "Post created successfully");
        assert_eq!(mutation.value.slug, "fresh-post");
        assert_eq!(mutation.value.author_id, Some(session.user.id));
        assert!(mutation.invalidated.contains(&QueryKey::AdminPosts));
        assert!(mutation.invalidated.contains(&QueryKey::PublishedPosts));
        assert!(!slot.lock().await.is_submitting());
        assert_eq!(store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_the_store() {
        let store = store();
        let service = service(Arc::clone(&store));
        let session = session();
        let slot = service.open_create(&session);
        slot.lock().await.set_title("Only a title").expect("title");

        let err = service.submit(&slot, &session).await.expect_err("invalid");

        assert!(matches!(
            err,
            SubmitError::Editor(EditorError::Invalid(DraftViolation::MissingContent))
        ));
        assert!(store.snapshot().is_empty());
        assert!(!slot.lock().await.is_submitting());
    }

    #[tokio::test]
    async fn duplicate_slug_preserves_the_draft() {
        let store = store();
        let service = service(Arc::clone(&store));
        let session = session();
        store.seed("Same Title", "same-title", "Body", false);

        let slot = service.open_create(&session);
        {
            let mut editor = slot.lock().await;
            editor.set_title("Same Title").expect("title");
            editor.set_content("Other body").expect("content");
        }
        let err = service.submit(&slot, &session).await.expect_err("conflict");

        assert_eq!(err.to_string(), SLUG_TAKEN_MESSAGE);
        let editor = slot.lock().await;
        assert_eq!(editor.draft().content, "Other body");
        assert!(!editor.is_submitting());
        assert_eq!(store.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn edit_submit_updates_the_target_post() {
        let store = store();
        let service = service(Arc::clone(&store));
        let session = session();
        let seeded = store.seed("Original", "original", "Body", true);

        let (slot, record) = service
            .open_edit(&session, seeded.id)
            .await
            .expect("load")
            .expect("exists");
        assert_eq!(record.slug, "original");
        {
            let mut editor = slot.lock().await;
            editor.set_title("Renamed").expect("title");
            editor.set_slug("renamed").expect("slug");
        }

        let mutation = service.submit(&slot, &session).await.expect("saved");

        assert_eq!(mutation.message, "Post updated successfully");
        assert_eq!(mutation.value.id, seeded.id);
        assert!(
            mutation
                .invalidated
                .contains(&QueryKey::PostBySlug("original".into()))
        );
        assert_eq!(store.snapshot()[0].title, "Renamed");
    }

    #[tokio::test]
    async fn open_edit_of_unknown_post_is_none() {
        let service = service(store());
        let loaded = service
            .open_edit(&session(), Uuid::new_v4())
            .await
            .expect("load");
        assert!(loaded.is_none());
    }
}
