//! Registry of live editors, keyed by an opaque session id.

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};

use dashmap::DashMap;
use thiserror::Error;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, warn};
use uuid::Uuid;

use super::controller::PostEditor;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionLookupError {
    #[error("editor session not found or expired")]
    NotFound,
    #[error("editor session belongs to another user")]
    Forbidden,
}

/// One editor plus the bookkeeping the registry needs.
#[derive(Debug)]
pub struct EditorSlot {
    id: Uuid,
    owner: Uuid,
    editor: AsyncMutex<PostEditor>,
    last_seen: Mutex<Instant>,
}

impl EditorSlot {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn owner(&self) -> Uuid {
        self.owner
    }

    /// Lock the editor. Never hold the guard across a store call.
    pub async fn lock(&self) -> tokio::sync::MutexGuard<'_, PostEditor> {
        self.editor.lock().await
    }

    pub(super) fn try_lock(&self) -> Option<tokio::sync::MutexGuard<'_, PostEditor>> {
        self.editor.try_lock().ok()
    }

    fn touch(&self) {
        *last_seen(&self.last_seen) = Instant::now();
    }

    fn idle_for(&self) -> Duration {
        last_seen(&self.last_seen).elapsed()
    }
}

#[derive(Debug)]
pub struct EditorSessions {
    slots: DashMap<Uuid, Arc<EditorSlot>>,
    idle_timeout: Duration,
}

impl EditorSessions {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            slots: DashMap::new(),
            idle_timeout,
        }
    }

    /// Register `editor` for `owner` under a fresh session id.
    pub fn open(&self, owner: Uuid, editor: PostEditor) -> Arc<EditorSlot> {
        self.prune_idle();

        let slot = Arc::new(EditorSlot {
            id: Uuid::new_v4(),
            owner,
            editor: AsyncMutex::new(editor),
            last_seen: Mutex::new(Instant::now()),
        });
        self.slots.insert(slot.id, Arc::clone(&slot));
        debug!(
            target: "blogcraft::editor",
            session = %slot.id,
            %owner,
            "editor session opened"
        );
        slot
    }

    pub fn get(&self, id: Uuid, owner: Uuid) -> Result<Arc<EditorSlot>, SessionLookupError> {
        let slot = self
            .slots
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(SessionLookupError::NotFound)?;

        if slot.owner != owner {
            return Err(SessionLookupError::Forbidden);
        }
        if slot.idle_for() >= self.idle_timeout {
            self.slots.remove(&id);
            return Err(SessionLookupError::NotFound);
        }

        slot.touch();
        Ok(slot)
    }

    /// Drop the session. Returns false when it was already gone.
    pub fn discard(&self, id: Uuid, owner: Uuid) -> bool {
        self.slots
            .remove_if(&id, |_, slot| slot.owner == owner)
            .is_some()
    }

    /// Remove sessions idle for longer than the configured timeout.
    pub fn prune_idle(&self) -> usize {
        let before = self.slots.len();
        self.slots
            .retain(|_, slot| slot.idle_for() < self.idle_timeout);
        let pruned = before.saturating_sub(self.slots.len());
        if pruned > 0 {
            debug!(target: "blogcraft::editor", pruned, "pruned idle editor sessions");
        }
        pruned
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

fn last_seen(lock: &Mutex<Instant>) -> MutexGuard<'_, Instant> {
    match lock.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!(
                target: "blogcraft::editor",
                lock_kind = "mutex.lock",
                result = "poisoned_recovered",
                "Recovered from poisoned editor session lock"
            );
            poisoned.into_inner()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sessions_are_bound_to_their_owner() {
        let sessions = EditorSessions::new(Duration::from_secs(60));
        let owner = Uuid::new_v4();
        let slot = sessions.open(owner, PostEditor::create());

        assert!(sessions.get(slot.id(), owner).is_ok());
        assert_eq!(
            sessions.get(slot.id(), Uuid::new_v4()).err(),
            Some(SessionLookupError::Forbidden)
        );
        assert!(!sessions.discard(slot.id(), Uuid::new_v4()));
        assert!(sessions.discard(slot.id(), owner));
        assert_eq!(
            sessions.get(slot.id(), owner).err(),
            Some(SessionLookupError::NotFound)
        );
    }

    #[tokio::test]
    async fn idle_sessions_expire() {
        let sessions = EditorSessions::new(Duration::ZERO);
        let owner = Uuid::new_v4();
        let slot = sessions.open(owner, PostEditor::create());

        assert_eq!(
            sessions.get(slot.id(), owner).err(),
            Some(SessionLookupError::NotFound)
        );
        assert!(sessions.is_empty());
    }

    #[tokio::test]
    async fn opening_prunes_idle_sessions() {
        let sessions = EditorSessions::new(Duration::ZERO);
        let owner = Uuid::new_v4();
        sessions.open(owner, PostEditor::create());
        sessions.open(owner, PostEditor::create());

        assert_eq!(sessions.len(), 1);
    }

    #[tokio::test]
    async fn slot_lock_exposes_the_editor() {
        let sessions = EditorSessions::new(Duration::from_secs(60));
        let slot = sessions.open(Uuid::new_v4(), PostEditor::create());

        slot.lock().await.set_title("Locked Title").expect("title");
        assert_eq!(slot.lock().await.draft().slug, "locked-title");
    }
}
