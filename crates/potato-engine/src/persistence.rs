//! Snapshot round-trips, dropped users and annotation export.

use std::path::Path;

use potato_assignment::RegistryState;
use potato_core::errors::{PotatoResult, StorageError};
use potato_core::traits::ISnapshotStore;
use potato_observability::events;
use potato_session::UserAnnotationState;
use potato_storage::{export_annotations, ExportFormat};
use tracing::{info, warn};

use crate::engine::{user_not_found, AnnotationEngine};

const REGISTRY_KEY: &str = "registry";

impl AnnotationEngine {
    /// Save one user's snapshot.
    pub fn persist_user(&self, user_id: &str) -> PotatoResult<()> {
        let state = self.user(user_id)?;
        let blob = serde_json::to_string(&state)?;
        self.store.save_user(user_id, &blob)
    }

    /// Save every user's snapshot.
    pub fn persist_users(&self) -> PotatoResult<usize> {
        let states = self.users.snapshots();
        for state in &states {
            self.store
                .save_user(&state.user_id, &serde_json::to_string(state)?)?;
        }
        Ok(states.len())
    }

    /// Save the registry together with one user, after anything that moved
    /// quota on that user's behalf.
    pub(crate) fn persist_assignment(&self, user_id: &str) -> PotatoResult<()> {
        self.persist_registry()?;
        self.persist_user(user_id)
    }

    pub(crate) fn persist_registry(&self) -> PotatoResult<()> {
        let blob = serde_json::to_string(&self.registry.snapshot())?;
        self.store.save_registry(&blob)
    }

    /// Save the registry and every user.
    pub fn persist(&self) -> PotatoResult<()> {
        self.persist_registry()?;
        let users = self.persist_users()?;
        info!(users, store = self.store.name(), "campaign persisted");
        Ok(())
    }

    /// Reload the registry and every stored user, replacing what is in
    /// memory. Returns the number of users restored.
    pub fn restore(&self) -> PotatoResult<usize> {
        if let Some(state) = load_registry_snapshot(self.store.as_ref())? {
            self.registry.replace(state);
        }
        let ids = self.store.list_users()?;
        for user_id in &ids {
            if let Some(state) = self.load_user_snapshot(user_id)? {
                self.users.upsert(state);
            }
        }
        info!(users = ids.len(), store = self.store.name(), "campaign restored");
        Ok(ids.len())
    }

    /// Parse a stored user and drop queue entries the catalog no longer has.
    pub(crate) fn load_user_snapshot(
        &self,
        user_id: &str,
    ) -> PotatoResult<Option<UserAnnotationState>> {
        let Some(blob) = self.store.load_user(user_id)? else {
            return Ok(None);
        };
        let mut state: UserAnnotationState =
            serde_json::from_str(&blob).map_err(|e| corrupted(user_id, e))?;
        let before = state.queue().len();
        state.retain_queue(|id| self.catalog.contains(id));
        let dropped = before - state.queue().len();
        if dropped > 0 {
            warn!(user_id = %user_id, dropped, "dropped unknown instances from restored queue");
        }
        Ok(Some(state))
    }

    /// Remove users, hand their reservations back to the pool and delete
    /// their snapshots. Returns the removed states. An unknown id stops the
    /// batch; users removed before it stay removed and the registry is saved
    /// either way.
    pub fn drop_users(&self, user_ids: &[String]) -> PotatoResult<Vec<UserAnnotationState>> {
        let mut archived = Vec::with_capacity(user_ids.len());
        let mut released = 0usize;
        let outcome = user_ids.iter().try_for_each(|user_id| -> PotatoResult<()> {
            let state = self
                .users
                .remove(user_id)
                .ok_or_else(|| user_not_found(user_id))?;
            released += self.registry.release_user(user_id).len();
            archived.push(state);
            self.store.delete_user(user_id)
        });
        if !archived.is_empty() {
            self.persist_registry()?;
            let dropped: Vec<String> = archived.iter().map(|s| s.user_id.clone()).collect();
            events::users_dropped(&dropped, released);
        }
        outcome.map(|()| archived)
    }

    /// Write every answer to `path` in the configured output format.
    pub fn export(&self, path: &Path) -> PotatoResult<usize> {
        let format = ExportFormat::parse(&self.config.output.format)?;
        let written = export_annotations(path, &self.users.snapshots(), format)?;
        Ok(written)
    }
}

/// Registry blob from `store`, if one was ever saved.
pub(crate) fn load_registry_snapshot(
    store: &dyn ISnapshotStore,
) -> PotatoResult<Option<RegistryState>> {
    let Some(blob) = store.load_registry()? else {
        return Ok(None);
    };
    let state: RegistryState =
        serde_json::from_str(&blob).map_err(|e| corrupted(REGISTRY_KEY, e))?;
    Ok(Some(state))
}

fn corrupted(key: &str, e: serde_json::Error) -> StorageError {
    StorageError::SnapshotCorrupted {
        key: key.to_string(),
        message: e.to_string(),
    }
}
