//! InMemorySnapshotStore: DashMap-backed store for tests and ephemeral runs.

use std::sync::RwLock;

use dashmap::DashMap;
use potato_core::errors::PotatoResult;
use potato_core::traits::ISnapshotStore;

#[derive(Default)]
pub struct InMemorySnapshotStore {
    users: DashMap<String, String>,
    registry: RwLock<Option<String>>,
}

impl InMemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

impl ISnapshotStore for InMemorySnapshotStore {
    fn save_user(&self, user_id: &str, blob: &str) -> PotatoResult<()> {
        self.users.insert(user_id.to_string(), blob.to_string());
        Ok(())
    }

    fn load_user(&self, user_id: &str) -> PotatoResult<Option<String>> {
        Ok(self.users.get(user_id).map(|b| b.clone()))
    }

    fn list_users(&self) -> PotatoResult<Vec<String>> {
        let mut ids: Vec<String> = self.users.iter().map(|r| r.key().clone()).collect();
        ids.sort();
        Ok(ids)
    }

    fn delete_user(&self, user_id: &str) -> PotatoResult<()> {
        self.users.remove(user_id);
        Ok(())
    }

    fn save_registry(&self, blob: &str) -> PotatoResult<()> {
        let mut slot = self.registry.write().unwrap_or_else(|p| p.into_inner());
        *slot = Some(blob.to_string());
        Ok(())
    }

    fn load_registry(&self) -> PotatoResult<Option<String>> {
        Ok(self
            .registry
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
