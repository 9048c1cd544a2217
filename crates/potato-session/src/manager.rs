//! UserStateManager: concurrent per-user access via DashMap.
//!
//! Each entry is mutated under its shard lock, which serves as the per-user
//! lock. Cross-user passes work on clones and write back one user at a time.

use std::sync::Arc;

use dashmap::DashMap;

use crate::state::UserAnnotationState;

/// Thread-safe map of user id to annotation state.
pub struct UserStateManager {
    users: Arc<DashMap<String, UserAnnotationState>>,
}

impl UserStateManager {
    pub fn new() -> Self {
        Self {
            users: Arc::new(DashMap::new()),
        }
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.users.contains_key(user_id)
    }

    /// Cloned snapshot of one user.
    pub fn get(&self, user_id: &str) -> Option<UserAnnotationState> {
        self.users.get(user_id).map(|r| r.clone())
    }

    /// Insert unless present. Returns false if the user already existed.
    pub fn insert_new(&self, state: UserAnnotationState) -> bool {
        match self.users.entry(state.user_id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => false,
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(state);
                true
            }
        }
    }

    /// Insert or replace.
    pub fn upsert(&self, state: UserAnnotationState) {
        self.users.insert(state.user_id.clone(), state);
    }

    pub fn remove(&self, user_id: &str) -> Option<UserAnnotationState> {
        self.users.remove(user_id).map(|(_, v)| v)
    }

    /// Run `f` under the user's lock. `None` if the user is unknown.
    pub fn with_user_mut<T, F>(&self, user_id: &str, f: F) -> Option<T>
    where
        F: FnOnce(&mut UserAnnotationState) -> T,
    {
        self.users.get_mut(user_id).map(|mut entry| f(entry.value_mut()))
    }

    /// Read-only access under the user's lock.
    pub fn with_user<T, F>(&self, user_id: &str, f: F) -> Option<T>
    where
        F: FnOnce(&UserAnnotationState) -> T,
    {
        self.users.get(user_id).map(|entry| f(entry.value()))
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn user_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.users.iter().map(|r| r.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Cloned snapshots of every user, sorted by id.
    pub fn snapshots(&self) -> Vec<UserAnnotationState> {
        let mut all: Vec<UserAnnotationState> = self.users.iter().map(|r| r.clone()).collect();
        all.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        all
    }

    /// Finished real instances summed over all users.
    pub fn total_finished(&self) -> usize {
        self.users.iter().map(|r| r.finished_count()).sum()
    }
}

impl Default for UserStateManager {
    fn default() -> Self {
        Self::new()
    }
}
