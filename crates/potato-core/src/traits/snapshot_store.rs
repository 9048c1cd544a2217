use crate::errors::PotatoResult;

/// Durable round-trip of user states and the assignment registry as opaque blobs.
pub trait ISnapshotStore: Send + Sync {
    fn save_user(&self, user_id: &str, blob: &str) -> PotatoResult<()>;
    fn load_user(&self, user_id: &str) -> PotatoResult<Option<String>>;
    fn list_users(&self) -> PotatoResult<Vec<String>>;
    fn delete_user(&self, user_id: &str) -> PotatoResult<()>;

    fn save_registry(&self, blob: &str) -> PotatoResult<()>;
    fn load_registry(&self) -> PotatoResult<Option<String>>;

    fn name(&self) -> &str;
}
