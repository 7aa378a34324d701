use crate::error::Result;
use crate::models::Entry;
use async_trait::async_trait;

/// Key/value persistence used by the `bo` option handlers.
///
/// Keys are unique. Implementations must be shareable across tasks, since the
/// handle is passed to handlers by reference.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Creates the backing schema. Safe to call repeatedly.
    async fn init_schema(&self) -> Result<()>;

    /// Inserts `key`, or replaces its value if it already exists.
    async fn put_entry(&self, key: &str, value: &str) -> Result<Entry>;

    async fn get_entry(&self, key: &str) -> Result<Option<Entry>>;

    /// All entries ordered by key.
    async fn list_entries(&self) -> Result<Vec<Entry>>;

    /// Returns `true` if an entry was removed.
    async fn delete_entry(&self, key: &str) -> Result<bool>;
}
