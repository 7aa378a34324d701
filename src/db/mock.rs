//! In-memory `EntryStore` for unit tests.

use crate::db::EntryStore;
use crate::error::Result;
use crate::models::Entry;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Default)]
struct MockState {
    next_id: i32,
    schema_initialized: bool,
    entries: BTreeMap<String, Entry>,
}

/// Keeps entries in a `BTreeMap`, so `list_entries` is naturally ordered by key.
#[derive(Default)]
pub struct MockStore {
    state: Mutex<MockState>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_initialized(&self) -> bool {
        self.state.lock().unwrap().schema_initialized
    }

    pub fn value_of(&self, key: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .entries
            .get(key)
            .map(|e| e.value.clone())
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().entries.len()
    }
}

#[async_trait]
impl EntryStore for MockStore {
    async fn init_schema(&self) -> Result<()> {
        self.state.lock().unwrap().schema_initialized = true;
        Ok(())
    }

    async fn put_entry(&self, key: &str, value: &str) -> Result<Entry> {
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();
        if let Some(existing) = state.entries.get_mut(key) {
            existing.value = value.to_string();
            existing.updated_at = now;
            return Ok(existing.clone());
        }
        state.next_id += 1;
        let entry = Entry {
            id: state.next_id,
            key: key.to_string(),
            value: value.to_string(),
            created_at: now,
            updated_at: now,
        };
        state.entries.insert(key.to_string(), entry.clone());
        Ok(entry)
    }

    async fn get_entry(&self, key: &str) -> Result<Option<Entry>> {
        Ok(self.state.lock().unwrap().entries.get(key).cloned())
    }

    async fn list_entries(&self) -> Result<Vec<Entry>> {
        Ok(self.state.lock().unwrap().entries.values().cloned().collect())
    }

    async fn delete_entry(&self, key: &str) -> Result<bool> {
        Ok(self.state.lock().unwrap().entries.remove(key).is_some())
    }
}
