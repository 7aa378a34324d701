//! Defines the key/value entry kept by the `bo` store.
//!
//! Includes structs for:
//! - Representing data stored in the database (`Entry`).
//! - The portable form used for JSON export/import (`EntryRecord`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A row of the `entries` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Entry {
    pub id: i32,
    pub key: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The key/value pair without database bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub key: String,
    pub value: String,
}

impl EntryRecord {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Parses a `KEY=VALUE` argument. The key must be non-empty after trimming;
    /// the value may be empty and may itself contain `=`.
    pub fn parse_assignment(input: &str) -> Option<Self> {
        let (key, value) = input.split_once('=')?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        Some(Self::new(key, value))
    }
}

impl From<Entry> for EntryRecord {
    fn from(entry: Entry) -> Self {
        Self {
            key: entry.key,
            value: entry.value,
        }
    }
}
