//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{DomainError, JournalEntry};
use chrono::{DateTime, Utc};

/// Journal storage. Entries are kept newest first. A failed write leaves the
/// stored entries unchanged.
#[async_trait::async_trait]
pub trait JournalPort: Send + Sync {
    /// All saved entries, newest first. Empty when nothing was saved yet.
    async fn load_entries(&self) -> Result<Vec<JournalEntry>, DomainError>;

    /// Store a new entry in front of the existing ones.
    async fn save_entry(&self, entry: &JournalEntry) -> Result<(), DomainError>;

    /// Remove the entry with `id`. Fails with `EntryNotFound` if there is none.
    async fn delete_entry(&self, id: &str) -> Result<(), DomainError>;

    /// Merge `entries` into the journal, skipping known ids and entries without
    /// an id or summary, then re-sort newest first. Returns how many were added.
    async fn import_entries(&self, entries: Vec<JournalEntry>) -> Result<usize, DomainError>;

    /// Remove every entry.
    async fn clear(&self) -> Result<(), DomainError>;
}

/// Source of the current instant. Read once per use-case call.
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
