use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::types::{HistoryEntry, NewHistoryEntry};
use crate::error::StorageError;
use crate::storage::Storage;

/// Storage key holding the persisted history collection.
pub const DEFAULT_HISTORY_KEY: &str = "tableHistory";

/// Persisted, ordered collection of past analysis attempts.
///
/// The whole collection lives under a single storage key as a JSON array,
/// newest first. Reads degrade to empty on any corruption so callers can
/// always render something; writes propagate their failures.
pub struct HistoryStore<S: Storage> {
    storage: S,
    key: String,
}

impl<S: Storage> HistoryStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_HISTORY_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Read the persisted history, newest first.
    ///
    /// An absent key, an empty value, invalid JSON, a non-array value, or a
    /// storage read error all yield an empty list. This never fails.
    pub fn list(&self) -> Vec<HistoryEntry> {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read history, treating as empty: {}", e);
                return Vec::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_default()
    }

    /// Record a new attempt at the head of the list and persist it.
    ///
    /// Generates a fresh id and timestamp. Persistence failures are logged
    /// and propagated, never swallowed; a failed history write should be
    /// visible to the caller.
    pub fn add(&self, entry: NewHistoryEntry) -> Result<HistoryEntry, StorageError> {
        let record = HistoryEntry {
            id: Uuid::new_v4().to_string(),
            file_name: entry.file_name,
            timestamp: Utc::now().timestamp_millis(),
            highlights: entry.highlights,
        };

        let mut history = self.list();
        history.insert(0, record.clone());
        self.persist(&history).map_err(|e| {
            error!("Failed to add item to history: {}", e);
            e
        })?;

        info!("Recorded analysis of {} in history", record.file_name);
        Ok(record)
    }

    /// Remove the entry with the given id, if present. Unknown ids are a
    /// no-op, not an error.
    pub fn remove(&self, id: &str) -> Result<(), StorageError> {
        let history: Vec<HistoryEntry> = self
            .list()
            .into_iter()
            .filter(|entry| entry.id != id)
            .collect();
        self.persist(&history).map_err(|e| {
            error!("Failed to remove item from history: {}", e);
            e
        })?;

        info!("Removed history entry {}", id);
        Ok(())
    }

    /// Delete the whole collection.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(&self.key).map_err(|e| {
            error!("Failed to clear history: {}", e);
            e
        })?;

        info!("Cleared history");
        Ok(())
    }

    fn persist(&self, history: &[HistoryEntry]) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(history)?;
        self.storage.set(&self.key, &encoded)
    }
}
