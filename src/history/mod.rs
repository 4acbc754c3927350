//! Persisted history of past analysis attempts.

pub mod store;
pub mod types;

pub use store::{HistoryStore, DEFAULT_HISTORY_KEY};
pub use types::{format_date, HistoryEntry, NewHistoryEntry};
