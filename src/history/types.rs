use chrono::{Datelike, Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisRecord;

/// A recorded analysis attempt, newest first in the persisted collection.
///
/// Serialized with camelCase field names, the shape the web client persisted.
/// `highlights` is absent when the analysis failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub file_name: String,
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlights: Option<AnalysisRecord>,
}

impl HistoryEntry {
    /// Whether the recorded attempt produced results.
    pub fn is_success(&self) -> bool {
        self.highlights.is_some()
    }
}

/// Input for a new history record; id and timestamp are generated by the
/// store.
#[derive(Debug, Clone)]
pub struct NewHistoryEntry {
    pub file_name: String,
    pub highlights: Option<AnalysisRecord>,
}

/// Format a millisecond timestamp as `DD.MM.YYYY` in local time.
///
/// Timestamps that fall outside the representable range, or outside years
/// 1-9999, render as "Invalid Date".
pub fn format_date(timestamp_ms: i64) -> String {
    let date = match Local.timestamp_millis_opt(timestamp_ms) {
        chrono::LocalResult::Single(date) => date,
        _ => return "Invalid Date".to_string(),
    };
    if !(1..=9999).contains(&date.year()) {
        return "Invalid Date".to_string();
    }
    date.format("%d.%m.%Y").to_string()
}
