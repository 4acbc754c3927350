use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Raw analysis record as the server shapes it: recognized field names mapped
/// to numbers or strings. Insertion order is preserved (serde_json is built
/// with `preserve_order`), which the highlight ordering invariant depends on.
pub type AnalysisRecord = serde_json::Map<String, serde_json::Value>;

/// A display-ready pair derived from one analysis field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub title: String,
    pub description: String,
}

/// A candidate upload: name, declared MIME type, and contents.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    /// Declared MIME type, when the caller knows one. `None` skips the MIME
    /// check during validation.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Read a file from disk into an upload candidate. No MIME type is
    /// declared; pass one explicitly if the caller has it.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bytes = std::fs::read(path)?;
        Ok(Self {
            file_name,
            content_type: None,
            bytes,
        })
    }
}

/// Bookkeeping field reported by the server alongside analysis results. It
/// counts toward response validation but is stripped before results reach
/// callers or history.
pub const ROWS_AFFECTED_FIELD: &str = "rows_affected";

/// Recognized analysis fields and their human-readable labels. This mapping
/// is the sole source of truth for both response validation and display.
pub const HIGHLIGHT_LABELS: [(&str, &str); 9] = [
    ("total_spend_galactic", "Total galactic spend"),
    ("rows_affected", "Rows processed"),
    ("less_spent_at", "Day of minimum spend"),
    ("big_spent_at", "Day of maximum spend"),
    ("less_spent_value", "Minimum daily spend"),
    ("big_spent_value", "Maximum daily spend"),
    ("average_spend_galactic", "Average galactic spend"),
    ("big_spent_civ", "Civilization with maximum spend"),
    ("less_spent_civ", "Civilization with minimum spend"),
];

/// Label for a recognized field name, `None` for anything else.
pub fn label_for(field: &str) -> Option<&'static str> {
    HIGHLIGHT_LABELS
        .iter()
        .find(|(key, _)| *key == field)
        .map(|(_, label)| *label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_for_known_field() {
        assert_eq!(label_for("total_spend_galactic"), Some("Total galactic spend"));
        assert_eq!(label_for("rows_affected"), Some("Rows processed"));
    }

    #[test]
    fn test_label_for_unknown_field() {
        assert_eq!(label_for("not_a_field"), None);
        assert_eq!(label_for(""), None);
    }

    #[test]
    fn test_upload_file_from_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("spend.csv");
        std::fs::write(&path, "a,b\n1,2\n").unwrap();

        let file = UploadFile::from_path(&path).unwrap();
        assert_eq!(file.file_name, "spend.csv");
        assert_eq!(file.bytes, b"a,b\n1,2\n");
        assert!(file.content_type.is_none());
    }

    #[test]
    fn test_upload_file_from_missing_path() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(UploadFile::from_path(&dir.path().join("absent.csv")).is_err());
    }
}
