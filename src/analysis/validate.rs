use super::types::{AnalysisRecord, UploadFile, HIGHLIGHT_LABELS};
use crate::error::FileValidationError;

/// Maximum accepted upload size in bytes (50 MiB).
pub const MAX_FILE_SIZE: usize = 50 * 1024 * 1024;

/// MIME types under which real-world systems deliver CSV files. Excel saves
/// CSV as vnd.ms-excel; some platforms report plain text.
const VALID_CSV_MIME_TYPES: [&str; 5] = [
    "text/csv",
    "application/csv",
    "text/comma-separated-values",
    "application/vnd.ms-excel",
    "text/plain",
];

/// Check an upload candidate before any network call.
///
/// Checks run in a fixed priority order, short-circuiting on the first
/// failure: empty, size, extension, MIME type. A file with no declared MIME
/// type skips the MIME check. Pure function of the file metadata.
pub fn validate_csv_file(file: &UploadFile) -> Result<(), FileValidationError> {
    if file.bytes.is_empty() {
        return Err(FileValidationError::Empty);
    }

    if file.bytes.len() > MAX_FILE_SIZE {
        return Err(FileValidationError::TooLarge {
            limit_mb: (MAX_FILE_SIZE / 1024 / 1024) as u64,
        });
    }

    if !file.file_name.to_lowercase().ends_with(".csv") {
        return Err(FileValidationError::Extension);
    }

    if let Some(content_type) = &file.content_type {
        if !VALID_CSV_MIME_TYPES.contains(&content_type.as_str()) {
            return Err(FileValidationError::MimeType);
        }
    }

    Ok(())
}

/// True iff the record carries at least one recognized analysis field.
///
/// Rejects responses that parse as JSON but carry no meaningful fields, such
/// as error envelopes misrouted into the success path.
pub fn validate_server_response(record: &AnalysisRecord) -> bool {
    HIGHLIGHT_LABELS.iter().any(|(key, _)| record.contains_key(*key))
}
