//! CSV analysis pipeline: upload validation, streamed response consumption,
//! and transformation into display-ready highlights.

pub mod stream;
pub mod transform;
pub mod types;
pub mod validate;

pub use stream::{analyze_csv, build_client};
pub use transform::{first_json_object, to_highlights};
pub use types::{label_for, AnalysisRecord, Highlight, UploadFile, HIGHLIGHT_LABELS, ROWS_AFFECTED_FIELD};
pub use validate::{validate_csv_file, validate_server_response, MAX_FILE_SIZE};
