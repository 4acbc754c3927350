pub mod analysis;
pub mod config;
pub mod error;
pub mod history;
pub mod report;
pub mod storage;

pub use analysis::{analyze_csv, to_highlights, validate_csv_file, AnalysisRecord, Highlight, UploadFile};
pub use config::Config;
pub use error::{AnalysisError, FileValidationError, ReportError, StorageError};
pub use history::{format_date, HistoryEntry, HistoryStore, NewHistoryEntry};
pub use report::{generate_report, Report};
pub use storage::{FileStorage, MemoryStorage, Storage};
