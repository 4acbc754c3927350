use thiserror::Error;

/// Reasons a candidate upload is rejected before any network call.
///
/// Checks run in a fixed priority order (empty, size, extension, MIME type);
/// the first failing check wins.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileValidationError {
    #[error("file is empty or corrupted")]
    Empty,

    #[error("file size exceeds the maximum allowed ({limit_mb}MB)")]
    TooLarge { limit_mb: u64 },

    #[error("only *.csv files may be uploaded")]
    Extension,

    #[error("unsupported file type")]
    MimeType,
}

/// Failure modes of a streaming analysis run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The server rejected the upload. The message is server-sourced when the
    /// error body carried one, else a fixed fallback.
    #[error("{0}")]
    Server(String),

    /// The response body failed before delivering any data.
    #[error("unknown error while trying to process the file")]
    MissingBody,

    /// A chunk parsed as JSON but carried no recognized analysis fields.
    #[error("file was not correctly processed on the server :(")]
    UnrecognizedPayload,

    /// A chunk was not parseable at all.
    #[error("unknown parsing error")]
    Parse,

    /// The error body of a rejected upload was itself malformed JSON.
    #[error(transparent)]
    ErrorBody(#[from] serde_json::Error),

    /// Network-level failure from the underlying HTTP client.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Failure modes of history persistence.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing store refused the operation (quota, permissions, poisoned
    /// state).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("failed to encode history: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failure modes of report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The server rejected the request. The message is server-sourced when
    /// the error body carried one, else a fixed fallback.
    #[error("{0}")]
    Server(String),

    /// The error body of a rejected request was itself malformed JSON.
    #[error(transparent)]
    ErrorBody(#[from] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API host '{host}': {source}")]
    InvalidApiHost {
        host: String,
        source: url::ParseError,
    },

    #[error("invalid value for {var}: '{value}'")]
    InvalidValue { var: String, value: String },
}
