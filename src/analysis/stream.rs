use std::time::Duration;

use futures_util::{Stream, StreamExt};
use serde_json::Value;
use tracing::{info, warn};

use super::transform::{first_json_object, to_highlights};
use super::types::{AnalysisRecord, Highlight, UploadFile, ROWS_AFFECTED_FIELD};
use super::validate::validate_server_response;
use crate::config::Config;
use crate::error::AnalysisError;

/// Fallback message when a rejected upload's error body names no reason.
const UNKNOWN_SERVER_ERROR: &str = "unknown error while processing the file";

/// Build the HTTP client used against the aggregation service.
///
/// Connect timeout only: an accepted upload may stream results for as long as
/// the server keeps computing, so reads carry no deadline.
pub fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(concat!("spendlens/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(30))
        .build()
        .expect("Failed to build reqwest client")
}

/// Upload a CSV file and consume the streamed analysis response.
///
/// Submits the file as a multipart POST to the aggregate endpoint and reads
/// the newline-delimited JSON response incrementally. Each well-formed chunk
/// is parsed, validated against the recognized-field vocabulary, stripped of
/// the bookkeeping field, and delivered to `on_data` as highlights. The last
/// successfully parsed record becomes the final result.
///
/// `on_data` fires zero or more times; exactly one of `Ok`/`Err` is produced.
/// `Ok(None)` means the stream ended without delivering any chunk.
///
/// # Errors
/// - `Server`: non-success status, message taken from the error body's
///   `error` field, then `message`, then a fixed fallback
/// - `ErrorBody`: the error body of a rejected upload was not JSON
/// - `MissingBody`: the response body failed before any data arrived
/// - `UnrecognizedPayload`: a chunk parsed as JSON but carried no recognized
///   fields
/// - `Parse`: a chunk was not parseable at all
/// - `Transport`: network failure from the underlying client
pub async fn analyze_csv<F>(
    client: &reqwest::Client,
    config: &Config,
    file: &UploadFile,
    on_data: F,
) -> Result<Option<AnalysisRecord>, AnalysisError>
where
    F: FnMut(Vec<Highlight>),
{
    let mut part = reqwest::multipart::Part::bytes(file.bytes.clone())
        .file_name(file.file_name.clone());
    if let Some(content_type) = &file.content_type {
        part = part.mime_str(content_type)?;
    }
    let form = reqwest::multipart::Form::new().part("file", part);

    info!(
        "Submitting {} ({} bytes) for analysis, row limit {}",
        file.file_name,
        file.bytes.len(),
        config.rows
    );
    let response = client
        .post(config.aggregate_url())
        .query(&[("rows", config.rows)])
        .multipart(form)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await?;
        // A malformed error body propagates as the reported error itself
        let envelope: Value = serde_json::from_str(&body)?;
        let message = envelope
            .get("error")
            .and_then(Value::as_str)
            .or_else(|| envelope.get("message").and_then(Value::as_str))
            .unwrap_or(UNKNOWN_SERVER_ERROR)
            .to_string();
        warn!("Analysis rejected with status {}: {}", status, message);
        return Err(AnalysisError::Server(message));
    }

    consume_stream(Box::pin(response.bytes_stream()), on_data).await
}

/// Read the response stream chunk by chunk, running each through the
/// parse/validate/transform pipeline.
///
/// Each successful chunk overwrites the remembered final record; the server
/// sends cumulative snapshots, not deltas. A body failure before any data
/// arrived is reported as a missing body; a failure mid-stream propagates
/// as-is, and data already delivered through `on_data` stands.
pub(crate) async fn consume_stream<S, B, E, F>(
    mut stream: S,
    mut on_data: F,
) -> Result<Option<AnalysisRecord>, AnalysisError>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Into<AnalysisError>,
    F: FnMut(Vec<Highlight>),
{
    let mut final_record: Option<AnalysisRecord> = None;
    let mut saw_data = false;

    while let Some(next) = stream.next().await {
        let chunk = match next {
            Ok(chunk) => chunk,
            Err(e) => {
                let err = e.into();
                if saw_data {
                    return Err(err);
                }
                warn!("Response body failed before any data arrived: {}", err);
                return Err(AnalysisError::MissingBody);
            }
        };

        let bytes = chunk.as_ref();
        if bytes.is_empty() {
            continue;
        }
        saw_data = true;

        let record = process_chunk(bytes)?;
        on_data(to_highlights(&record));
        final_record = Some(record);
    }

    Ok(final_record)
}

/// Parse and validate one chunk, returning the record minus the bookkeeping
/// field.
fn process_chunk(bytes: &[u8]) -> Result<AnalysisRecord, AnalysisError> {
    let value = first_json_object(bytes).map_err(|e| {
        warn!("Chunk was not valid JSON: {}", e);
        AnalysisError::Parse
    })?;

    let mut record = match value {
        Value::Object(map) => map,
        _ => return Err(AnalysisError::UnrecognizedPayload),
    };
    if !validate_server_response(&record) {
        return Err(AnalysisError::UnrecognizedPayload);
    }

    // shift_remove keeps the relative order of the remaining fields, which
    // swap-style removal would not under preserve_order
    record.shift_remove(ROWS_AFFECTED_FIELD);
    Ok(record)
}
