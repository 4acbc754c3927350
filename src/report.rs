use serde_json::Value;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::ReportError;

/// Relative size requested when the caller does not specify one.
pub const DEFAULT_REPORT_SIZE: f64 = 0.01;

const DEFAULT_REPORT_FILENAME: &str = "report.csv";

/// Fallback message when a rejected request's error body names no reason.
const UNKNOWN_REPORT_ERROR: &str = "unknown error while trying to generate the report";

/// A downloaded report: raw bytes plus the server-suggested file name.
#[derive(Debug, Clone)]
pub struct Report {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Download a generated sample report.
///
/// One GET to the report endpoint. On success the file name comes from the
/// `Content-Disposition` header, defaulting when absent.
///
/// # Errors
/// - `Server`: non-success status; "an error occurred: {error}" when the
///   error body names a reason, else a fixed fallback
/// - `ErrorBody`: the error body was not JSON
/// - `Transport`: network failure from the underlying client
pub async fn generate_report(
    client: &reqwest::Client,
    config: &Config,
    size: Option<f64>,
) -> Result<Report, ReportError> {
    let size = size.unwrap_or(DEFAULT_REPORT_SIZE);
    info!("Requesting report of size {}", size);

    let response = client
        .get(config.report_url())
        .query(&[("size", size)])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await?;
        let envelope: Value = serde_json::from_str(&body)?;
        let message = match envelope.get("error").and_then(Value::as_str) {
            Some(error) => format!("an error occurred: {error}"),
            None => UNKNOWN_REPORT_ERROR.to_string(),
        };
        warn!("Report request rejected with status {}: {}", status, message);
        return Err(ReportError::Server(message));
    }

    let filename = response
        .headers()
        .get(reqwest::header::CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_filename)
        .unwrap_or_else(|| DEFAULT_REPORT_FILENAME.to_string());

    let bytes = response.bytes().await?.to_vec();
    info!("Downloaded report {} ({} bytes)", filename, bytes.len());
    Ok(Report { filename, bytes })
}

/// Pull the file name out of a `Content-Disposition`-style header value.
fn parse_filename(header: &str) -> Option<String> {
    header
        .split_once("filename=")
        .map(|(_, rest)| rest.replace('"', ""))
}
