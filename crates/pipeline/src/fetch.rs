//! Remote fetch helper: pull a source file from a URL and attach it to the
//! import before the pipeline starts.
//!
//! One GET, success-class responses only, no retries. Any failure is
//! pipeline-fatal -- the caller marks the import failed and no rows are
//! ever processed.

use rollcall_core::types::DbId;

use crate::error::PipelineError;
use crate::store::ImportStore;

/// Fallback when neither the response headers nor the URL name the file.
const DEFAULT_FILE_NAME: &str = "download";

/// Validate that a fetch URL is non-empty and http(s).
pub fn validate_fetch_url(url: &str) -> Result<(), PipelineError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(PipelineError::Fetch("URL must not be empty".to_string()));
    }
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(PipelineError::Fetch(format!(
            "URL must start with http:// or https://, got '{trimmed}'"
        )));
    }
    Ok(())
}

/// Pick a file name for the downloaded artifact: the Content-Disposition
/// `filename` when the server sent one, else the last URL path segment,
/// else [`DEFAULT_FILE_NAME`].
pub fn filename_for(url: &str, content_disposition: Option<&str>) -> String {
    if let Some(header) = content_disposition {
        if let Some(position) = header.find("filename=") {
            let name = header[position + "filename=".len()..]
                .split(';')
                .next()
                .unwrap_or("")
                .trim()
                .trim_matches('"');
            if !name.is_empty() {
                return name.to_string();
            }
        }
    }

    let path = url.split(['?', '#']).next().unwrap_or("");
    let without_scheme = path.split_once("://").map_or(path, |(_, rest)| rest);
    without_scheme
        .split('/')
        .skip(1) // host
        .filter(|segment| !segment.is_empty())
        .last()
        .unwrap_or(DEFAULT_FILE_NAME)
        .to_string()
}

/// Download `url` and attach the body to the import.
///
/// On success the artifact is attached with the filename and content type
/// taken from the response; nothing temporary outlives the attach. Never
/// retries.
pub async fn fetch_and_attach(
    store: &dyn ImportStore,
    import_id: DbId,
    url: &str,
) -> Result<(), PipelineError> {
    validate_fetch_url(url)?;

    let response = reqwest::get(url)
        .await
        .map_err(|e| PipelineError::Fetch(format!("request to '{url}' failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(PipelineError::Fetch(format!(
            "server returned {status} for '{url}'"
        )));
    }

    let content_disposition = response
        .headers()
        .get(reqwest::header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body = response
        .bytes()
        .await
        .map_err(|e| PipelineError::Fetch(format!("failed to read body from '{url}': {e}")))?;

    let file_name = filename_for(url, content_disposition.as_deref());
    tracing::debug!(
        import_id,
        file_name,
        bytes = body.len(),
        "Fetched import source"
    );

    store
        .attach_file(import_id, &file_name, content_type.as_deref(), &body)
        .await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
