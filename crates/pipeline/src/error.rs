use rollcall_core::types::DbId;

/// Pipeline-level (fatal) errors.
///
/// Any of these aborts the whole run and moves the import record to
/// `failed`. Row-scoped problems never surface here; they become
/// `RowOutcome::Rejected` values and processing continues.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Unsupported file type '.{0}'. Supported: csv, xlsx, xls")]
    UnsupportedFileType(String),

    #[error("Import {0} not found")]
    NotFound(DbId),

    #[error("Import has no attached file")]
    MissingFile,

    #[error("Failed to parse '{file}': {message}")]
    Parse { file: String, message: String },

    #[error("Download failed: {0}")]
    Fetch(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
