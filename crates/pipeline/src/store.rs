//! Persistence seam for the import record.
//!
//! The runner only ever talks to [`ImportStore`], so its observable
//! behaviour (progress after every row, terminal transitions, the atomic
//! claim) can be exercised against an in-memory fake. [`PgImportStore`]
//! is the production implementation over `BulkImportRepo`.

use async_trait::async_trait;

use rollcall_core::bulk_import::ImportStatus;
use rollcall_core::types::DbId;
use rollcall_db::models::bulk_import::ImportFile;
use rollcall_db::repositories::BulkImportRepo;
use rollcall_db::DbPool;
use rollcall_events::ImportSnapshot;

use crate::error::PipelineError;

/// Durable state operations for one import record.
///
/// All mutating methods are called by the single task that owns the run;
/// readers elsewhere only ever read.
#[async_trait]
pub trait ImportStore: Send + Sync {
    /// Atomically claim the record for processing (`pending` →
    /// `processing`). Returns `false` when another schedule already owns
    /// it, in which case the caller must back off without touching the
    /// record.
    async fn mark_processing(&self, id: DbId) -> Result<bool, PipelineError>;

    /// Current externally visible state of the record.
    async fn find(&self, id: DbId) -> Result<Option<ImportSnapshot>, PipelineError>;

    /// The attached source artifact.
    async fn load_file(&self, id: DbId) -> Result<Option<ImportFile>, PipelineError>;

    /// Persist progress; `total` is provided once, when processing starts.
    async fn update_progress(
        &self,
        id: DbId,
        processed: i32,
        total: Option<i32>,
    ) -> Result<(), PipelineError>;

    /// Terminal success. `error_summary` is present only when at least one
    /// row was rejected.
    async fn mark_completed(
        &self,
        id: DbId,
        error_summary: Option<&str>,
    ) -> Result<(), PipelineError>;

    /// Terminal failure with a descriptive message.
    async fn mark_failed(&self, id: DbId, error: &str) -> Result<(), PipelineError>;

    /// Attach the source artifact (remote fetch helper).
    async fn attach_file(
        &self,
        id: DbId,
        file_name: &str,
        content_type: Option<&str>,
        data: &[u8],
    ) -> Result<(), PipelineError>;
}

/// PostgreSQL-backed [`ImportStore`].
pub struct PgImportStore {
    pool: DbPool,
}

impl PgImportStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ImportStore for PgImportStore {
    async fn mark_processing(&self, id: DbId) -> Result<bool, PipelineError> {
        Ok(BulkImportRepo::claim_processing(&self.pool, id).await?)
    }

    async fn find(&self, id: DbId) -> Result<Option<ImportSnapshot>, PipelineError> {
        let detail = BulkImportRepo::find_detail(&self.pool, id).await?;
        Ok(detail.map(|d| ImportSnapshot {
            id: d.id,
            status: ImportStatus::from_str(&d.status).unwrap_or(ImportStatus::Pending),
            progress: d.progress,
            total_rows: d.total_rows,
            error_message: d.error_message,
            file_name: d.file_name,
            created_at: d.created_at,
        }))
    }

    async fn load_file(&self, id: DbId) -> Result<Option<ImportFile>, PipelineError> {
        Ok(BulkImportRepo::load_file(&self.pool, id).await?)
    }

    async fn update_progress(
        &self,
        id: DbId,
        processed: i32,
        total: Option<i32>,
    ) -> Result<(), PipelineError> {
        Ok(BulkImportRepo::update_progress(&self.pool, id, processed, total).await?)
    }

    async fn mark_completed(
        &self,
        id: DbId,
        error_summary: Option<&str>,
    ) -> Result<(), PipelineError> {
        Ok(BulkImportRepo::mark_completed(&self.pool, id, error_summary).await?)
    }

    async fn mark_failed(&self, id: DbId, error: &str) -> Result<(), PipelineError> {
        Ok(BulkImportRepo::mark_failed(&self.pool, id, error).await?)
    }

    async fn attach_file(
        &self,
        id: DbId,
        file_name: &str,
        content_type: Option<&str>,
        data: &[u8],
    ) -> Result<(), PipelineError> {
        Ok(BulkImportRepo::attach_file(&self.pool, id, file_name, content_type, data).await?)
    }
}
