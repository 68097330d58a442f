//! Repository for bulk imports.
//!
//! Status updates resolve the `bulk_import_statuses` lookup row by name via
//! a subselect. The claim update is the single concurrency guard for a
//! run: exactly one caller can move a given import out of `pending`.

use sqlx::PgPool;
use rollcall_core::types::DbId;

use crate::models::bulk_import::{
    BulkImport, BulkImportDetail, BulkImportStatus, CreateBulkImport, ImportFile,
};

/// Column list for `bulk_imports` (file bytes excluded).
const COLUMNS: &str = "id, status_id, progress, total_rows, error_message, created_by, \
     file_name, file_content_type, created_at, updated_at";

/// Column list for the status-joined detail shape.
const DETAIL_COLUMNS: &str = "b.id, s.name AS status, b.progress, b.total_rows, b.error_message, \
     b.created_by, b.file_name, b.file_content_type, b.created_at, b.updated_at";

/// Provides CRUD and state-transition operations for bulk imports.
pub struct BulkImportRepo;

impl BulkImportRepo {
    /// Create a new import in `pending` status.
    pub async fn create(
        pool: &PgPool,
        input: &CreateBulkImport,
    ) -> Result<BulkImport, sqlx::Error> {
        let query = format!(
            "INSERT INTO bulk_imports \
                (status_id, created_by, file_name, file_content_type, file_data) \
             VALUES ( \
                (SELECT id FROM bulk_import_statuses WHERE name = 'pending'), \
                $1, $2, $3, $4 \
             ) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BulkImport>(&query)
            .bind(input.created_by)
            .bind(&input.file_name)
            .bind(&input.file_content_type)
            .bind(&input.file_data)
            .fetch_one(pool)
            .await
    }

    /// Find an import by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<BulkImport>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM bulk_imports WHERE id = $1");
        sqlx::query_as::<_, BulkImport>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an import joined with its status name.
    pub async fn find_detail(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<BulkImportDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} FROM bulk_imports b \
             JOIN bulk_import_statuses s ON s.id = b.status_id \
             WHERE b.id = $1"
        );
        sqlx::query_as::<_, BulkImportDetail>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all imports, most recent first.
    pub async fn list(pool: &PgPool) -> Result<Vec<BulkImportDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS} FROM bulk_imports b \
             JOIN bulk_import_statuses s ON s.id = b.status_id \
             ORDER BY b.created_at DESC"
        );
        sqlx::query_as::<_, BulkImportDetail>(&query)
            .fetch_all(pool)
            .await
    }

    /// IDs of pending imports that already have a file attached, oldest
    /// first. Imports awaiting a remote fetch stay invisible here until
    /// the fetch attaches their file.
    pub async fn list_pending(pool: &PgPool) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> = sqlx::query_as(
            "SELECT b.id FROM bulk_imports b \
             JOIN bulk_import_statuses s ON s.id = b.status_id \
             WHERE s.name = 'pending' AND b.file_data IS NOT NULL \
             ORDER BY b.id",
        )
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Atomically claim an import for processing.
    ///
    /// Succeeds only while the import is still `pending`, so a duplicate
    /// schedule against the same id is a safe no-op. Returns `true` when
    /// this caller won the claim.
    pub async fn claim_processing(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE bulk_imports SET \
                status_id = (SELECT id FROM bulk_import_statuses WHERE name = 'processing'), \
                updated_at = now() \
             WHERE id = $1 \
               AND status_id = (SELECT id FROM bulk_import_statuses WHERE name = 'pending')",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record progress. `total` is set once at the start of processing and
    /// left untouched afterwards.
    pub async fn update_progress(
        pool: &PgPool,
        id: DbId,
        processed: i32,
        total: Option<i32>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE bulk_imports SET \
                progress = $2, \
                total_rows = COALESCE($3, total_rows), \
                updated_at = now() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(processed)
        .bind(total)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Terminal success: all rows were attempted. Progress snaps to
    /// `total_rows`; `error_message` carries the partial-failure summary
    /// when at least one row was rejected.
    pub async fn mark_completed(
        pool: &PgPool,
        id: DbId,
        error_message: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE bulk_imports SET \
                status_id = (SELECT id FROM bulk_import_statuses WHERE name = 'completed'), \
                progress = total_rows, \
                error_message = $2, \
                updated_at = now() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(error_message)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Terminal failure: a pipeline-level error aborted the run.
    pub async fn mark_failed(pool: &PgPool, id: DbId, error: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE bulk_imports SET \
                status_id = (SELECT id FROM bulk_import_statuses WHERE name = 'failed'), \
                error_message = $2, \
                updated_at = now() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Attach the source artifact (used by the remote fetch helper).
    pub async fn attach_file(
        pool: &PgPool,
        id: DbId,
        file_name: &str,
        content_type: Option<&str>,
        data: &[u8],
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE bulk_imports SET \
                file_name = $2, \
                file_content_type = $3, \
                file_data = $4, \
                updated_at = now() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(file_name)
        .bind(content_type)
        .bind(data)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Load the attached file for a run. The bytes are read once, by the
    /// single task that owns the run.
    pub async fn load_file(pool: &PgPool, id: DbId) -> Result<Option<ImportFile>, sqlx::Error> {
        sqlx::query_as::<_, ImportFile>(
            "SELECT file_name, file_content_type, file_data FROM bulk_imports WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// List the seeded status rows.
    pub async fn list_statuses(pool: &PgPool) -> Result<Vec<BulkImportStatus>, sqlx::Error> {
        sqlx::query_as::<_, BulkImportStatus>(
            "SELECT id, name, description, created_at, updated_at FROM bulk_import_statuses \
             ORDER BY id",
        )
        .fetch_all(pool)
        .await
    }
}
