//! Models for bulk user imports.
//!
//! The file bytes are deliberately excluded from [`BulkImport`] so list
//! and polling queries never haul the attached artifact; [`ImportFile`]
//! fetches it separately when a run starts.

use rollcall_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `bulk_import_statuses` lookup table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BulkImportStatus {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `bulk_imports` table (without file bytes).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BulkImport {
    pub id: DbId,
    pub status_id: DbId,
    pub progress: i32,
    pub total_rows: i32,
    pub error_message: Option<String>,
    pub created_by: Option<DbId>,
    pub file_name: Option<String>,
    pub file_content_type: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A `bulk_imports` row joined with its status name.
///
/// This is the shape polling readers consume; it must render the same
/// state the broadcaster emits.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BulkImportDetail {
    pub id: DbId,
    pub status: String,
    pub progress: i32,
    pub total_rows: i32,
    pub error_message: Option<String>,
    pub created_by: Option<DbId>,
    pub file_name: Option<String>,
    pub file_content_type: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new import in `pending` status.
///
/// The file fields are `None` when the import will be fed by the remote
/// fetch helper.
#[derive(Debug, Deserialize)]
pub struct CreateBulkImport {
    pub created_by: Option<DbId>,
    pub file_name: Option<String>,
    pub file_content_type: Option<String>,
    pub file_data: Option<Vec<u8>>,
}

/// The attached source artifact, fetched on demand.
#[derive(Debug, Clone, FromRow)]
pub struct ImportFile {
    pub file_name: Option<String>,
    pub file_content_type: Option<String>,
    pub file_data: Option<Vec<u8>>,
}
