//! The batch processor: drives one claimed import to a terminal state.

use chrono::Utc;

use rollcall_core::bulk_import::{ImportStatus, RowCounters, BATCH_SIZE};
use rollcall_core::row_fields::RowMap;
use rollcall_events::ImportSnapshot;

use crate::context::ImportContext;
use crate::error::PipelineError;
use crate::materializer::materialize_row;
use crate::rows::RowSource;

/// Run one import to completion.
///
/// Claims the record first; losing the claim (a duplicate schedule) is a
/// silent no-op. Everything after the claim either finishes with
/// `completed` or collapses into [`fail_import`] -- the record always ends
/// terminal.
pub async fn run_import(ctx: &ImportContext) {
    match ctx.store.mark_processing(ctx.import_id).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!(
                import_id = ctx.import_id,
                "Import is not pending, skipping duplicate schedule"
            );
            return;
        }
        Err(e) => {
            tracing::error!(import_id = ctx.import_id, error = %e, "Failed to claim import");
            return;
        }
    }

    if let Err(e) = process(ctx).await {
        fail_import(ctx, &e.to_string()).await;
    }
}

/// Mark the import failed and broadcast the terminal event.
///
/// Shared by the runner and the scheduler's fetch step. Best-effort on
/// both sides: a store or broadcast failure here is logged, never
/// propagated -- there is nothing left to abort.
pub(crate) async fn fail_import(ctx: &ImportContext, message: &str) {
    tracing::error!(import_id = ctx.import_id, error = message, "Import failed");

    if let Err(e) = ctx.store.mark_failed(ctx.import_id, message).await {
        tracing::error!(import_id = ctx.import_id, error = %e, "Failed to record import failure");
    }

    let snapshot = match ctx.store.find(ctx.import_id).await {
        Ok(Some(snapshot)) => snapshot,
        _ => ImportSnapshot {
            id: ctx.import_id,
            status: ImportStatus::Failed,
            progress: 0,
            total_rows: 0,
            error_message: Some(message.to_string()),
            file_name: None,
            created_at: Utc::now(),
        },
    };
    ctx.broadcaster.failed(&snapshot).await;
}

async fn process(ctx: &ImportContext) -> Result<(), PipelineError> {
    let id = ctx.import_id;

    let record = ctx
        .store
        .find(id)
        .await?
        .ok_or(PipelineError::NotFound(id))?;

    let file = ctx
        .store
        .load_file(id)
        .await?
        .ok_or(PipelineError::NotFound(id))?;
    let (file_name, data) = match (file.file_name, file.file_data) {
        (Some(name), Some(data)) => (name, data),
        _ => return Err(PipelineError::MissingFile),
    };

    // The whole file is read up front: the row total must be recorded
    // before the first row is attempted, and a malformed file must fail
    // the run without touching any user.
    let rows: Vec<RowMap> = RowSource::open(&file_name, data)?.collect::<Result<_, _>>()?;
    let total = rows.len() as i32;
    ctx.store.update_progress(id, 0, Some(total)).await?;

    let mut snapshot = ImportSnapshot {
        id,
        status: ImportStatus::Processing,
        progress: 0,
        total_rows: total,
        error_message: None,
        file_name: Some(file_name),
        created_at: record.created_at,
    };
    ctx.broadcaster.started(&snapshot).await;

    let mut counters = RowCounters::default();
    for (batch_index, batch) in rows.chunks(BATCH_SIZE).enumerate() {
        for (offset, row) in batch.iter().enumerate() {
            let data_index = batch_index * BATCH_SIZE + offset;
            let outcome = materialize_row(ctx.directory.as_ref(), row, data_index).await;
            counters.record(&outcome);

            snapshot.progress = data_index as i32 + 1;
            ctx.store.update_progress(id, snapshot.progress, None).await?;
        }

        ctx.batch_delay.pause().await;
        ctx.broadcaster.progress(&snapshot, &counters).await;
    }

    let summary = counters.error_summary();
    ctx.store.mark_completed(id, summary.as_deref()).await?;

    tracing::info!(
        import_id = id,
        total,
        successful = counters.successful,
        failed = counters.failed,
        "Import completed"
    );

    snapshot.status = ImportStatus::Completed;
    snapshot.progress = total;
    snapshot.error_message = summary;
    ctx.broadcaster.completed(&snapshot, &counters).await;

    Ok(())
}
