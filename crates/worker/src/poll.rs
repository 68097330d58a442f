//! Polling claim loop for pending imports.
//!
//! Each tick scans for pending imports that already have a file attached
//! and schedules a run for each. The runner's atomic claim makes this
//! loop safe to race against any other scheduler of the same import: the
//! loser of the claim backs off without touching the record.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use rollcall_core::types::DbId;
use rollcall_db::repositories::BulkImportRepo;
use rollcall_db::DbPool;
use rollcall_events::{EventBus, ProgressBroadcaster};
use rollcall_pipeline::directory::{NullWelcomeSink, PgUserDirectory};
use rollcall_pipeline::store::PgImportStore;
use rollcall_pipeline::{schedule_import, ImportContext, ImportSource};

use crate::config::WorkerConfig;

/// Run the claim loop until `cancel` is triggered.
pub async fn run(pool: DbPool, bus: Arc<EventBus>, config: WorkerConfig, cancel: CancellationToken) {
    tracing::info!(
        poll_interval_secs = config.poll_interval.as_secs(),
        "Import worker started"
    );

    let mut interval = tokio::time::interval(config.poll_interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Import worker stopping");
                break;
            }
            _ = interval.tick() => {
                match BulkImportRepo::list_pending(&pool).await {
                    Ok(ids) => {
                        for id in ids {
                            tracing::debug!(import_id = id, "Scheduling pending import");
                            let ctx = build_context(&pool, &bus, &config, id);
                            // Fire-and-forget; the claim arbitrates duplicates.
                            let _ = schedule_import(ctx, ImportSource::Attached);
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to list pending imports");
                    }
                }
            }
        }
    }
}

/// Assemble the per-run context for one import.
pub fn build_context(
    pool: &DbPool,
    bus: &Arc<EventBus>,
    config: &WorkerConfig,
    import_id: DbId,
) -> ImportContext {
    ImportContext {
        import_id,
        store: Arc::new(PgImportStore::new(pool.clone())),
        directory: Arc::new(PgUserDirectory::new(
            pool.clone(),
            Arc::new(NullWelcomeSink),
        )),
        broadcaster: ProgressBroadcaster::new(Arc::clone(bus)),
        batch_delay: config.batch_delay,
    }
}
