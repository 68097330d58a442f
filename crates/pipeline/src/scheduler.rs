//! Fire-and-forget scheduling of import runs.

use tokio::task::JoinHandle;

use crate::context::ImportContext;
use crate::fetch::fetch_and_attach;
use crate::runner::{fail_import, run_import};

/// Where the import's source file comes from.
#[derive(Debug, Clone)]
pub enum ImportSource {
    /// The file was attached when the import was created.
    Attached,
    /// Download from this URL first, then process.
    Url(String),
}

/// Schedule one import's background run.
///
/// Returns immediately; the creating path never blocks on row processing.
/// For URL sources the remote fetch runs first -- a fetch failure marks
/// the import failed and no rows are ever attempted. The returned handle
/// is only for callers that want to await the run (tests, shutdown).
pub fn schedule_import(ctx: ImportContext, source: ImportSource) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let ImportSource::Url(url) = &source {
            if let Err(e) = fetch_and_attach(ctx.store.as_ref(), ctx.import_id, url).await {
                fail_import(&ctx, &e.to_string()).await;
                return;
            }
        }
        run_import(&ctx).await;
    })
}
