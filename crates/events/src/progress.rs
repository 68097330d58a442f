//! Two-tier progress broadcasting for bulk imports.
//!
//! Every event goes to the import's own topic. The shared aggregate topic
//! (dashboard consumers watching all imports) receives `started` and
//! terminal events unconditionally but only sees `progress_update` at
//! exact multiples of 10 percent, bounding its volume per import.

use std::sync::Arc;

use serde_json::json;

use rollcall_core::bulk_import::{percentage, should_broadcast_aggregate, ImportStatus, RowCounters};
use rollcall_core::types::{DbId, Timestamp};

use crate::bus::{EventBus, ImportEvent};

/// Shared topic carrying throttled events for every import.
pub const AGGREGATE_TOPIC: &str = "admin_imports";

/// Topic name scoped to a single import.
pub fn import_topic(id: DbId) -> String {
    format!("import_{id}")
}

/// The externally visible state of one import at a point in time.
///
/// Broadcast payloads are built from this snapshot, so subscribers and
/// pollers of the persisted record observe the same fields.
#[derive(Debug, Clone)]
pub struct ImportSnapshot {
    pub id: DbId,
    pub status: ImportStatus,
    pub progress: i32,
    pub total_rows: i32,
    pub error_message: Option<String>,
    pub file_name: Option<String>,
    pub created_at: Timestamp,
}

/// Publishes import lifecycle events to the per-import and aggregate
/// topics.
#[derive(Clone)]
pub struct ProgressBroadcaster {
    bus: Arc<EventBus>,
}

impl ProgressBroadcaster {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }

    /// Processing has begun; the row total is known.
    pub async fn started(&self, snapshot: &ImportSnapshot) {
        self.publish_both("started", snapshot, None).await;
    }

    /// A batch finished. The per-import topic always receives this; the
    /// aggregate topic only at multiples of 10 percent.
    pub async fn progress(&self, snapshot: &ImportSnapshot, counters: &RowCounters) {
        let payload = payload(snapshot, Some(counters));
        let event = ImportEvent::new("progress_update").with_payload(payload.clone());
        self.bus.publish(&import_topic(snapshot.id), event).await;

        if should_broadcast_aggregate(percentage(snapshot.progress, snapshot.total_rows)) {
            self.publish_aggregate("progress_update", snapshot, payload)
                .await;
        }
    }

    /// All rows were attempted (partial failures included).
    pub async fn completed(&self, snapshot: &ImportSnapshot, counters: &RowCounters) {
        self.publish_both("completed", snapshot, Some(counters)).await;
    }

    /// The run was aborted by a pipeline-level error.
    pub async fn failed(&self, snapshot: &ImportSnapshot) {
        self.publish_both("failed", snapshot, None).await;
    }

    async fn publish_both(
        &self,
        event_type: &str,
        snapshot: &ImportSnapshot,
        counters: Option<&RowCounters>,
    ) {
        let payload = payload(snapshot, counters);
        let event = ImportEvent::new(event_type).with_payload(payload.clone());
        self.bus.publish(&import_topic(snapshot.id), event).await;
        self.publish_aggregate(event_type, snapshot, payload).await;
    }

    async fn publish_aggregate(
        &self,
        event_type: &str,
        snapshot: &ImportSnapshot,
        mut payload: serde_json::Value,
    ) {
        // Aggregate consumers get the per-import topic name so a generic
        // dashboard can deep-link into the granular stream.
        payload["import_topic"] = json!(import_topic(snapshot.id));
        let event = ImportEvent::new(event_type).with_payload(payload);
        self.bus.publish(AGGREGATE_TOPIC, event).await;
    }
}

/// Build the `data` payload for an event.
fn payload(snapshot: &ImportSnapshot, counters: Option<&RowCounters>) -> serde_json::Value {
    let mut data = json!({
        "id": snapshot.id,
        "status": snapshot.status,
        "progress": snapshot.progress,
        "total_rows": snapshot.total_rows,
        "percentage": percentage(snapshot.progress, snapshot.total_rows),
        "error_message": snapshot.error_message,
        "file_name": snapshot.file_name,
        "created_at": snapshot.created_at,
    });
    if let Some(counters) = counters {
        data["successful_imports"] = json!(counters.successful);
        data["failed_imports"] = json!(counters.failed);
        data["recent_errors"] = json!(counters.recent_errors());
    }
    data
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    use rollcall_core::bulk_import::RowOutcome;

    fn snapshot(progress: i32, total: i32) -> ImportSnapshot {
        ImportSnapshot {
            id: 42,
            status: ImportStatus::Processing,
            progress,
            total_rows: total,
            error_message: None,
            file_name: Some("team.csv".to_string()),
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn started_reaches_both_topics() {
        let bus = Arc::new(EventBus::default());
        let broadcaster = ProgressBroadcaster::new(Arc::clone(&bus));
        let mut per_import = bus.subscribe(&import_topic(42)).await;
        let mut aggregate = bus.subscribe(AGGREGATE_TOPIC).await;

        broadcaster.started(&snapshot(0, 20)).await;

        assert_eq!(per_import.recv().await.unwrap().event_type, "started");
        let agg = aggregate.recv().await.unwrap();
        assert_eq!(agg.event_type, "started");
        assert_eq!(agg.payload["import_topic"], "import_42");
    }

    #[tokio::test]
    async fn progress_between_multiples_stays_per_import() {
        let bus = Arc::new(EventBus::default());
        let broadcaster = ProgressBroadcaster::new(Arc::clone(&bus));
        let mut per_import = bus.subscribe(&import_topic(42)).await;
        let mut aggregate = bus.subscribe(AGGREGATE_TOPIC).await;

        // 7 of 9 rows -> 78 percent: per-import only.
        broadcaster
            .progress(&snapshot(7, 9), &RowCounters::default())
            .await;

        let event = per_import.recv().await.unwrap();
        assert_eq!(event.event_type, "progress_update");
        assert_eq!(event.payload["percentage"], 78);
        assert!(aggregate.try_recv().is_err());
    }

    #[tokio::test]
    async fn progress_at_multiple_of_ten_reaches_aggregate() {
        let bus = Arc::new(EventBus::default());
        let broadcaster = ProgressBroadcaster::new(Arc::clone(&bus));
        let mut aggregate = bus.subscribe(AGGREGATE_TOPIC).await;

        // 10 of 25 rows -> exactly 40 percent.
        broadcaster
            .progress(&snapshot(10, 25), &RowCounters::default())
            .await;

        let event = aggregate.recv().await.unwrap();
        assert_eq!(event.payload["percentage"], 40);
        assert_eq!(event.payload["import_topic"], "import_42");
    }

    #[tokio::test]
    async fn completed_carries_counters_and_summary() {
        let bus = Arc::new(EventBus::default());
        let broadcaster = ProgressBroadcaster::new(Arc::clone(&bus));
        let mut per_import = bus.subscribe(&import_topic(42)).await;

        let mut counters = RowCounters::default();
        counters.record(&RowOutcome::Created);
        counters.record(&RowOutcome::Rejected("Row 3: Email is required".into()));

        let mut s = snapshot(2, 2);
        s.status = ImportStatus::Completed;
        s.error_message = counters.error_summary();
        broadcaster.completed(&s, &counters).await;

        let event = per_import.recv().await.unwrap();
        assert_eq!(event.event_type, "completed");
        assert_eq!(event.payload["status"], "completed");
        assert_eq!(event.payload["successful_imports"], 1);
        assert_eq!(event.payload["failed_imports"], 1);
        assert_eq!(event.payload["recent_errors"][0], "Row 3: Email is required");
        assert!(event.payload["error_message"]
            .as_str()
            .unwrap()
            .contains("1 errors"));
    }

    #[tokio::test]
    async fn failed_reaches_both_topics_without_counters() {
        let bus = Arc::new(EventBus::default());
        let broadcaster = ProgressBroadcaster::new(Arc::clone(&bus));
        let mut per_import = bus.subscribe(&import_topic(42)).await;
        let mut aggregate = bus.subscribe(AGGREGATE_TOPIC).await;

        let mut s = snapshot(0, 0);
        s.status = ImportStatus::Failed;
        s.error_message = Some("Unsupported file type: '.txt'".to_string());
        broadcaster.failed(&s).await;

        let event = per_import.recv().await.unwrap();
        assert_eq!(event.event_type, "failed");
        assert!(event.payload.get("successful_imports").is_none());
        assert_eq!(aggregate.recv().await.unwrap().event_type, "failed");
    }
}
