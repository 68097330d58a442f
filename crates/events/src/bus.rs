//! In-process topic-keyed event bus backed by `tokio::sync::broadcast`
//! channels.
//!
//! [`EventBus`] maps topic names to broadcast senders. Publishing is
//! fire-and-forget: a topic with no subscribers drops the event, and a
//! slow subscriber that falls more than the channel capacity behind
//! observes `RecvError::Lagged` rather than blocking the publisher.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};

// ---------------------------------------------------------------------------
// ImportEvent
// ---------------------------------------------------------------------------

/// An event delivered on an import topic.
///
/// Serializes as `{ "type": ..., "topic": ..., "data": ..., "timestamp": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportEvent {
    /// Event name: `started`, `progress_update`, `completed`, or `failed`.
    #[serde(rename = "type")]
    pub event_type: String,

    /// The topic this event was published on. Filled in by the bus.
    pub topic: String,

    /// Event payload.
    #[serde(rename = "data")]
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl ImportEvent {
    /// Create a new event with an empty payload.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            topic: String::new(),
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Set the payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default per-topic buffer capacity.
const DEFAULT_CAPACITY: usize = 256;

/// In-process topic-keyed fan-out bus.
///
/// Designed to be shared via `Arc<EventBus>`. Topics are created lazily on
/// first subscribe; publishing to a topic nobody subscribed to is a no-op.
pub struct EventBus {
    capacity: usize,
    topics: RwLock<HashMap<String, broadcast::Sender<ImportEvent>>>,
}

impl EventBus {
    /// Create a bus with a specific per-topic channel capacity.
    ///
    /// When a topic buffer is full, the oldest un-consumed messages are
    /// dropped and slow receivers observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            topics: RwLock::new(HashMap::new()),
        }
    }

    /// Publish an event to all current subscribers of `topic`.
    ///
    /// Never blocks on delivery. If the topic has no subscribers the event
    /// is silently dropped; the durable import record remains the source
    /// of truth for observers that missed it.
    pub async fn publish(&self, topic: &str, mut event: ImportEvent) {
        event.topic = topic.to_string();

        let dead = {
            let topics = self.topics.read().await;
            match topics.get(topic) {
                // SendError only means there are zero receivers left.
                Some(sender) => sender.send(event).is_err(),
                None => false,
            }
        };

        // Drop the sender once its last receiver is gone so finished
        // imports do not accumulate topic entries forever.
        if dead {
            let mut topics = self.topics.write().await;
            if let Some(sender) = topics.get(topic) {
                if sender.receiver_count() == 0 {
                    topics.remove(topic);
                }
            }
        }
    }

    /// Subscribe to all events published on `topic`.
    ///
    /// The topic channel is created on first subscription.
    pub async fn subscribe(&self, topic: &str) -> broadcast::Receiver<ImportEvent> {
        let mut topics = self.topics.write().await;
        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Number of topics with a live channel.
    pub async fn topic_count(&self) -> usize {
        self.topics.read().await.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
