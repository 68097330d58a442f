//! Rollcall event bus and progress broadcasting.
//!
//! This crate provides the publish/subscribe transport for the bulk import
//! pipeline:
//!
//! - [`EventBus`] — in-process topic-keyed publish/subscribe hub backed by
//!   `tokio::sync::broadcast` channels.
//! - [`ImportEvent`] — the event envelope delivered to subscribers.
//! - [`ProgressBroadcaster`] — fans import lifecycle events out to a
//!   per-import topic and a throttled aggregate topic.

pub mod bus;
pub mod progress;

pub use bus::{EventBus, ImportEvent};
pub use progress::{import_topic, ImportSnapshot, ProgressBroadcaster, AGGREGATE_TOPIC};
