//! The Rollcall bulk user import pipeline.
//!
//! A scheduled import runs as one background task that owns its record for
//! the whole run:
//!
//! 1. [`scheduler::schedule_import`] spawns the task (optionally running
//!    the [`fetch`] helper first for URL-created imports).
//! 2. [`runner`] claims the record, parses the attached file through
//!    [`rows::RowSource`], and drives every row through
//!    [`materializer::materialize_row`] in fixed-size batches, persisting
//!    progress after each row via the [`store::ImportStore`] seam.
//! 3. Lifecycle and progress events fan out through
//!    `rollcall_events::ProgressBroadcaster`.
//!
//! Row-level failures are isolated and counted; only pipeline-level errors
//! (unsupported file type, unreadable file, storage failures) abort a run.

pub mod context;
pub mod directory;
pub mod error;
pub mod fetch;
pub mod materializer;
pub mod rows;
pub mod runner;
pub mod scheduler;
pub mod store;

pub use context::{DelayStrategy, ImportContext};
pub use error::PipelineError;
pub use scheduler::{schedule_import, ImportSource};
