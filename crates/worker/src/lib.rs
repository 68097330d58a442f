//! Rollcall background worker library.
//!
//! Exposes the config and polling loop so integration tests and the binary
//! entrypoint can both access them.

pub mod config;
pub mod poll;

pub use config::WorkerConfig;
