use std::time::Duration;

use rollcall_pipeline::DelayStrategy;

/// Worker configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// How often the claim loop scans for pending imports.
    pub poll_interval: Duration,
    /// Pause between row batches. Disabled by default; a nonzero value is
    /// a development aid for watching progress, never a production
    /// setting.
    pub batch_delay: DelayStrategy,
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default |
    /// |-----------------------------|---------|
    /// | `WORKER_POLL_INTERVAL_SECS` | `2`     |
    /// | `IMPORT_BATCH_DELAY_MS`     | `0`     |
    pub fn from_env() -> Self {
        let poll_secs: u64 = std::env::var("WORKER_POLL_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2);

        let delay_ms: u64 = std::env::var("IMPORT_BATCH_DELAY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);

        Self {
            poll_interval: Duration::from_secs(poll_secs),
            batch_delay: DelayStrategy::from_millis(delay_ms),
        }
    }
}
