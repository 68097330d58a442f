//! Per-run context threaded through the pipeline stages.

use std::sync::Arc;
use std::time::Duration;

use rollcall_core::types::DbId;
use rollcall_events::ProgressBroadcaster;

use crate::directory::UserDirectory;
use crate::store::ImportStore;

/// Pause between batches.
///
/// `Disabled` in production; a fixed pause makes progress visible in local
/// development and lets tests slow a run down deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayStrategy {
    Disabled,
    Fixed(Duration),
}

impl DelayStrategy {
    /// Build from a millisecond setting; `0` disables the pause.
    pub fn from_millis(millis: u64) -> Self {
        if millis == 0 {
            Self::Disabled
        } else {
            Self::Fixed(Duration::from_millis(millis))
        }
    }

    pub async fn pause(&self) {
        if let Self::Fixed(duration) = self {
            tokio::time::sleep(*duration).await;
        }
    }
}

/// Everything one import run needs, passed explicitly instead of held in
/// ambient state. The task owning this context is the record's sole
/// mutator for the lifetime of the run.
pub struct ImportContext {
    pub import_id: DbId,
    pub store: Arc<dyn ImportStore>,
    pub directory: Arc<dyn UserDirectory>,
    pub broadcaster: ProgressBroadcaster,
    pub batch_delay: DelayStrategy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_millis_disables_the_pause() {
        assert_eq!(DelayStrategy::from_millis(0), DelayStrategy::Disabled);
    }

    #[test]
    fn nonzero_millis_sets_a_fixed_pause() {
        assert_eq!(
            DelayStrategy::from_millis(25),
            DelayStrategy::Fixed(Duration::from_millis(25))
        );
    }
}
