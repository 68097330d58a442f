//! Core types, constants, and pure logic for the bulk user import pipeline.
//!
//! This module has zero external dependencies (no DB, no async, no I/O).
//! It provides:
//!
//! - The import status enum with string conversions and transition checks
//! - Batch sizing and error-retention constants
//! - Percentage derivation and the aggregate-topic throttling rule
//! - Per-row outcome and the running counters a run accumulates

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Rows processed between two progress broadcasts.
pub const BATCH_SIZE: usize = 10;

/// How many of the most recent rejection reasons are kept for broadcast
/// payloads. This bounds payload size, not processing.
pub const RECENT_ERRORS_LIMIT: usize = 5;

/// How many of the earliest rejection reasons appear in the final error
/// summary.
pub const SUMMARY_ERRORS_LIMIT: usize = 3;

/// Delimited-text file extensions.
pub const CSV_EXTENSIONS: &[&str] = &["csv"];

/// Spreadsheet file extensions (sheet zero is read).
pub const SHEET_EXTENSIONS: &[&str] = &["xlsx", "xls"];

/// All file extensions the row source accepts.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["csv", "xlsx", "xls"];

/// Returns `true` if the extension is one the row source can parse.
pub fn is_supported_extension(extension: &str) -> bool {
    SUPPORTED_EXTENSIONS.contains(&extension.to_lowercase().as_str())
}

// ---------------------------------------------------------------------------
// Import status
// ---------------------------------------------------------------------------

/// Lifecycle status of a bulk import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ImportStatus {
    /// Return the status name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parse a status string. Returns `None` for unknown values.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// All valid status values.
    pub const ALL: &'static [&'static str] = &["pending", "processing", "completed", "failed"];

    /// Returns `true` once no further transition is allowed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether `next` is a legal forward transition from `self`.
    ///
    /// `pending` may move to `processing`, or straight to `failed` when the
    /// remote fetch fails before any row is read. `processing` may reach
    /// either terminal state. Terminal states never transition.
    pub fn can_transition_to(&self, next: ImportStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Pending, Self::Failed)
                | (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Failed)
        )
    }
}

impl std::fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Progress derivation
// ---------------------------------------------------------------------------

/// Percentage of rows processed, rounded to the nearest integer.
///
/// Zero while `total_rows` is unknown (0).
pub fn percentage(progress: i32, total_rows: i32) -> i32 {
    if total_rows <= 0 {
        return 0;
    }
    ((progress as f64 / total_rows as f64) * 100.0).round() as i32
}

/// Aggregate-topic throttling rule: a progress update is fanned out to the
/// shared topic only at exact multiples of 10 percent (or at 100). This
/// caps aggregate volume at ~11 messages per import regardless of row
/// count; the per-import topic stays fully granular.
pub fn should_broadcast_aggregate(percentage: i32) -> bool {
    percentage % 10 == 0 || percentage == 100
}

/// Label for a data row in rejection reasons. `data_index` is zero-based
/// over data rows; the header row is counted, so the first data row is
/// `Row 2`.
pub fn row_label(data_index: usize) -> String {
    format!("Row {}", data_index + 2)
}

// ---------------------------------------------------------------------------
// Row outcomes and counters
// ---------------------------------------------------------------------------

/// The result of materializing one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    /// A new user was created.
    Created,
    /// An existing user (matched by email) was updated.
    Updated,
    /// The row was rejected; processing continues with the next row.
    Rejected(String),
}

/// Running counters accumulated over one import run.
///
/// Keeps the earliest rejections for the final summary and the most recent
/// ones (bounded) for broadcast payloads.
#[derive(Debug, Clone, Default)]
pub struct RowCounters {
    pub successful: i32,
    pub failed: i32,
    first_errors: Vec<String>,
    recent_errors: Vec<String>,
}

impl RowCounters {
    /// Fold one row outcome into the counters.
    pub fn record(&mut self, outcome: &RowOutcome) {
        match outcome {
            RowOutcome::Created | RowOutcome::Updated => self.successful += 1,
            RowOutcome::Rejected(reason) => {
                self.failed += 1;
                if self.first_errors.len() < SUMMARY_ERRORS_LIMIT {
                    self.first_errors.push(reason.clone());
                }
                self.recent_errors.push(reason.clone());
                if self.recent_errors.len() > RECENT_ERRORS_LIMIT {
                    self.recent_errors.remove(0);
                }
            }
        }
    }

    /// The most recent rejection reasons, oldest first, at most
    /// [`RECENT_ERRORS_LIMIT`] entries.
    pub fn recent_errors(&self) -> &[String] {
        &self.recent_errors
    }

    /// Final error summary, present only when at least one row failed:
    /// the failure count plus the first [`SUMMARY_ERRORS_LIMIT`] reasons.
    pub fn error_summary(&self) -> Option<String> {
        if self.failed == 0 {
            return None;
        }
        Some(format!(
            "{} errors while importing rows. First failures: {}",
            self.failed,
            self.first_errors.join("; ")
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- ImportStatus tests ---------------------------------------------------

    #[test]
    fn status_round_trip() {
        for s in ImportStatus::ALL {
            let status = ImportStatus::from_str(s).unwrap();
            assert_eq!(status.as_str(), *s);
        }
    }

    #[test]
    fn status_unknown_returns_none() {
        assert!(ImportStatus::from_str("cancelled").is_none());
    }

    #[test]
    fn status_display_matches_as_str() {
        assert_eq!(format!("{}", ImportStatus::Processing), "processing");
    }

    #[test]
    fn forward_transitions_allowed() {
        assert!(ImportStatus::Pending.can_transition_to(ImportStatus::Processing));
        assert!(ImportStatus::Pending.can_transition_to(ImportStatus::Failed));
        assert!(ImportStatus::Processing.can_transition_to(ImportStatus::Completed));
        assert!(ImportStatus::Processing.can_transition_to(ImportStatus::Failed));
    }

    #[test]
    fn terminal_states_never_transition() {
        for next in [
            ImportStatus::Pending,
            ImportStatus::Processing,
            ImportStatus::Completed,
            ImportStatus::Failed,
        ] {
            assert!(!ImportStatus::Completed.can_transition_to(next));
            assert!(!ImportStatus::Failed.can_transition_to(next));
        }
    }

    #[test]
    fn no_backward_transitions() {
        assert!(!ImportStatus::Processing.can_transition_to(ImportStatus::Pending));
        assert!(!ImportStatus::Pending.can_transition_to(ImportStatus::Completed));
    }

    #[test]
    fn terminal_flags() {
        assert!(ImportStatus::Completed.is_terminal());
        assert!(ImportStatus::Failed.is_terminal());
        assert!(!ImportStatus::Pending.is_terminal());
        assert!(!ImportStatus::Processing.is_terminal());
    }

    // -- extension tests ------------------------------------------------------

    #[test]
    fn supported_extensions() {
        assert!(is_supported_extension("csv"));
        assert!(is_supported_extension("xlsx"));
        assert!(is_supported_extension("xls"));
        assert!(is_supported_extension("CSV")); // case-insensitive
    }

    #[test]
    fn unsupported_extensions() {
        assert!(!is_supported_extension("txt"));
        assert!(!is_supported_extension("pdf"));
        assert!(!is_supported_extension(""));
    }

    // -- percentage tests -----------------------------------------------------

    #[test]
    fn percentage_is_zero_before_total_known() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(5, 0), 0);
    }

    #[test]
    fn percentage_rounds_to_nearest() {
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13);
    }

    #[test]
    fn percentage_full() {
        assert_eq!(percentage(25, 25), 100);
    }

    // -- throttle tests -------------------------------------------------------

    #[test]
    fn aggregate_broadcast_at_multiples_of_ten() {
        for pct in [0, 10, 20, 30, 40, 50, 60, 70, 80, 90, 100] {
            assert!(should_broadcast_aggregate(pct), "pct: {pct}");
        }
    }

    #[test]
    fn aggregate_broadcast_suppressed_between_multiples() {
        for pct in [1, 5, 13, 47, 83, 99] {
            assert!(!should_broadcast_aggregate(pct), "pct: {pct}");
        }
    }

    // -- row_label tests ------------------------------------------------------

    #[test]
    fn row_label_counts_header_row() {
        assert_eq!(row_label(0), "Row 2");
        assert_eq!(row_label(3), "Row 5");
    }

    // -- RowCounters tests ----------------------------------------------------

    #[test]
    fn counters_tally_outcomes() {
        let mut counters = RowCounters::default();
        counters.record(&RowOutcome::Created);
        counters.record(&RowOutcome::Updated);
        counters.record(&RowOutcome::Rejected("Row 2: Email is required".into()));

        assert_eq!(counters.successful, 2);
        assert_eq!(counters.failed, 1);
        assert_eq!(counters.recent_errors().len(), 1);
    }

    #[test]
    fn recent_errors_bounded_to_most_recent_five() {
        let mut counters = RowCounters::default();
        for i in 0..8 {
            counters.record(&RowOutcome::Rejected(format!("Row {}: bad", i + 2)));
        }

        let recent = counters.recent_errors();
        assert_eq!(recent.len(), RECENT_ERRORS_LIMIT);
        // Oldest three dropped; entries stay in production order.
        assert_eq!(recent[0], "Row 5: bad");
        assert_eq!(recent[4], "Row 9: bad");
    }

    #[test]
    fn no_summary_without_failures() {
        let mut counters = RowCounters::default();
        counters.record(&RowOutcome::Created);
        assert!(counters.error_summary().is_none());
    }

    #[test]
    fn summary_counts_failures_and_keeps_first_three() {
        let mut counters = RowCounters::default();
        for i in 0..5 {
            counters.record(&RowOutcome::Rejected(format!("Row {}: bad", i + 2)));
        }

        let summary = counters.error_summary().unwrap();
        assert!(summary.contains("5 errors"));
        assert!(summary.contains("Row 2: bad"));
        assert!(summary.contains("Row 4: bad"));
        assert!(!summary.contains("Row 5: bad"));
    }

    #[test]
    fn summary_mentions_single_error() {
        let mut counters = RowCounters::default();
        counters.record(&RowOutcome::Rejected("Row 3: Email is required".into()));

        let summary = counters.error_summary().unwrap();
        assert!(summary.contains("1 errors"));
        assert!(summary.contains("Row 3: Email is required"));
    }
}
