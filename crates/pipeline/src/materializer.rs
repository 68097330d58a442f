//! Row materialization: one parsed row in, one row outcome out.

use rollcall_core::bulk_import::{row_label, RowOutcome};
use rollcall_core::row_fields::{extract_profile, RowMap};

use crate::directory::UserDirectory;

/// Materialize one row: resolve and validate its fields, then hand the
/// profile to the user directory.
///
/// Never fails the run. Every failure path -- missing or malformed fields,
/// a directory rejection -- collapses into [`RowOutcome::Rejected`] with a
/// reason prefixed by the row's position in the file (`data_index` is
/// zero-based over data rows; the header row is counted in the label).
pub async fn materialize_row(
    directory: &dyn UserDirectory,
    row: &RowMap,
    data_index: usize,
) -> RowOutcome {
    let label = row_label(data_index);

    let profile = match extract_profile(row) {
        Ok(profile) => profile,
        Err(reason) => return RowOutcome::Rejected(format!("{label}: {reason}")),
    };

    match directory.create_or_update(&profile).await {
        Ok(outcome) => outcome,
        Err(reason) => RowOutcome::Rejected(format!("{label}: {reason}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use rollcall_core::row_fields::RowProfile;

    /// Directory that accepts everything and records nothing.
    struct AcceptAll;

    #[async_trait]
    impl UserDirectory for AcceptAll {
        async fn create_or_update(&self, _profile: &RowProfile) -> Result<RowOutcome, String> {
            Ok(RowOutcome::Created)
        }
    }

    /// Directory that rejects every profile with a fixed reason.
    struct RejectAll;

    #[async_trait]
    impl UserDirectory for RejectAll {
        async fn create_or_update(&self, _profile: &RowProfile) -> Result<RowOutcome, String> {
            Err("Email has already been taken".to_string())
        }
    }

    fn row(pairs: &[(&str, &str)]) -> RowMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn valid_row_materializes() {
        let outcome = materialize_row(
            &AcceptAll,
            &row(&[("name", "Alice"), ("email", "alice@example.com")]),
            0,
        )
        .await;
        assert_eq!(outcome, RowOutcome::Created);
    }

    #[tokio::test]
    async fn validation_failure_is_labeled_with_file_position() {
        let outcome = materialize_row(&AcceptAll, &row(&[("name", "Alice")]), 3).await;
        assert_eq!(
            outcome,
            RowOutcome::Rejected("Row 5: Email is required".to_string())
        );
    }

    #[tokio::test]
    async fn directory_rejection_is_labeled_too() {
        let outcome = materialize_row(
            &RejectAll,
            &row(&[("name", "Alice"), ("email", "alice@example.com")]),
            0,
        )
        .await;
        assert_eq!(
            outcome,
            RowOutcome::Rejected("Row 2: Email has already been taken".to_string())
        );
    }
}
