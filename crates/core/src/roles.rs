//! Well-known role name constants.
//!
//! These must match the seed data in the `roles` table migration.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// Role assigned to imported rows that do not name one.
pub const DEFAULT_ROLE: &str = ROLE_USER;

/// Normalize a raw role cell: trimmed and lower-cased, falling back to
/// [`DEFAULT_ROLE`] when absent or blank.
pub fn normalize_role(raw: Option<&str>) -> String {
    match raw {
        Some(value) if !value.trim().is_empty() => value.trim().to_lowercase(),
        _ => DEFAULT_ROLE.to_string(),
    }
}
