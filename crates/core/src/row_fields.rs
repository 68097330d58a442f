//! Field resolution and validation for imported user rows.
//!
//! Upload headers vary between exports ("email", "Email", "E-mail", …), so
//! each logical field carries an explicit ordered list of candidate keys.
//! Resolution takes the first candidate with a non-blank value; values are
//! trimmed of surrounding whitespace.

use std::collections::HashMap;

use validator::ValidateEmail;

use crate::roles::normalize_role;

/// One parsed file row: header cell → value cell.
pub type RowMap = HashMap<String, String>;

// ---------------------------------------------------------------------------
// Alias tables
// ---------------------------------------------------------------------------

/// Candidate headers for the user's full name, in resolution order.
pub const FULL_NAME_ALIASES: &[&str] = &["full_name", "name", "Full Name", "Nome Completo"];

/// Candidate headers for the email address.
pub const EMAIL_ALIASES: &[&str] = &["email", "Email", "E-mail"];

/// Candidate headers for the role.
pub const ROLE_ALIASES: &[&str] = &["role", "Role"];

/// Candidate headers for an optional plaintext password.
pub const PASSWORD_ALIASES: &[&str] = &["password", "Password"];

/// Candidate headers for an optional avatar URL.
pub const AVATAR_URL_ALIASES: &[&str] = &["avatar_url"];

/// Resolve a logical field: the first alias whose value is non-blank wins.
/// The returned value is trimmed.
pub fn resolve_field(row: &RowMap, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .filter_map(|key| row.get(*key))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Profile extraction
// ---------------------------------------------------------------------------

/// A row's resolved user fields, ready for create-or-update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowProfile {
    pub full_name: String,
    pub email: String,
    /// Lower-cased; defaults to `user` when the row names none.
    pub role: String,
    pub password: Option<String>,
    pub avatar_url: Option<String>,
}

/// Resolve and validate one row into a [`RowProfile`].
///
/// Validation order is fixed; the first failure wins and the returned
/// reason is row-scoped (the caller prefixes the row label):
///
/// 1. full name non-blank
/// 2. email non-blank
/// 3. email matches a standard address grammar
pub fn extract_profile(row: &RowMap) -> Result<RowProfile, String> {
    let full_name =
        resolve_field(row, FULL_NAME_ALIASES).ok_or_else(|| "Full name is required".to_string())?;

    let email = resolve_field(row, EMAIL_ALIASES).ok_or_else(|| "Email is required".to_string())?;
    if !email.validate_email() {
        return Err(format!("Email '{email}' has an invalid format"));
    }

    let role = normalize_role(resolve_field(row, ROLE_ALIASES).as_deref());

    Ok(RowProfile {
        full_name,
        email,
        role,
        password: resolve_field(row, PASSWORD_ALIASES),
        avatar_url: resolve_field(row, AVATAR_URL_ALIASES),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
