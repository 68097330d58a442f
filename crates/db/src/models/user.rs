//! User entity model and DTOs.

use rollcall_core::types::{DbId, Timestamp};
use serde::Deserialize;
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- never serialize this directly to external
/// output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: DbId,
    pub avatar_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new user.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: DbId,
    pub avatar_url: Option<String>,
}

/// DTO for updating an existing user in place. All fields are optional;
/// the email itself is immutable through this path.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserProfile {
    pub full_name: Option<String>,
    pub role_id: Option<DbId>,
    pub avatar_url: Option<String>,
    pub password_hash: Option<String>,
}
