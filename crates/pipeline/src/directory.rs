//! The user-creation primitive behind the row materializer.
//!
//! [`UserDirectory`] is the seam to the user-management side of the
//! application: one call per row, create-or-update by exact email. Every
//! error it returns is row-scoped -- the materializer turns it into a
//! rejection reason and the run continues.

use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::Argon2;
use async_trait::async_trait;

use rollcall_core::bulk_import::RowOutcome;
use rollcall_core::credentials::generate_password;
use rollcall_core::row_fields::RowProfile;
use rollcall_db::models::user::{CreateUser, UpdateUserProfile};
use rollcall_db::repositories::{RoleRepo, UserRepo};
use rollcall_db::DbPool;

/// Create-or-update a user from one resolved row.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Returns [`RowOutcome::Created`] or [`RowOutcome::Updated`]; an `Err`
    /// is a row-scoped rejection reason.
    async fn create_or_update(&self, profile: &RowProfile) -> Result<RowOutcome, String>;
}

/// One-shot hand-off of a generated password to the welcome notification
/// channel (an external collaborator).
///
/// Implementations must treat the cleartext as send-once: deliver it and
/// drop it. It is never logged and never stored outside its hash.
#[async_trait]
pub trait WelcomeSink: Send + Sync {
    async fn welcome(&self, email: &str, full_name: &str, password: &str);
}

/// Default sink: the notification channel is wired elsewhere; generated
/// passwords are simply discarded.
pub struct NullWelcomeSink;

#[async_trait]
impl WelcomeSink for NullWelcomeSink {
    async fn welcome(&self, _email: &str, _full_name: &str, _password: &str) {}
}

/// PostgreSQL-backed [`UserDirectory`].
pub struct PgUserDirectory {
    pool: DbPool,
    welcome: Arc<dyn WelcomeSink>,
}

impl PgUserDirectory {
    pub fn new(pool: DbPool, welcome: Arc<dyn WelcomeSink>) -> Self {
        Self { pool, welcome }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn create_or_update(&self, profile: &RowProfile) -> Result<RowOutcome, String> {
        let role = RoleRepo::find_by_name(&self.pool, &profile.role)
            .await
            .map_err(|e| format!("Failed to look up role: {e}"))?
            .ok_or_else(|| format!("Unknown role '{}'", profile.role))?;

        let existing = UserRepo::find_by_email(&self.pool, &profile.email)
            .await
            .map_err(|e| format!("Failed to look up user: {e}"))?;

        match existing {
            Some(user) => {
                // Email is the identity here and stays untouched; a row
                // password replaces the stored hash, no password leaves it
                // unchanged.
                let password_hash = match &profile.password {
                    Some(password) => Some(hash_password(password)?),
                    None => None,
                };
                let update = UpdateUserProfile {
                    full_name: Some(profile.full_name.clone()),
                    role_id: Some(role.id),
                    avatar_url: profile.avatar_url.clone(),
                    password_hash,
                };
                UserRepo::update_profile(&self.pool, user.id, &update)
                    .await
                    .map_err(|e| format!("Failed to update user: {e}"))?;
                Ok(RowOutcome::Updated)
            }
            None => {
                let (password, generated) = match &profile.password {
                    Some(password) => (password.clone(), false),
                    None => (generate_password(), true),
                };
                let input = CreateUser {
                    full_name: profile.full_name.clone(),
                    email: profile.email.clone(),
                    password_hash: hash_password(&password)?,
                    role_id: role.id,
                    avatar_url: profile.avatar_url.clone(),
                };
                UserRepo::create(&self.pool, &input)
                    .await
                    .map_err(|e| format!("Failed to create user: {e}"))?;

                if generated {
                    self.welcome
                        .welcome(&profile.email, &profile.full_name, &password)
                        .await;
                }
                Ok(RowOutcome::Created)
            }
        }
    }
}

/// Hash a plaintext password using Argon2id with a random salt, returning
/// the PHC-formatted string.
fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| format!("Failed to hash password: {e}"))
}
