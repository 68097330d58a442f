//! Send-once credential generation for imported users.

use rand::Rng;

/// Length of a generated password in hex characters (64 bits of entropy).
pub const GENERATED_PASSWORD_LEN: usize = 16;

/// Generate a random send-once password: [`GENERATED_PASSWORD_LEN`]
/// lowercase hex characters from the thread-local CSPRNG.
///
/// Callers hand the value to a one-shot welcome notification and discard
/// it. It must never be logged or stored in clear; only its hash persists.
pub fn generate_password() -> String {
    let value: u64 = rand::rng().random();
    format!("{value:016x}")
}
