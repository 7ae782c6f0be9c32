//! Server-side records not shared with clients

use serde::{Deserialize, Serialize};

/// Pending password reset, one per email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordReset {
    pub email: String,
    /// Argon2 hash of the one-time code
    pub code_hash: String,
    pub expires_at: i64,
    #[serde(default)]
    pub attempts: u32,
    pub created_at: i64,
}

impl PasswordReset {
    pub fn is_expired(&self, now: i64) -> bool {
        now > self.expires_at
    }
}
