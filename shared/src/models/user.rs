//! User Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder avatar for users without an uploaded picture
pub const DEFAULT_PROFILE_PIC: &str =
    "https://cdn-icons-png.flaticon.com/512/149/149071.png";

/// Account role, fixed at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Buys services
    Client,
    /// Sells services through gigs
    Freelancer,
}

impl UserRole {
    pub const fn as_str(&self) -> &'static str {
        match self {
            UserRole::Client => "client",
            UserRole::Freelancer => "freelancer",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "client" => Ok(UserRole::Client),
            "freelancer" => Ok(UserRole::Freelancer),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// User record as stored
///
/// Holds the credential hash; convert to [`UserProfile`] before it leaves the
/// server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    /// Lower-cased and trimmed, unique
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub skills: Vec<String>,
    pub profile_pic: String,
    /// Mean of public reviews, maintained by the review ledger
    #[serde(default)]
    pub rating: f64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    pub fn is_freelancer(&self) -> bool {
        self.role == UserRole::Freelancer
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile::from(self)
    }
}

/// Public view of a user (no credential hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub bio: String,
    pub skills: Vec<String>,
    pub profile_pic: String,
    pub rating: f64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            bio: user.bio.clone(),
            skills: user.skills.clone(),
            profile_pic: user.profile_pic.clone(),
            rating: user.rating,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Registration payload
///
/// `role` stays a string so an unknown value surfaces as a validation error
/// rather than a body rejection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
}

/// Profile update payload
///
/// `role`, `email` and `password` are accepted only to be rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub skills: Option<Vec<String>>,
    pub role: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login / registration result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Password reset request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetRequest {
    pub email: String,
}

/// OTP verification with the replacement password
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
    pub new_password: String,
}
