use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Account lifecycle value. Only `Approved` users may generate plans.
///
/// Older users files may hold free-form statuses; those load as `Other`, are
/// written back unchanged, and never count as approved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(from = "String", into = "String")]
pub enum UserStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Other(String),
}

impl UserStatus {
    pub fn as_str(&self) -> &str {
        match self {
            UserStatus::Pending => "pending",
            UserStatus::Approved => "approved",
            UserStatus::Rejected => "rejected",
            UserStatus::Other(s) => s,
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses one of the three known statuses. Admin updates go through here, so
/// `Other` is never produced.
impl FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(UserStatus::Pending),
            "approved" => Ok(UserStatus::Approved),
            "rejected" => Ok(UserStatus::Rejected),
            other => Err(format!("unknown status {other:?}")),
        }
    }
}

impl From<String> for UserStatus {
    fn from(raw: String) -> Self {
        raw.parse().unwrap_or(UserStatus::Other(raw))
    }
}

impl From<UserStatus> for String {
    fn from(status: UserStatus) -> Self {
        match status {
            UserStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

/// User record as persisted in the users file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,                   // 16 hex chars
    pub name: String,
    pub email: String,                // stored lower-cased
    #[serde(alias = "password")]
    pub password_hash: String,        // Argon2 PHC string, or a legacy plaintext value
    pub plan: String,                 // business tier chosen at sign-up
    pub status: UserStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default)]
    pub session_token: Option<String>,
}

/// Whole contents of the users file: `{ "users": [...] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserCollection {
    #[serde(default)]
    pub users: Vec<User>,
}
