use serde::{Deserialize, Serialize};

use crate::auth::repo_types::{User, UserStatus};

/// Request body for user registration. Fields are optional so a missing one
/// is reported as a validation error instead of a body rejection.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub plan: Option<String>,
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub ok: bool,
    pub message: String,
}

/// Public part of the user returned to the client.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PublicUser {
    pub name: String,
    pub email: String,
    pub plan: String,
    pub status: UserStatus,
}

impl From<&User> for PublicUser {
    fn from(u: &User) -> Self {
        Self {
            name: u.name.clone(),
            email: u.email.clone(),
            plan: u.plan.clone(),
            status: u.status.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub ok: bool,
    pub token: String,
    #[serde(flatten)]
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub user: PublicUser,
}
