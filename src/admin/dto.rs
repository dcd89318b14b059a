use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::repo::{User, UserStatus};

#[derive(Debug, Default, Deserialize)]
pub struct AdminLoginRequest {
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserStatusRequest {
    pub user_id: Option<String>,
    pub status: Option<String>,
}

/// A user as shown in the admin panel, without credentials.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub plan: String,
    pub status: UserStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&User> for AdminUserView {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.clone(),
            name: u.name.clone(),
            email: u.email.clone(),
            plan: u.plan.clone(),
            status: u.status.clone(),
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub ok: bool,
    pub users: Vec<AdminUserView>,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}
