use tracing::{info, warn};

use crate::{
    admin::dto::AdminUserView,
    auth::{password::constant_time_eq, repo::UserStatus},
    error::AppError,
    storage::UserStore,
};

pub const ADMIN_PASSWORD_SETTING: &str = "ADMIN_PASSWORD";

/// Checks a supplied admin secret against the configured one.
pub fn validate_admin_secret(
    configured: Option<&str>,
    supplied: Option<&str>,
) -> Result<(), AppError> {
    let Some(configured) = configured.filter(|s| !s.is_empty()) else {
        return Err(AppError::Config(ADMIN_PASSWORD_SETTING.into()));
    };
    match supplied {
        Some(supplied) if constant_time_eq(configured, supplied) => Ok(()),
        _ => {
            warn!("invalid admin secret");
            Err(AppError::Unauthorized("Invalid admin password".into()))
        }
    }
}

pub async fn list_users(store: &UserStore) -> Vec<AdminUserView> {
    store
        .read(|users| users.users.iter().map(AdminUserView::from).collect())
        .await
}

/// Overwrites a user's status. Any transition is allowed.
pub async fn update_user_status(
    store: &UserStore,
    user_id: Option<String>,
    status: Option<String>,
) -> Result<(), AppError> {
    let user_id = user_id.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let status = status.filter(|s| !s.trim().is_empty());
    let (Some(user_id), Some(status)) = (user_id, status) else {
        return Err(AppError::Validation("userId and status are required".into()));
    };
    let status: UserStatus = status.parse().map_err(AppError::Validation)?;

    let previous = store
        .mutate(|users| {
            let user = users
                .find_by_id_mut(&user_id)
                .ok_or_else(|| AppError::NotFound("User not found".into()))?;
            Ok(std::mem::replace(&mut user.status, status.clone()))
        })
        .await?;

    info!(%user_id, from = %previous, to = %status, "user status updated");
    Ok(())
}
