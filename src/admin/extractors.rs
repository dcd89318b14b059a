use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use super::services::validate_admin_secret;
use crate::{error::AppError, state::AppState};

pub const ADMIN_HEADER: &str = "x-admin-secret";

/// Guard for admin routes: the `x-admin-secret` header must equal the
/// configured admin password.
pub struct AdminGuard;

#[async_trait]
impl FromRequestParts<AppState> for AdminGuard {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let supplied = parts
            .headers
            .get(ADMIN_HEADER)
            .and_then(|h| h.to_str().ok());

        validate_admin_secret(state.config.admin_password.as_deref(), supplied)?;
        Ok(AdminGuard)
    }
}
