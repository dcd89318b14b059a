use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use super::{repo::User, services::authenticate};
use crate::{error::AppError, state::AppState};

pub const SESSION_HEADER: &str = "x-session-token";

/// Resolves the `x-session-token` header to an approved user.
pub struct SessionUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|h| h.to_str().ok());

        authenticate(&state.users, token).await.map(SessionUser)
    }
}
