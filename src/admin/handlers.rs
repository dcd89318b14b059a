use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    admin::{
        dto::{AdminLoginRequest, OkResponse, UpdateUserStatusRequest, UsersResponse},
        extractors::AdminGuard,
        services,
    },
    error::AppError,
    state::AppState,
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/login", post(admin_login))
        .route("/admin/users", get(list_users))
        .route("/admin/update-user-status", post(update_user_status))
}

/// Only validates the password so the panel can unlock itself.
#[instrument(skip(state, payload))]
pub async fn admin_login(
    State(state): State<AppState>,
    payload: Result<Json<AdminLoginRequest>, JsonRejection>,
) -> Result<Json<OkResponse>, AppError> {
    let password = payload.map(|Json(p)| p.password).unwrap_or_default();
    services::validate_admin_secret(state.config.admin_password.as_deref(), password.as_deref())?;
    info!("admin logged in");
    Ok(Json(OkResponse { ok: true }))
}

#[instrument(skip(state, _guard))]
pub async fn list_users(
    State(state): State<AppState>,
    _guard: AdminGuard,
) -> Json<UsersResponse> {
    let users = services::list_users(&state.users).await;
    Json(UsersResponse { ok: true, users })
}

#[instrument(skip(state, _guard, payload))]
pub async fn update_user_status(
    State(state): State<AppState>,
    _guard: AdminGuard,
    payload: Result<Json<UpdateUserStatusRequest>, JsonRejection>,
) -> Result<Json<OkResponse>, AppError> {
    let Json(payload) = payload?;
    services::update_user_status(&state.users, payload.user_id, payload.status).await?;
    Ok(Json(OkResponse { ok: true }))
}
