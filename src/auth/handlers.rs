use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, MeResponse, PublicUser, RegisterRequest, RegisterResponse},
        extractors::SessionUser,
        services,
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<RegisterResponse>, AppError> {
    let Json(payload) = payload?;
    let message = services::register(&state.users, payload).await?;
    Ok(Json(RegisterResponse { ok: true, message }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(payload) = payload?;
    let (token, user) = services::login(&state.users, payload).await?;
    Ok(Json(LoginResponse { ok: true, token, user }))
}

#[instrument(skip_all)]
pub async fn me(SessionUser(user): SessionUser) -> Json<MeResponse> {
    Json(MeResponse {
        ok: true,
        user: PublicUser::from(&user),
    })
}
