use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::extractors::SessionUser,
    error::AppError,
    plans::{
        dto::{PlanRequest, PlanResponse},
        services,
    },
    state::AppState,
};

pub fn plan_routes() -> Router<AppState> {
    Router::new().route("/plan", post(create_plan))
}

#[instrument(skip_all)]
pub async fn create_plan(
    State(state): State<AppState>,
    SessionUser(user): SessionUser,
    payload: Result<Json<PlanRequest>, JsonRejection>,
) -> Result<Json<PlanResponse>, AppError> {
    // an unreadable body just means every field is "não informado"
    let req = payload.map(|Json(p)| p).unwrap_or_default();
    let plan = services::generate(state.generator.as_deref(), &user, &req).await?;
    Ok(Json(PlanResponse { ok: true, plan }))
}
