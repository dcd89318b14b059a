mod admin;
mod app;
mod auth;
mod config;
mod error;
mod llm;
mod plans;
mod state;
mod storage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "adplanner=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = state::AppState::init()?;
    tracing::info!(users_file = %app_state.users.path().display(), "user store ready");

    let (host, port) = (app_state.config.host.clone(), app_state.config.port);
    let app = app::build_app(app_state);
    app::serve(app, &host, port).await
}
