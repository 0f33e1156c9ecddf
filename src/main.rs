mod app;
mod auth;
mod config;
mod dates;
mod diary;
mod error;
mod nutrition;
mod state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "macrodash=debug,axum=info,tower_http=info".to_string());
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
    tracing::info!(
        diary = %app_state.config.diary_base_url,
        concurrency = app_state.config.fetch.concurrency,
        on_day_error = ?app_state.config.fetch.on_day_error,
        "diary client ready"
    );

    app::serve(app::build_app(app_state)).await
}
