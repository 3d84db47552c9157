use std::time::Duration;

mod app;
mod auth;
mod config;
mod error;
mod ledger;
mod recurrence;
mod state;
mod store;
mod users;

use crate::recurrence::Materializer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "fintrack=debug,axum=info,tower_http=info".to_string());
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

    let state = state::AppState::init().await?;

    let materializer = Materializer::new(
        state.ledger.clone(),
        Duration::from_secs(state.config.recurrence_tick_seconds),
    );
    let shutdown = materializer.shutdown_handle();
    let worker = materializer.start();

    let app = app::build_app(state);
    app::serve(app).await?;

    shutdown.notify_one();
    worker.await?;
    Ok(())
}
