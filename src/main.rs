mod app;
mod config;
mod db;
mod error;
mod state;
mod users;

use std::time::Duration;

use crate::config::AppConfig;
use crate::state::AppState;

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "users_api=debug,axum=info,tower_http=info,sqlx=warn".to_string());
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
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env();

    let pool = match db::connect(&config.db).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!(error = ?e, "failed to create database pool");
            std::process::exit(1);
        }
    };

    let app = app::build_app(
        AppState::new(pool.clone()),
        Duration::from_secs(config.request_timeout_secs),
    );
    let served = app::serve(app, &config.listen_addr()).await;

    pool.close().await;
    tracing::info!("server stopped");
    served
}
