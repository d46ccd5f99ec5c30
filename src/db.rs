use std::time::Duration;

use anyhow::Context;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};

use crate::config::DbConfig;

pub fn connect_options(cfg: &DbConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&cfg.host)
        .port(cfg.port)
        .database(&cfg.name)
        .username(&cfg.user)
        .password(&cfg.password)
}

pub fn pool_options(cfg: &DbConfig) -> PgPoolOptions {
    let max = cfg.max_conns.max(1);
    PgPoolOptions::new()
        .max_connections(max)
        .min_connections(cfg.min_conns.min(max))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
}

/// Opens the pool and verifies the database is reachable.
pub async fn connect(cfg: &DbConfig) -> anyhow::Result<PgPool> {
    let pool = pool_options(cfg)
        .connect_with(connect_options(cfg))
        .await
        .with_context(|| format!("connect to database {}:{}/{}", cfg.host, cfg.port, cfg.name))?;
    tracing::info!(
        host = %cfg.host,
        port = cfg.port,
        database = %cfg.name,
        max_conns = cfg.max_conns,
        min_conns = cfg.min_conns,
        "database pool ready"
    );
    Ok(pool)
}
