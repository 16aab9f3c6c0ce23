mod migrations;

use account_core::{AppConfig, StoreBackend};
use anyhow::{bail, Context, Result};
use api::{router, AppState};
use auth::PasswordHasher;
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use storage::{MemoryUserStore, PostgresUserStore, UserStore};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let problems = config.validate();
    if !problems.is_empty() {
        for problem in &problems {
            error!("{}", problem);
        }
        bail!("config validation failed ({} problem(s))", problems.len());
    }

    let store = build_store(&config).await?;
    let hasher = build_hasher(&config)?;
    let state = AppState::from_store(store, config.auth.jwt_secret.as_bytes(), hasher);
    let app = router::router(
        Arc::new(state),
        Duration::from_secs(config.server.request_timeout_secs),
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")?;

    info!("Server stopped");
    Ok(())
}

async fn build_store(config: &AppConfig) -> Result<Arc<dyn UserStore>> {
    match config.database.backend {
        StoreBackend::Memory => {
            warn!("Using in-memory account store; data is lost on restart");
            Ok(Arc::new(MemoryUserStore::new()))
        }
        StoreBackend::Postgres => {
            let url = config
                .database
                .connection_url()
                .context("database connection settings are incomplete")?;
            let pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(&url)
                .await
                .context("failed to connect to database")?;

            migrations::run_migrations(&pool)
                .await
                .context("failed to run migrations")?;

            Ok(Arc::new(PostgresUserStore::new(pool)))
        }
    }
}

fn build_hasher(config: &AppConfig) -> Result<PasswordHasher> {
    let auth = &config.auth;
    match (auth.hash_memory_kib, auth.hash_iterations, auth.hash_parallelism) {
        (None, None, None) => Ok(PasswordHasher::new()),
        (Some(memory), Some(iterations), Some(parallelism)) => {
            PasswordHasher::with_cost(memory, iterations, parallelism).context("invalid password hash cost")
        }
        _ => bail!("auth.hash_memory_kib, auth.hash_iterations and auth.hash_parallelism must be set together"),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
