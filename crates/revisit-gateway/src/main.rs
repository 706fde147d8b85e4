use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Utc;
use clap::Parser;
use revisit_core::config::{RevisitConfig, StorageBackend};
use revisit_core::CoreError;
use revisit_records::db::ConnectionPool;
use revisit_records::{
    sample_employees, Employee, MemoryRepository, Question, RecordService,
    SqliteEmployeeRepository, SqliteQuestionRepository,
};
use tracing::{info, warn};

mod app;
mod http;

/// Employee directory and spaced-repetition question API.
#[derive(Debug, Parser)]
#[command(name = "revisit-gateway", version)]
struct Cli {
    /// Path to revisit.toml (default: $REVISIT_CONFIG, then ~/.revisit/revisit.toml).
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "revisit_gateway=info,revisit_records=info,tower_http=debug".into()
            }),
        )
        .init();

    let cli = Cli::parse();

    // load config: --config > REVISIT_CONFIG env > ~/.revisit/revisit.toml
    let config_path = cli
        .config
        .or_else(|| std::env::var("REVISIT_CONFIG").ok());
    let config = RevisitConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        warn!("Config load failed ({}), using defaults", e);
        RevisitConfig::default()
    });

    let address = config.server.address();
    let addr: SocketAddr = address
        .parse()
        .map_err(|e| CoreError::BindAddress(format!("{address}: {e}")))?;

    let (employees, questions) = open_stores(&config)?;
    if config.employees.seed_samples {
        seed_employees(&employees).await?;
    }

    let state = Arc::new(app::AppState::new(config, employees, questions));
    let router = app::build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "revisit gateway listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("revisit gateway stopped");
    Ok(())
}

/// Build both record services on the configured backend.
fn open_stores(
    config: &RevisitConfig,
) -> anyhow::Result<(RecordService<Employee>, RecordService<Question>)> {
    let backend = config.storage.backend;
    match backend {
        StorageBackend::Memory => {
            info!(%backend, "records are lost on exit");
            Ok((
                RecordService::new(Arc::new(MemoryRepository::<Employee>::new())),
                RecordService::new(Arc::new(MemoryRepository::<Question>::new())),
            ))
        }
        StorageBackend::Sqlite => {
            let db_path = &config.storage.path;
            ensure_parent_dir(db_path);
            info!(%backend, path = %db_path, "opening SQLite database");

            // one writer plus read-only connections, shared by both stores
            let pool = Arc::new(ConnectionPool::open(
                db_path,
                config.storage.read_connections,
            )?);
            info!(
                readers = pool.read_connections(),
                "database migrations complete"
            );
            Ok((
                RecordService::new(Arc::new(SqliteEmployeeRepository::new(Arc::clone(&pool)))),
                RecordService::new(Arc::new(SqliteQuestionRepository::new(pool))),
            ))
        }
    }
}

/// Insert the sample directory unless employees already exist.
async fn seed_employees(employees: &RecordService<Employee>) -> anyhow::Result<()> {
    if !employees.list_records(Utc::now()).await?.is_empty() {
        info!("employee directory already populated, skipping sample seed");
        return Ok(());
    }
    let samples = sample_employees();
    let count = samples.len();
    for sample in samples {
        employees.create_record(sample).await?;
    }
    info!(count, "sample employees seeded");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "could not install Ctrl-C handler, running until killed");
            std::future::pending::<()>().await;
        }
    }
}

/// Ensure the parent directory for a file path exists.
fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}
