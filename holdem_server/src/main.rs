//! Multi-table Hold'em server.
//!
//! Every table runs as its own actor behind the shared `TableManager`;
//! balances live in PostgreSQL when `DATABASE_URL` is set and in memory
//! otherwise.

use std::sync::Arc;

use anyhow::Error;
use holdem_server::{api, config::ServerConfig, logging};
use holdem_table::{
    db::Database,
    table::TableManager,
    wallet::{BalanceStore, InMemoryBalanceStore, PgBalanceStore},
};
use log::info;
use pico_args::Arguments;

const HELP: &str = "\
Run a multi-table Texas Hold'em server

USAGE:
  holdem_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:6969]
  --db-url     URL         Database connection string  [default: env DATABASE_URL, in-memory balances if unset]
  --tables     N           Number of tables to create  [default: env MAX_TABLES or 1]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             PostgreSQL connection string
  DEFAULT_BALANCE          Starting balance for new addresses (in-memory only)
  TABLE_SMALL_BLIND        Small blind of startup tables
  TABLE_BIG_BLIND          Big blind of startup tables
  TABLE_MIN_BUY_IN         Minimum buy-in of startup tables
  TABLE_MAX_BUY_IN         Maximum buy-in of startup tables
  TABLE_SPEED              normal, turbo or hyper
  RUST_LOG                 Log filter (default: info,sqlx=warn,hyper=warn)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    logging::init();

    let config = ServerConfig::from_env(
        pargs.opt_value_from_str("--bind")?,
        pargs.opt_value_from_str("--db-url")?,
        pargs.opt_value_from_str("--tables")?,
    )?;
    config.validate()?;

    info!("Starting multi-table Hold'em server at {}", config.bind);

    let (balances, database): (Arc<dyn BalanceStore>, Option<Database>) = match &config.database
    {
        Some(db_config) => {
            info!("Connecting to database");
            let db = Database::new(db_config)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;
            let store = PgBalanceStore::new(db.pool().clone());
            store.ensure_schema().await?;
            info!("Database connected successfully");
            let store: Arc<dyn BalanceStore> = Arc::new(store);
            (store, Some(db))
        }
        None => {
            info!(
                "No DATABASE_URL set, keeping balances in memory (starting balance {})",
                config.default_balance
            );
            let store: Arc<dyn BalanceStore> = Arc::new(
                InMemoryBalanceStore::with_default_balance(config.default_balance),
            );
            (store, None)
        }
    };

    let table_manager = TableManager::new(balances);

    info!("Creating {} initial table(s)...", config.num_tables);
    for i in 0..config.num_tables {
        match table_manager
            .create_table(config.table_defaults.table_config(i))
            .await
        {
            Ok(table_id) => info!("Created table {} with ID {}", i + 1, table_id),
            Err(e) => log::error!("Failed to create table {}: {}", i + 1, e),
        }
    }

    info!("Active tables:");
    for table in table_manager.list_tables().await {
        info!(
            "  - {} (ID: {}) - blinds: {}/{}, buy-in: {}-{}, speed: {}",
            table.name,
            table.id,
            table.small_blind,
            table.big_blind,
            table.min_buy_in,
            table.max_buy_in,
            table.speed
        );
    }

    let app = api::create_router(api::AppState::new(table_manager.clone(), database.clone()));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");

    // Cash every seat out before the balance store goes away.
    for table in table_manager.list_tables().await {
        if let Err(e) = table_manager.close_table(table.id).await {
            log::warn!("Failed to close table {}: {}", table.id, e);
        }
    }

    if let Some(db) = database {
        db.close().await;
    }

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
}
