//! HTTP/WebSocket API for the table server.
//!
//! # Endpoints Overview
//!
//! ```text
//! GET  /health                              - Health check
//! GET  /api/v1/tables                       - Lobby list
//! GET  /api/v1/tables/{id}?viewer=ADDR      - Table snapshot
//! POST /api/v1/tables/{id}/seat             - Take a seat with a buy-in
//! POST /api/v1/tables/{id}/action           - Act on the current turn
//! POST /api/v1/tables/{id}/leave            - Leave and cash out
//! GET  /ws/{id}?address=ADDR                - Live snapshots and actions
//! ```
//!
//! Players are identified by the address they send; there is no login.
//!
//! # CORS
//!
//! CORS is configured permissively for development. In production, configure
//! appropriate origins, methods, and headers.

pub mod tables;
pub mod websocket;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use holdem_table::{db::Database, table::TableManager};
use serde_json::json;
use tower_http::cors::CorsLayer;
use websocket::Connections;

/// Application state shared across all HTTP handlers and WebSocket connections.
///
/// Cloning is cheap; the manager and pool are reference counted.
#[derive(Clone)]
pub struct AppState {
    pub table_manager: TableManager,
    /// Present when balances live in PostgreSQL
    pub database: Option<Database>,
    /// Open sockets per seated address
    pub connections: Connections,
}

impl AppState {
    pub fn new(table_manager: TableManager, database: Option<Database>) -> Self {
        Self {
            table_manager,
            database,
            connections: Connections::default(),
        }
    }
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Example
///
/// ```rust,no_run
/// # use holdem_server::api::{create_router, AppState};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let state: AppState = unimplemented!();
/// let app = create_router(state);
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn create_router(state: AppState) -> Router {
    let root_routes = Router::new()
        .route("/health", get(health_check))
        .route("/ws/{table_id}", get(websocket::websocket_handler));

    Router::new()
        .merge(root_routes)
        .nest("/api/v1", create_v1_router())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/tables", get(tables::list_tables))
        .route("/tables/{table_id}", get(tables::get_table))
        .route("/tables/{table_id}/seat", post(tables::take_seat))
        .route("/tables/{table_id}/action", post(tables::take_action))
        .route("/tables/{table_id}/leave", post(tables::leave_table))
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` while the database (if any) answers, `503` otherwise.
///
/// ```bash
/// curl http://localhost:6969/health
/// # {"status":"healthy","database":null,"tables":{"active_count":1}}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = match &state.database {
        Some(db) => Some(db.health_check().await.is_ok()),
        None => None,
    };
    let table_count = state.table_manager.active_table_count().await;

    let healthy = db_healthy.unwrap_or(true);
    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "tables": {
            "active_count": table_count
        },
    });

    (status_code, Json(response))
}
