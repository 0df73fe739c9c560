//! Table API handlers.
//!
//! Take a seat:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/tables/1/seat \
//!   -H "Content-Type: application/json" \
//!   -d '{"address": "alice", "position": 0, "buy_in": 100}'
//! ```
//!
//! Raise by 10:
//! ```bash
//! curl -X POST http://localhost:6969/api/v1/tables/1/action \
//!   -H "Content-Type: application/json" \
//!   -d '{"address": "alice", "action": {"type": "raise", "amount": 10}}'
//! ```

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use holdem_table::{
    Action, Address, Chips, SeatIndex, Snapshot, UserError,
    table::{LobbyInfo, TableResponse},
    wallet::TableId,
};
use serde::{Deserialize, Serialize};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct SnapshotQuery {
    pub viewer: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TakeSeatRequest {
    pub address: String,
    pub position: SeatIndex,
    pub buy_in: Chips,
}

#[derive(Debug, Deserialize)]
pub struct TakeActionRequest {
    pub address: String,
    pub action: Action,
}

#[derive(Debug, Deserialize)]
pub struct LeaveRequest {
    pub address: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

/// Map a manager-level failure (the table is gone or stopped)
fn manager_error(error: String) -> ApiError {
    if error == "Table not found" {
        api_error(StatusCode::NOT_FOUND, error)
    } else {
        api_error(StatusCode::SERVICE_UNAVAILABLE, error)
    }
}

/// Status code for a rejected request
pub fn rejection_status(error: &UserError) -> StatusCode {
    match error {
        UserError::SeatTaken(_)
        | UserError::AlreadySeated
        | UserError::OutOfTurnAction
        | UserError::NoHandInProgress
        | UserError::TableClosed => StatusCode::CONFLICT,
        UserError::UserDoesNotExist => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_REQUEST,
    }
}

fn into_result(response: TableResponse) -> Result<StatusCode, ApiError> {
    match response {
        TableResponse::Success => Ok(StatusCode::OK),
        TableResponse::Rejected(e) => Err(api_error(rejection_status(&e), e.to_string())),
        TableResponse::Wallet(msg) => Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, msg)),
        TableResponse::TableStopped(msg) => {
            tracing::error!("Table stopped while handling a request: {}", msg);
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, msg))
        }
    }
}

fn parse_address(raw: &str) -> Result<Address, ApiError> {
    let address = Address::new(raw);
    if address.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            UserError::InvalidAddress.to_string(),
        ));
    }
    Ok(address)
}

/// List all tables.
///
/// Returns `200 OK` with an array of lobby entries:
/// ```json
/// [{"id": 1, "name": "Table 1", "small_blind": 1, "big_blind": 2,
///   "min_buy_in": 40, "max_buy_in": 200, "occupied_seats": 2, "speed": "normal"}]
/// ```
pub async fn list_tables(State(state): State<AppState>) -> Json<Vec<LobbyInfo>> {
    Json(state.table_manager.list_tables().await)
}

/// Get the snapshot of a table as seen by `viewer`.
///
/// Without a viewer the caller gets the spectator view with every hole card
/// hidden until showdown.
///
/// # Errors
///
/// - `404 Not Found`: Table doesn't exist
pub async fn get_table(
    State(state): State<AppState>,
    Path(table_id): Path<TableId>,
    Query(query): Query<SnapshotQuery>,
) -> Result<Json<Snapshot>, ApiError> {
    let viewer = query.viewer.as_deref().map(Address::new);
    state
        .table_manager
        .snapshot(table_id, viewer)
        .await
        .map(Json)
        .map_err(manager_error)
}

/// Take a seat with a buy-in.
///
/// The buy-in is debited from the address's balance before the seat is
/// filled.
///
/// # Errors
///
/// - `400 Bad Request`: Buy-in out of range, insufficient balance or bad seat
/// - `404 Not Found`: Table or user doesn't exist
/// - `409 Conflict`: Seat taken or address already seated
pub async fn take_seat(
    State(state): State<AppState>,
    Path(table_id): Path<TableId>,
    Json(request): Json<TakeSeatRequest>,
) -> Result<StatusCode, ApiError> {
    let address = parse_address(&request.address)?;
    let response = state
        .table_manager
        .take_seat(table_id, address, request.position, request.buy_in)
        .await
        .map_err(manager_error)?;
    into_result(response)
}

/// Act on the current turn.
///
/// # Errors
///
/// - `400 Bad Request`: Illegal action (cannot check, raise too small)
/// - `404 Not Found`: Table doesn't exist
/// - `409 Conflict`: Not your turn or no hand running
pub async fn take_action(
    State(state): State<AppState>,
    Path(table_id): Path<TableId>,
    Json(request): Json<TakeActionRequest>,
) -> Result<StatusCode, ApiError> {
    let address = parse_address(&request.address)?;
    let response = state
        .table_manager
        .act(table_id, address, request.action)
        .await
        .map_err(manager_error)?;
    into_result(response)
}

/// Leave a table and cash out.
///
/// A seat that leaves mid-hand folds (unless all-in) and its remaining
/// stack returns to the balance.
pub async fn leave_table(
    State(state): State<AppState>,
    Path(table_id): Path<TableId>,
    Json(request): Json<LeaveRequest>,
) -> Result<StatusCode, ApiError> {
    let address = parse_address(&request.address)?;
    let response = state
        .table_manager
        .leave(table_id, address)
        .await
        .map_err(manager_error)?;
    into_result(response)
}
