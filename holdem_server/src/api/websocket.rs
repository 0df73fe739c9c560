//! WebSocket handler for live table updates.
//!
//! # Connection Flow
//!
//! 1. Client connects via `GET /ws/{table_id}?address=<addr>` (omit the
//!    address to spectate)
//! 2. The handler subscribes to the table and gets the current snapshot
//! 3. A send task forwards every pushed snapshot and every command response
//! 4. When the socket closes the subscription is dropped; once the last
//!    socket of an address closes the address is reported as disconnected
//!
//! # Example
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:6969/ws/1?address=alice');
//!
//! ws.onmessage = (event) => {
//!   const data = JSON.parse(event.data);
//!   if (data.type === "snapshot") {
//!     updateTableUI(data);
//!   }
//! };
//!
//! ws.send(JSON.stringify({
//!   type: "action",
//!   action: { type: "raise", amount: 10 }
//! }));
//! ```

use axum::{
    extract::{
        Path, Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use holdem_table::{
    Action, Address, Chips, SeatIndex, Snapshot,
    table::TableResponse,
    wallet::TableId,
};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    address: Option<String>,
}

/// Messages a client may send over the socket
#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    TakeSeat { position: SeatIndex, buy_in: Chips },
    Action { action: Action },
    Leave,
}

/// Messages pushed to the client
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Snapshot(Box<Snapshot>),
    Success { message: String },
    Error { message: String },
}

impl From<TableResponse> for ServerMessage {
    fn from(response: TableResponse) -> Self {
        match response.error_message() {
            None => ServerMessage::Success {
                message: "ok".to_string(),
            },
            Some(message) => ServerMessage::Error { message },
        }
    }
}

/// Count of open sockets per address and table.
///
/// An address may watch a table from several sockets at once; only the last
/// one to close marks the seat as disconnected.
#[derive(Clone, Debug, Default)]
pub struct Connections {
    open: Arc<Mutex<HashMap<(TableId, Address), usize>>>,
}

impl Connections {
    /// Record a new socket and return how many the address now has open
    pub async fn open(&self, table_id: TableId, address: &Address) -> usize {
        let mut open = self.open.lock().await;
        let count = open.entry((table_id, address.clone())).or_insert(0);
        *count += 1;
        *count
    }

    /// Record a closed socket. Returns `true` when it was the address's last.
    pub async fn close(&self, table_id: TableId, address: &Address) -> bool {
        let mut open = self.open.lock().await;
        let key = (table_id, address.clone());
        match open.get_mut(&key) {
            Some(count) if *count > 1 => {
                *count -= 1;
                false
            }
            Some(_) => {
                open.remove(&key);
                true
            }
            None => true,
        }
    }
}

/// Upgrade to a WebSocket connection for one table.
///
/// Returns `404` when the table does not exist.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    Path(table_id): Path<TableId>,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Response {
    if state.table_manager.get_table(table_id).await.is_none() {
        return (StatusCode::NOT_FOUND, "Table not found").into_response();
    }

    let address = query
        .address
        .as_deref()
        .map(Address::new)
        .filter(|a| !a.is_empty());

    ws.on_upgrade(move |socket| handle_socket(socket, table_id, address, state))
}

async fn handle_socket(
    socket: WebSocket,
    table_id: TableId,
    address: Option<Address>,
    state: AppState,
) {
    let (mut sender, mut receiver) = socket.split();
    let who = address
        .as_ref()
        .map_or_else(|| "spectator".to_string(), Address::to_string);

    info!("WebSocket connected: table={}, viewer={}", table_id, who);

    let (subscription_id, mut snapshots) = match state
        .table_manager
        .subscribe(table_id, address.clone())
        .await
    {
        Ok(subscription) => subscription,
        Err(e) => {
            error!("Failed to subscribe to table {}: {}", table_id, e);
            return;
        }
    };

    if let Some(address) = &address {
        let open = state.connections.open(table_id, address).await;
        if open > 1 {
            info!("{} has {} sockets open on table {}", address, open, table_id);
        }
    }

    let (response_tx, mut response_rx) = tokio::sync::mpsc::channel::<ServerMessage>(32);

    let send_task = tokio::spawn(async move {
        loop {
            let message = tokio::select! {
                snapshot = snapshots.recv() => match snapshot {
                    Some(snapshot) => ServerMessage::Snapshot(Box::new(snapshot)),
                    // The table went away.
                    None => break,
                },
                Some(response) = response_rx.recv() => response,
            };

            let json = match serde_json::to_string(&message) {
                Ok(j) => j,
                Err(e) => {
                    error!("Failed to serialize server message: {}", e);
                    continue;
                }
            };

            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let response = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => match &address {
                        Some(address) => {
                            handle_client_message(client_msg, table_id, address.clone(), &state)
                                .await
                        }
                        None => ServerMessage::Error {
                            message: "Spectators cannot send commands".to_string(),
                        },
                    },
                    Err(e) => {
                        warn!("Failed to parse client message: {}", e);
                        ServerMessage::Error {
                            message: "Invalid message format".to_string(),
                        }
                    }
                };

                if response_tx.send(response).await.is_err() {
                    break;
                }
            }
            Ok(Message::Close(_)) => {
                info!("WebSocket closed: table={}, viewer={}", table_id, who);
                break;
            }
            Err(e) => {
                error!("WebSocket error: {}", e);
                break;
            }
            _ => {}
        }
    }

    send_task.abort();

    if let Err(e) = state
        .table_manager
        .unsubscribe(table_id, subscription_id)
        .await
    {
        warn!("Failed to unsubscribe from table {}: {}", table_id, e);
    }

    if let Some(address) = address
        && state.connections.close(table_id, &address).await
        && let Err(e) = state.table_manager.disconnect(table_id, address).await
    {
        warn!("Failed to report disconnect on table {}: {}", table_id, e);
    }
}

async fn handle_client_message(
    msg: ClientMessage,
    table_id: TableId,
    address: Address,
    state: &AppState,
) -> ServerMessage {
    let manager = &state.table_manager;
    let result = match msg {
        ClientMessage::TakeSeat { position, buy_in } => {
            manager.take_seat(table_id, address, position, buy_in).await
        }
        ClientMessage::Action { action } => manager.act(table_id, address, action).await,
        ClientMessage::Leave => manager.leave(table_id, address).await,
    };

    match result {
        Ok(response) => response.into(),
        Err(message) => ServerMessage::Error { message },
    }
}
