//! Table actor message types.

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use crate::game::{
    Snapshot, TableError, UserError,
    entities::{Action, Address, Chips, SeatIndex},
};
use crate::wallet::{TableId, WalletError};

/// Messages that can be sent to a TableActor
#[derive(Debug)]
pub enum TableMessage {
    /// Sit down with chips taken from the balance store
    TakeSeat {
        address: Address,
        position: SeatIndex,
        buy_in: Chips,
        response: oneshot::Sender<TableResponse>,
    },

    /// Player action (fold, check, call, raise, all-in)
    Act {
        address: Address,
        action: Action,
        response: oneshot::Sender<TableResponse>,
    },

    /// Leave the table and cash out
    Leave {
        address: Address,
        response: oneshot::Sender<TableResponse>,
    },

    /// The player's connection dropped
    Disconnect { address: Address },

    /// Get the snapshot a viewer is allowed to see
    GetSnapshot {
        viewer: Option<Address>,
        response: oneshot::Sender<Snapshot>,
    },

    /// Get the lobby summary
    GetLobbyInfo {
        response: oneshot::Sender<LobbyInfo>,
    },

    /// Subscribe to per-viewer snapshots pushed after every change
    Subscribe {
        viewer: Option<Address>,
        sender: mpsc::Sender<Snapshot>,
        response: oneshot::Sender<u64>,
    },

    /// Unsubscribe from snapshots
    Unsubscribe { subscription_id: u64 },

    /// Close table, cashing out every seat
    Close {
        response: oneshot::Sender<TableResponse>,
    },
}

/// Response from table operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableResponse {
    /// Operation succeeded
    Success,

    /// Request was not legal right now; nothing changed
    Rejected(UserError),

    /// Balance store failure
    Wallet(String),

    /// The table hit a broken invariant and stopped
    TableStopped(String),
}

impl From<TableError> for TableResponse {
    fn from(error: TableError) -> Self {
        match error {
            TableError::User(e) => TableResponse::Rejected(e),
            TableError::Invariant(e) => TableResponse::TableStopped(e.to_string()),
        }
    }
}

impl From<WalletError> for TableResponse {
    fn from(error: WalletError) -> Self {
        match error {
            WalletError::UserNotFound(_) => TableResponse::Rejected(UserError::UserDoesNotExist),
            WalletError::InsufficientBalance {
                available,
                required,
            } => TableResponse::Rejected(UserError::InsufficientFunds {
                required: Chips::try_from(required).unwrap_or(Chips::MAX),
                available,
            }),
            other => TableResponse::Wallet(other.client_message()),
        }
    }
}

impl TableResponse {
    /// Check if response is success
    pub fn is_success(&self) -> bool {
        matches!(self, TableResponse::Success)
    }

    /// Get error message if response is error
    pub fn error_message(&self) -> Option<String> {
        match self {
            TableResponse::Success => None,
            TableResponse::Rejected(e) => Some(e.to_string()),
            TableResponse::Wallet(msg) => Some(format!("Wallet error: {}", msg)),
            TableResponse::TableStopped(msg) => Some(format!("Table stopped: {}", msg)),
        }
    }
}

/// Table summary for the lobby
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LobbyInfo {
    pub id: TableId,
    pub name: String,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub min_buy_in: Chips,
    pub max_buy_in: Chips,
    pub occupied_seats: usize,
    pub speed: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::InvariantViolation;

    #[test]
    fn test_table_error_maps_to_response() {
        let response: TableResponse = TableError::from(UserError::OutOfTurnAction).into();
        assert_eq!(response, TableResponse::Rejected(UserError::OutOfTurnAction));
        assert_eq!(response.error_message().as_deref(), Some("not your turn"));

        let response: TableResponse = TableError::from(InvariantViolation::DeckExhausted).into();
        assert!(matches!(response, TableResponse::TableStopped(_)));
        assert!(!response.is_success());
    }

    #[test]
    fn test_wallet_error_maps_to_response() {
        let response: TableResponse = WalletError::InsufficientBalance {
            available: 10,
            required: 50,
        }
        .into();
        assert_eq!(
            response,
            TableResponse::Rejected(UserError::InsufficientFunds {
                required: 50,
                available: 10
            })
        );

        let response: TableResponse = WalletError::UserNotFound("bob".to_string()).into();
        assert_eq!(response, TableResponse::Rejected(UserError::UserDoesNotExist));
    }
}
