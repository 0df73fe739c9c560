//! Table module providing multi-table support with an async actor model.
//!
//! This module implements:
//! - TableActor: Async actor owning a single table state machine
//! - TableManager: Registry of running tables, owned by the caller
//! - Message-based communication with tokio channels
//! - Table configuration and lifecycle management
//!
//! ## Architecture
//!
//! Each table runs in a separate Tokio task with an mpsc message inbox.
//! The actor is the table's only writer: requests, the countdown clock and
//! scheduled continuations are all handled on that task. After every change
//! it pushes a viewer-specific snapshot to each subscriber.
//!
//! ## Example
//!
//! ```no_run
//! use holdem_table::Address;
//! use holdem_table::table::{TableConfig, TableManager};
//! use holdem_table::wallet::InMemoryBalanceStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), String> {
//!     let balances = Arc::new(InMemoryBalanceStore::with_default_balance(1_000));
//!     let manager = TableManager::new(balances);
//!     let table_id = manager.create_table(TableConfig::default()).await?;
//!
//!     let response = manager
//!         .take_seat(table_id, Address::new("alice"), 0, 100)
//!         .await?;
//!     assert!(response.is_success());
//!     Ok(())
//! }
//! ```

pub mod actor;
pub mod config;
pub mod manager;
pub mod messages;

pub use actor::{TableActor, TableHandle};
pub use config::{TableConfig, TableSpeed};
pub use manager::TableManager;
pub use messages::{LobbyInfo, TableMessage, TableResponse};
