//! Wallet module holding player balances off the table.
//!
//! Chips move out of a balance when a player takes a seat and back in
//! when the seat is vacated. The table engine never touches balances
//! directly; the table actor goes through a [`BalanceStore`].
//!
//! ## Example
//!
//! ```
//! use holdem_table::Address;
//! use holdem_table::wallet::{BalanceStore, InMemoryBalanceStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = InMemoryBalanceStore::with_default_balance(1_000);
//!     let balance = store.debit(&Address::new("alice"), 100).await.unwrap();
//!     assert_eq!(balance, 900);
//! }
//! ```

pub mod errors;
pub mod models;
pub mod postgres;
pub mod store;

pub use errors::{WalletError, WalletResult};
pub use models::{TableId, User};
pub use postgres::PgBalanceStore;
pub use store::{BalanceStore, InMemoryBalanceStore};
