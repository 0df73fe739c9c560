//! Wallet data models.

use serde::{Deserialize, Serialize};

use crate::game::entities::Address;

/// Table ID type
pub type TableId = i64;

/// A player's account as the balance store sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub address: Address,
    pub name: String,
    /// Chips available off the table
    pub balance: i64,
    pub avatar_id: i32,
}

impl User {
    pub fn new(address: Address, balance: i64) -> Self {
        Self {
            name: address.to_string(),
            address,
            balance,
            avatar_id: 0,
        }
    }
}
