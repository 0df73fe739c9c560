//! Table manager for spawning and managing multiple table actors.

use super::{
    actor::{TableActor, TableHandle},
    config::TableConfig,
    messages::{LobbyInfo, TableMessage, TableResponse},
};
use crate::{
    game::{
        Snapshot, UserError,
        entities::{Action, Address, Chips, SeatIndex},
    },
    wallet::{BalanceStore, TableId},
};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{RwLock, mpsc, oneshot};

/// Capacity of each subscriber's snapshot channel
pub const SUBSCRIBER_BUFFER: usize = 32;

/// Table manager for managing multiple table instances
#[derive(Clone)]
pub struct TableManager {
    /// Balance store shared by every table
    balances: Arc<dyn BalanceStore>,

    /// Active table handles
    tables: Arc<RwLock<HashMap<TableId, TableHandle>>>,

    /// Next table ID
    next_table_id: Arc<RwLock<TableId>>,
}

impl TableManager {
    /// Create a new table manager
    ///
    /// # Arguments
    ///
    /// * `balances` - Balance store used for buy-ins and cash-outs
    ///
    /// # Returns
    ///
    /// * `TableManager` - New table manager instance
    pub fn new(balances: Arc<dyn BalanceStore>) -> Self {
        Self {
            balances,
            tables: Arc::new(RwLock::new(HashMap::new())),
            next_table_id: Arc::new(RwLock::new(1)),
        }
    }

    /// Create and spawn a new table
    ///
    /// # Arguments
    ///
    /// * `config` - Table configuration
    ///
    /// # Returns
    ///
    /// * `Result<TableId, String>` - Table ID or error
    pub async fn create_table(&self, config: TableConfig) -> Result<TableId, String> {
        config.validate()?;

        let mut next_id = self.next_table_id.write().await;
        let table_id = *next_id;
        *next_id += 1;
        drop(next_id);

        let name = config.name.clone();
        let (actor, handle) = TableActor::new(table_id, config, self.balances.clone());

        let mut tables = self.tables.write().await;
        tables.insert(table_id, handle);
        drop(tables);

        tokio::spawn(async move {
            actor.run().await;
        });

        log::info!("Created and spawned table {} '{}'", table_id, name);

        Ok(table_id)
    }

    /// Get a table handle
    ///
    /// # Arguments
    ///
    /// * `table_id` - Table ID
    ///
    /// # Returns
    ///
    /// * `Option<TableHandle>` - Table handle if found
    pub async fn get_table(&self, table_id: TableId) -> Option<TableHandle> {
        let tables = self.tables.read().await;
        tables.get(&table_id).cloned()
    }

    /// List all open tables, ordered by id
    pub async fn list_tables(&self) -> Vec<LobbyInfo> {
        let mut ids: Vec<TableId> = self.tables.read().await.keys().copied().collect();
        ids.sort_unstable();

        let mut lobby = Vec::with_capacity(ids.len());
        for table_id in ids {
            match self.lobby_info(table_id).await {
                Ok(info) => lobby.push(info),
                Err(e) => log::debug!("Skipping table {} in lobby: {}", table_id, e),
            }
        }
        lobby
    }

    /// Lobby summary for one table
    pub async fn lobby_info(&self, table_id: TableId) -> Result<LobbyInfo, String> {
        let handle = self.handle(table_id).await?;
        let (tx, rx) = oneshot::channel();
        handle
            .send(TableMessage::GetLobbyInfo { response: tx })
            .await?;
        rx.await
            .map_err(|_| "Failed to receive response".to_string())
    }

    /// Close a table, cashing out every seat
    ///
    /// # Arguments
    ///
    /// * `table_id` - Table ID
    ///
    /// # Returns
    ///
    /// * `Result<(), String>` - Success or error
    pub async fn close_table(&self, table_id: TableId) -> Result<(), String> {
        let handle = self
            .tables
            .write()
            .await
            .remove(&table_id)
            .ok_or_else(|| "Table not found".to_string())?;

        let (tx, rx) = oneshot::channel();
        if handle
            .send(TableMessage::Close { response: tx })
            .await
            .is_ok()
            && let Ok(response) = rx.await
            && let Some(error) = response.error_message()
        {
            log::warn!("Table {} closed with error: {}", table_id, error);
        }

        log::info!("Closed table {}", table_id);

        Ok(())
    }

    /// Take a seat
    ///
    /// # Arguments
    ///
    /// * `table_id` - Table ID
    /// * `address` - Player address
    /// * `position` - Seat index
    /// * `buy_in` - Chips moved from the player's balance to the seat
    ///
    /// # Returns
    ///
    /// * `Result<TableResponse, String>` - Response or error
    pub async fn take_seat(
        &self,
        table_id: TableId,
        address: Address,
        position: SeatIndex,
        buy_in: Chips,
    ) -> Result<TableResponse, String> {
        self.request(table_id, |response| TableMessage::TakeSeat {
            address,
            position,
            buy_in,
            response,
        })
        .await
    }

    /// Act as the table's current seat
    pub async fn act(
        &self,
        table_id: TableId,
        address: Address,
        action: Action,
    ) -> Result<TableResponse, String> {
        self.request(table_id, |response| TableMessage::Act {
            address,
            action,
            response,
        })
        .await
    }

    /// Leave a table
    pub async fn leave(&self, table_id: TableId, address: Address) -> Result<TableResponse, String> {
        self.request(table_id, |response| TableMessage::Leave { address, response })
            .await
    }

    /// Report a dropped connection
    pub async fn disconnect(&self, table_id: TableId, address: Address) -> Result<(), String> {
        let handle = self.handle(table_id).await?;
        handle.send(TableMessage::Disconnect { address }).await
    }

    /// Get the snapshot a viewer is allowed to see
    ///
    /// # Arguments
    ///
    /// * `table_id` - Table ID
    /// * `viewer` - Viewer address; `None` for a spectator
    pub async fn snapshot(
        &self,
        table_id: TableId,
        viewer: Option<Address>,
    ) -> Result<Snapshot, String> {
        let handle = self.handle(table_id).await?;
        let (tx, rx) = oneshot::channel();
        handle
            .send(TableMessage::GetSnapshot {
                viewer,
                response: tx,
            })
            .await?;
        rx.await
            .map_err(|_| "Failed to receive response".to_string())
    }

    /// Subscribe to snapshots pushed after every table change
    ///
    /// # Returns
    ///
    /// * `Result<(u64, mpsc::Receiver<Snapshot>), String>` - Subscription id
    ///   and the receiving end; the current snapshot is already queued
    pub async fn subscribe(
        &self,
        table_id: TableId,
        viewer: Option<Address>,
    ) -> Result<(u64, mpsc::Receiver<Snapshot>), String> {
        let handle = self.handle(table_id).await?;
        let (sender, receiver) = mpsc::channel(SUBSCRIBER_BUFFER);
        let (tx, rx) = oneshot::channel();
        handle
            .send(TableMessage::Subscribe {
                viewer,
                sender,
                response: tx,
            })
            .await?;
        let subscription_id = rx
            .await
            .map_err(|_| "Failed to receive response".to_string())?;
        Ok((subscription_id, receiver))
    }

    /// Drop a subscription
    pub async fn unsubscribe(&self, table_id: TableId, subscription_id: u64) -> Result<(), String> {
        let handle = self.handle(table_id).await?;
        handle
            .send(TableMessage::Unsubscribe { subscription_id })
            .await
    }

    /// Get active table count
    pub async fn active_table_count(&self) -> usize {
        let tables = self.tables.read().await;
        tables.values().filter(|handle| !handle.is_closed()).count()
    }

    async fn handle(&self, table_id: TableId) -> Result<TableHandle, String> {
        self.get_table(table_id)
            .await
            .ok_or_else(|| "Table not found".to_string())
    }

    async fn request<F>(&self, table_id: TableId, message: F) -> Result<TableResponse, String>
    where
        F: FnOnce(oneshot::Sender<TableResponse>) -> TableMessage,
    {
        let handle = self.handle(table_id).await?;
        let (tx, rx) = oneshot::channel();
        if let Err(e) = handle.send(message(tx)).await {
            log::debug!("Table {}: request dropped: {}", table_id, e);
            return Ok(TableResponse::Rejected(UserError::TableClosed));
        }
        // The actor drops queued requests when it stops.
        Ok(rx
            .await
            .unwrap_or(TableResponse::Rejected(UserError::TableClosed)))
    }
}
