//! Table actor implementation with async message handling.

use super::{
    config::TableConfig,
    messages::{LobbyInfo, TableMessage, TableResponse},
};
use crate::{
    game::{
        Snapshot, TableError, TableState,
        entities::{Address, Chips, SeatIndex, TableEvent},
        project,
    },
    wallet::{BalanceStore, TableId},
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::{
    sync::mpsc,
    time::{Duration, Instant, interval},
};

/// How often the actor advances the table clock
pub const TICK_INTERVAL_MS: u64 = 100;

/// Table actor handle for sending messages
#[derive(Clone)]
pub struct TableHandle {
    sender: mpsc::Sender<TableMessage>,
    table_id: TableId,
}

impl TableHandle {
    /// Create a new table handle
    pub fn new(sender: mpsc::Sender<TableMessage>, table_id: TableId) -> Self {
        Self { sender, table_id }
    }

    /// Get table ID
    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    /// Send a message to the table
    pub async fn send(&self, message: TableMessage) -> Result<(), String> {
        self.sender
            .send(message)
            .await
            .map_err(|_| "Table is closed".to_string())
    }

    /// Whether the actor has stopped
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

struct Subscriber {
    viewer: Option<Address>,
    sender: mpsc::Sender<Snapshot>,
}

/// Table actor owning a single table
pub struct TableActor {
    /// Table ID
    id: TableId,

    /// Table configuration
    config: TableConfig,

    /// Table state machine
    state: TableState,

    /// Message inbox
    inbox: mpsc::Receiver<TableMessage>,

    /// Balance store for buy-ins/cash-outs
    balances: Arc<dyn BalanceStore>,

    /// Snapshot subscribers by subscription id
    subscribers: HashMap<u64, Subscriber>,

    next_subscription_id: u64,

    /// Is table closed
    is_closed: bool,

    /// When the table clock was last advanced
    last_tick: Instant,
}

impl TableActor {
    /// Create a new table actor
    ///
    /// # Arguments
    ///
    /// * `id` - Table ID
    /// * `config` - Table configuration
    /// * `balances` - Balance store reference
    ///
    /// # Returns
    ///
    /// * `(TableActor, TableHandle)` - Actor and handle for sending messages
    pub fn new(
        id: TableId,
        config: TableConfig,
        balances: Arc<dyn BalanceStore>,
    ) -> (Self, TableHandle) {
        let (sender, inbox) = mpsc::channel(100);
        let state = TableState::new(config.game_settings());

        let actor = Self {
            id,
            config,
            state,
            inbox,
            balances,
            subscribers: HashMap::new(),
            next_subscription_id: 1,
            is_closed: false,
            last_tick: Instant::now(),
        };

        let handle = TableHandle::new(sender, id);

        (actor, handle)
    }

    /// Run the table actor event loop
    pub async fn run(mut self) {
        log::info!("Table {} '{}' starting", self.id, self.config.name);

        let mut tick_interval = interval(Duration::from_millis(TICK_INTERVAL_MS));
        self.last_tick = Instant::now();

        loop {
            tokio::select! {
                message = self.inbox.recv() => {
                    match message {
                        Some(message) => self.handle_message(message).await,
                        // Every handle is gone.
                        None => break,
                    }

                    if self.is_closed {
                        break;
                    }
                }

                _ = tick_interval.tick() => {
                    self.tick().await;

                    if self.is_closed {
                        break;
                    }
                }
            }
        }

        log::info!("Table {} '{}' closed", self.id, self.config.name);
    }

    /// Handle a table message
    async fn handle_message(&mut self, message: TableMessage) {
        match message {
            TableMessage::TakeSeat {
                address,
                position,
                buy_in,
                response,
            } => {
                let result = self.handle_take_seat(address, position, buy_in).await;
                let _ = response.send(result);
            }

            TableMessage::Act {
                address,
                action,
                response,
            } => {
                let result = self.state.act(&address, action);
                let result = self.after_mutation(result).await;
                let _ = response.send(result);
            }

            TableMessage::Leave { address, response } => {
                let result = self.state.leave(&address);
                let result = self.after_mutation(result).await;
                let _ = response.send(result);
            }

            TableMessage::Disconnect { address } => {
                let result = self.state.disconnect(&address);
                if let TableResponse::Rejected(e) = self.after_mutation(result).await {
                    log::debug!("Table {}: ignoring disconnect of {}: {}", self.id, address, e);
                }
            }

            TableMessage::GetSnapshot { viewer, response } => {
                let _ = response.send(project(&self.state, viewer.as_ref()));
            }

            TableMessage::GetLobbyInfo { response } => {
                let _ = response.send(self.lobby_info());
            }

            TableMessage::Subscribe {
                viewer,
                sender,
                response,
            } => {
                let subscription_id = self.next_subscription_id;
                self.next_subscription_id += 1;
                // Fresh subscribers get the current state right away.
                let _ = sender.try_send(project(&self.state, viewer.as_ref()));
                self.subscribers
                    .insert(subscription_id, Subscriber { viewer, sender });
                log::debug!("Table {}: subscriber {} added", self.id, subscription_id);
                let _ = response.send(subscription_id);
            }

            TableMessage::Unsubscribe { subscription_id } => {
                self.subscribers.remove(&subscription_id);
            }

            TableMessage::Close { response } => {
                let result = self.state.close();
                let result = self.after_mutation(result).await;
                self.is_closed = true;
                let _ = response.send(result);
            }
        }
    }

    /// Handle take-seat request
    async fn handle_take_seat(
        &mut self,
        address: Address,
        position: SeatIndex,
        buy_in: Chips,
    ) -> TableResponse {
        if let Err(e) = self.state.can_seat(&address, position, buy_in) {
            return TableResponse::Rejected(e);
        }

        // The store checks the balance and debits in one step.
        if let Err(e) = self.balances.debit(&address, buy_in).await {
            return e.into();
        }

        match self.state.take_seat(address.clone(), position, buy_in) {
            Ok(()) => {
                log::info!(
                    "Table {}: {} took seat {} with {} chips",
                    self.id,
                    address,
                    position,
                    buy_in
                );
                self.after_mutation(Ok(())).await
            }
            Err(e) => {
                match self.balances.credit(&address, buy_in).await {
                    Ok(_) => log::info!(
                        "Table {}: rolled back buy-in of {} for {}",
                        self.id,
                        buy_in,
                        address
                    ),
                    Err(rollback_err) => log::error!(
                        "Table {}: failed to roll back buy-in of {} for {}: {}",
                        self.id,
                        buy_in,
                        address,
                        rollback_err
                    ),
                }
                self.after_mutation(Err(e)).await
            }
        }
    }

    /// Advance the table clock by the real time since the last tick
    async fn tick(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_tick);
        self.last_tick = now;

        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        match self.state.advance(elapsed_ms) {
            Ok(false) => {}
            Ok(true) => {
                self.after_mutation(Ok(())).await;
            }
            Err(e) => {
                self.after_mutation(Err(e)).await;
            }
        }
    }

    /// Settle side effects of a state change and notify subscribers
    async fn after_mutation(&mut self, result: Result<(), TableError>) -> TableResponse {
        match result {
            // Rejected requests change nothing.
            Err(TableError::User(e)) => TableResponse::Rejected(e),
            Err(e) => {
                log::error!("Table {} stopped: {}", self.id, e);
                self.is_closed = true;
                self.process_events().await;
                e.into()
            }
            Ok(()) => {
                self.process_events().await;
                self.notify_subscribers();
                TableResponse::Success
            }
        }
    }

    /// Drain table events, crediting cash-outs to the balance store
    async fn process_events(&mut self) {
        for event in self.state.drain_events() {
            log::debug!("Table {}: {:?}", self.id, event);
            if let TableEvent::Unseated { address, stack, .. } = event
                && stack > 0
                && let Err(e) = self.balances.credit(&address, stack).await
            {
                log::error!(
                    "Table {}: failed to cash out {} chips for {}: {}",
                    self.id,
                    stack,
                    address,
                    e
                );
            }
        }
    }

    /// Push a fresh snapshot to every subscriber
    fn notify_subscribers(&mut self) {
        let state = &self.state;
        let table_id = self.id;
        self.subscribers.retain(|subscription_id, subscriber| {
            let snapshot = project(state, subscriber.viewer.as_ref());
            match subscriber.sender.try_send(snapshot) {
                Ok(_) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    log::warn!(
                        "Table {}: subscriber {} channel full, dropping snapshot",
                        table_id,
                        subscription_id
                    );
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::debug!(
                        "Table {}: subscriber {} disconnected, removing",
                        table_id,
                        subscription_id
                    );
                    false
                }
            }
        });
    }

    fn lobby_info(&self) -> LobbyInfo {
        LobbyInfo {
            id: self.id,
            name: self.config.name.clone(),
            small_blind: self.config.small_blind,
            big_blind: self.config.big_blind,
            min_buy_in: self.config.min_buy_in,
            max_buy_in: self.config.max_buy_in,
            occupied_seats: self.state.occupied_seats(),
            speed: self.config.speed.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::InvariantViolation;
    use crate::wallet::InMemoryBalanceStore;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_broken_invariant_stops_the_table() {
        let store = Arc::new(InMemoryBalanceStore::with_default_balance(500));
        let (mut actor, handle) = TableActor::new(1, TableConfig::default(), store);

        let response = actor
            .handle_take_seat(Address::new("alice"), 0, 100)
            .await;
        assert!(response.is_success());

        let violation = InvariantViolation::ChipConservation {
            expected: 100,
            counted: 90,
        };
        let response = actor.after_mutation(Err(violation.into())).await;
        assert!(matches!(response, TableResponse::TableStopped(_)));
        assert!(actor.is_closed);

        // A stopped actor leaves its loop on the first tick.
        timeout_run(actor).await;

        assert!(handle.is_closed());
        let (tx, _rx) = oneshot::channel();
        let result = handle
            .send(TableMessage::Leave {
                address: Address::new("alice"),
                response: tx,
            })
            .await;
        assert_eq!(result, Err("Table is closed".to_string()));
    }

    async fn timeout_run(actor: TableActor) {
        tokio::time::timeout(Duration::from_secs(5), actor.run())
            .await
            .expect("actor kept running after a fatal error");
    }
}
