//! Balance store abstraction and the in-memory implementation.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{
    errors::{WalletError, WalletResult},
    models::User,
};
use crate::game::entities::{Address, Chips};

/// Account lookup used when a player buys in or cashes out.
#[async_trait]
pub trait BalanceStore: Send + Sync {
    /// Get the user with this address
    async fn get_user(&self, address: &Address) -> WalletResult<User>;

    /// Persist the user, replacing any previous record
    async fn update_user(&self, user: &User) -> WalletResult<()>;

    /// Take `amount` off the user's balance. The balance check and the
    /// update happen atomically.
    ///
    /// # Returns
    ///
    /// * `WalletResult<i64>` - Balance after the debit
    async fn debit(&self, address: &Address, amount: Chips) -> WalletResult<i64>;

    /// Return `amount` to the user's balance atomically
    ///
    /// # Returns
    ///
    /// * `WalletResult<i64>` - Balance after the credit
    async fn credit(&self, address: &Address, amount: Chips) -> WalletResult<i64>;
}

/// Process-local balances. Unknown addresses get `default_balance` on
/// first lookup when one is set.
#[derive(Default)]
pub struct InMemoryBalanceStore {
    users: RwLock<HashMap<Address, User>>,
    default_balance: Option<i64>,
}

impl InMemoryBalanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create every unknown user on first lookup with `balance` chips
    pub fn with_default_balance(balance: i64) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            default_balance: Some(balance),
        }
    }

    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.address.clone(), user);
    }

    fn entry<'a>(
        &self,
        users: &'a mut HashMap<Address, User>,
        address: &Address,
    ) -> WalletResult<&'a mut User> {
        if !users.contains_key(address) {
            let balance = self
                .default_balance
                .ok_or_else(|| WalletError::UserNotFound(address.to_string()))?;
            users.insert(address.clone(), User::new(address.clone(), balance));
        }
        users
            .get_mut(address)
            .ok_or_else(|| WalletError::UserNotFound(address.to_string()))
    }
}

#[async_trait]
impl BalanceStore for InMemoryBalanceStore {
    async fn get_user(&self, address: &Address) -> WalletResult<User> {
        if let Some(user) = self.users.read().await.get(address) {
            return Ok(user.clone());
        }
        let balance = self
            .default_balance
            .ok_or_else(|| WalletError::UserNotFound(address.to_string()))?;
        let user = User::new(address.clone(), balance);
        self.users
            .write()
            .await
            .entry(address.clone())
            .or_insert_with(|| user.clone());
        Ok(user)
    }

    async fn update_user(&self, user: &User) -> WalletResult<()> {
        self.users
            .write()
            .await
            .insert(user.address.clone(), user.clone());
        Ok(())
    }

    async fn debit(&self, address: &Address, amount: Chips) -> WalletResult<i64> {
        let mut users = self.users.write().await;
        let user = self.entry(&mut users, address)?;
        let required = i64::from(amount);
        if user.balance < required {
            return Err(WalletError::InsufficientBalance {
                available: user.balance,
                required,
            });
        }
        user.balance -= required;
        Ok(user.balance)
    }

    async fn credit(&self, address: &Address, amount: Chips) -> WalletResult<i64> {
        let mut users = self.users.write().await;
        let user = self.entry(&mut users, address)?;
        user.balance += i64::from(amount);
        Ok(user.balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_unknown_user_without_default() {
        let store = InMemoryBalanceStore::new();
        let result = store.get_user(&Address::new("ghost")).await;
        assert!(matches!(result, Err(WalletError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_default_balance_creates_user() {
        let store = InMemoryBalanceStore::with_default_balance(500);
        let user = store.get_user(&Address::new("alice")).await.unwrap();
        assert_eq!(user.balance, 500);
        assert_eq!(user.name, "alice");
    }

    #[tokio::test]
    async fn test_debit_and_credit() {
        let store = InMemoryBalanceStore::new();
        let alice = Address::new("alice");
        store.insert(User::new(alice.clone(), 100)).await;

        assert_eq!(store.debit(&alice, 60).await.unwrap(), 40);
        let result = store.debit(&alice, 50).await;
        assert!(matches!(
            result,
            Err(WalletError::InsufficientBalance {
                available: 40,
                required: 50
            })
        ));
        assert_eq!(store.credit(&alice, 25).await.unwrap(), 65);
        assert_eq!(store.get_user(&alice).await.unwrap().balance, 65);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_credits_are_not_lost() {
        let store = Arc::new(InMemoryBalanceStore::new());
        let alice = Address::new("alice");
        store.insert(User::new(alice.clone(), 0)).await;

        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let store = store.clone();
                let alice = alice.clone();
                tokio::spawn(async move {
                    for _ in 0..2_000 {
                        store.credit(&alice, 1).await.unwrap();
                    }
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(store.get_user(&alice).await.unwrap().balance, 8_000);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_debits_never_overdraw() {
        let store = Arc::new(InMemoryBalanceStore::new());
        let alice = Address::new("alice");
        store.insert(User::new(alice.clone(), 100)).await;

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                let alice = alice.clone();
                tokio::spawn(async move { store.debit(&alice, 30).await.is_ok() })
            })
            .collect();
        let mut succeeded = 0;
        for task in tasks {
            if task.await.unwrap() {
                succeeded += 1;
            }
        }

        assert_eq!(succeeded, 3);
        assert_eq!(store.get_user(&alice).await.unwrap().balance, 10);
    }

    #[tokio::test]
    async fn test_debit_creates_user_with_default_balance() {
        let store = InMemoryBalanceStore::with_default_balance(50);
        assert_eq!(store.debit(&Address::new("carol"), 20).await.unwrap(), 30);
    }
}
