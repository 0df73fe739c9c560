//! PostgreSQL balance store.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use super::{
    errors::{WalletError, WalletResult},
    models::User,
    store::BalanceStore,
};
use crate::game::entities::{Address, Chips};

/// Balances kept in the `users` table
pub struct PgBalanceStore {
    pool: PgPool,
}

impl PgBalanceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `users` table if it does not exist yet
    pub async fn ensure_schema(&self) -> WalletResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                address TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                balance BIGINT NOT NULL CHECK (balance >= 0),
                avatar_id INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl BalanceStore for PgBalanceStore {
    async fn get_user(&self, address: &Address) -> WalletResult<User> {
        let row = sqlx::query("SELECT address, name, balance, avatar_id FROM users WHERE address = $1")
            .bind(address.as_str())
            .fetch_optional(&self.pool)
            .await?;

        let row = row.ok_or_else(|| WalletError::UserNotFound(address.to_string()))?;
        Ok(User {
            address: Address::new(row.get::<&str, _>("address")),
            name: row.get("name"),
            balance: row.get("balance"),
            avatar_id: row.get("avatar_id"),
        })
    }

    async fn update_user(&self, user: &User) -> WalletResult<()> {
        if user.balance < 0 {
            return Err(WalletError::InvalidAmount(user.balance));
        }
        sqlx::query(
            r#"
            INSERT INTO users (address, name, balance, avatar_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (address)
            DO UPDATE SET name = EXCLUDED.name, balance = EXCLUDED.balance, avatar_id = EXCLUDED.avatar_id
            "#,
        )
        .bind(user.address.as_str())
        .bind(&user.name)
        .bind(user.balance)
        .bind(user.avatar_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn debit(&self, address: &Address, amount: Chips) -> WalletResult<i64> {
        let required = i64::from(amount);
        let mut tx = self.pool.begin().await?;

        // Check and update in one statement so concurrent buy-ins cannot overdraw
        let row = sqlx::query(
            "UPDATE users
             SET balance = balance - $2
             WHERE address = $1 AND balance >= $2
             RETURNING balance",
        )
        .bind(address.as_str())
        .bind(required)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(row) = row {
            tx.commit().await?;
            return Ok(row.get("balance"));
        }

        // Either the user doesn't exist or the balance is short
        let current = sqlx::query("SELECT balance FROM users WHERE address = $1")
            .bind(address.as_str())
            .fetch_optional(&mut *tx)
            .await?;
        tx.rollback().await?;

        match current {
            Some(row) => Err(WalletError::InsufficientBalance {
                available: row.get("balance"),
                required,
            }),
            None => Err(WalletError::UserNotFound(address.to_string())),
        }
    }

    async fn credit(&self, address: &Address, amount: Chips) -> WalletResult<i64> {
        let row = sqlx::query(
            "UPDATE users
             SET balance = balance + $2
             WHERE address = $1
             RETURNING balance",
        )
        .bind(address.as_str())
        .bind(i64::from(amount))
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| row.get("balance"))
            .ok_or_else(|| WalletError::UserNotFound(address.to_string()))
    }
}
