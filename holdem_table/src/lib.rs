//! # Hold'em Table
//!
//! A six-seat Texas Hold'em table engine.
//!
//! The engine is a synchronous state machine ([`TableState`]) driven by
//! player actions and a logical clock. Every delay (blind animation, turn
//! countdown, street reveals during a lockup, the pause after settlement)
//! is a scheduled continuation tagged with the hand epoch it was queued in,
//! so a continuation that outlives its turn is dropped instead of acting on
//! a newer one.
//!
//! ## Core Modules
//!
//! - [`game`]: Seats, betting rounds, settlement and per-viewer snapshots
//! - [`table`]: Async actor that owns one table, plus a multi-table manager
//! - [`wallet`]: Balance store used for buy-ins and cash-outs
//! - [`db`]: PostgreSQL connection pool
//!
//! ## Example
//!
//! ```
//! use holdem_table::{Address, GameSettings, TableState};
//!
//! let mut table = TableState::new(GameSettings::default());
//! table.take_seat(Address::new("alice"), 0, 100).unwrap();
//! assert_eq!(table.occupied_seats(), 1);
//! ```

/// Core game logic, entities, and state machine.
pub mod game;
pub use game::{
    GameSettings, InvariantViolation, Snapshot, TableError, TableState, UserError,
    constants::{self, MAX_SEATS},
    entities::{self, Action, Address, Card, Chips, Round, SeatIndex, SeatStatus, TableEvent},
    functional, project,
};

/// PostgreSQL connection pooling.
pub mod db;

/// Table actors and the multi-table manager.
pub mod table;

/// Player balances.
pub mod wallet;
