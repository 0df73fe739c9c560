//! Hold'em table engine - betting rounds, settlement and views.
//!
//! This module provides the synchronous core of a single table:
//! - Seat and card entities
//! - Turn sequencing and round completion
//! - Side-pot settlement behind a pluggable hand ranker
//! - Per-viewer snapshots that hide private information

pub mod constants;
pub mod entities;
pub mod errors;
pub mod functional;
pub mod ranking;
pub mod schedule;
pub mod sequencer;
pub mod settlement;
pub mod state_machine;
pub mod view;

pub use errors::{InvariantViolation, TableError, UserError};
pub use ranking::{BestHandRanker, HandRanker, HandStrength};
pub use settlement::{Contender, PotSlice, Settlement};
pub use state_machine::{GameSettings, RoundOutcome, TableState};
pub use view::{PublicStatus, SeatView, Snapshot, TableStatus, project};
