use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::{Chips, SeatIndex};

/// Errors caused by a request that is not legal right now. The table is
/// left untouched when one of these is returned.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum UserError {
    #[error("user already seated")]
    AlreadySeated,
    #[error("buy-in must be between {min} and {max}")]
    BuyInOutOfRange { min: Chips, max: Chips },
    #[error("can't check, {to_call} to call")]
    CannotCheck { to_call: Chips },
    #[error("need {required} chips, have {available}")]
    InsufficientFunds { required: Chips, available: i64 },
    #[error("invalid address")]
    InvalidAddress,
    #[error("seat {0} does not exist")]
    InvalidSeat(SeatIndex),
    #[error("no hand in progress")]
    NoHandInProgress,
    #[error("not seated")]
    NotSeated,
    #[error("not your turn")]
    OutOfTurnAction,
    #[error("raise of {amount} is below the minimum of {min_raise}")]
    RaiseBelowMinimum { amount: Chips, min_raise: Chips },
    #[error("raise must lift the bet above {current_bet}")]
    RaiseNotAboveBet { current_bet: Chips },
    #[error("seat {0} is taken")]
    SeatTaken(SeatIndex),
    #[error("table is closed")]
    TableClosed,
    #[error("user does not exist")]
    UserDoesNotExist,
}

/// Broken table invariants. These are bugs, never user mistakes, and stop
/// the table.
#[derive(Clone, Debug, Eq, Error, PartialEq, Serialize)]
pub enum InvariantViolation {
    #[error("chips not conserved: expected {expected}, counted {counted}")]
    ChipConservation { expected: u64, counted: u64 },
    #[error("deck exhausted")]
    DeckExhausted,
    #[error("no active seats to choose from")]
    NoActiveSeats,
    #[error("settlement paid {paid} from a pot of {pot}")]
    SettlementMismatch { pot: u64, paid: u64 },
}

#[derive(Clone, Debug, Eq, Error, PartialEq, Serialize)]
pub enum TableError {
    #[error(transparent)]
    User(#[from] UserError),
    #[error("invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
}

impl TableError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Invariant(_))
    }
}
