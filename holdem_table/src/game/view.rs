//! Per-viewer snapshots of a table.
//!
//! A snapshot never carries another seat's hole cards before a showdown
//! reveals them, and never another seat's exact status.

use serde::{Deserialize, Serialize};

use super::{
    constants::MAX_SEATS,
    entities::{Address, Card, Chips, Round, Seat, SeatIndex, SeatStatus},
    state_machine::TableState,
};

/// Coarse table phase shown to every viewer.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableStatus {
    Idle,
    Running,
    Lockup,
    Showdown,
}

/// Public vocabulary for another seat's status.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PublicStatus {
    Empty,
    /// Seated, waiting for the next hand.
    Waiting,
    Idle,
    /// The seat whose turn it is.
    Active,
    /// Has chips committed this round.
    Bet,
    AllIn,
    /// Folded, leaving or disconnected.
    Out,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SeatView {
    pub position: SeatIndex,
    pub address: Option<Address>,
    pub stack: Chips,
    pub bet_amount: Chips,
    pub total_bet: Chips,
    pub status: PublicStatus,
    pub hole_cards: Vec<Card>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Snapshot {
    pub hand: u64,
    pub round: Round,
    pub status: TableStatus,
    pub community_cards: Vec<Card>,
    pub pot: Chips,
    pub current_bet: Chips,
    pub min_raise: Chips,
    pub countdown: u32,
    pub dealer_seat: SeatIndex,
    pub current_seat: Option<SeatIndex>,
    pub is_lockup: bool,
    pub last_delta: Chips,
    pub seats: Vec<SeatView>,
    /// The viewer's own seat, if seated.
    pub own_seat: Option<SeatIndex>,
    /// The viewer's exact status, if seated.
    pub own_status: Option<SeatStatus>,
    /// Per-seat winnings while the table is settling.
    pub prizes: Option<[Chips; MAX_SEATS]>,
}

fn public_status(seat: &Seat, is_current: bool) -> PublicStatus {
    if !seat.is_seated() {
        return PublicStatus::Empty;
    }
    if is_current {
        return PublicStatus::Active;
    }
    match seat.status {
        SeatStatus::Join => PublicStatus::Waiting,
        SeatStatus::None | SeatStatus::Check => PublicStatus::Idle,
        SeatStatus::SmallBlind | SeatStatus::BigBlind | SeatStatus::Call | SeatStatus::Raise => {
            PublicStatus::Bet
        }
        SeatStatus::AllIn => PublicStatus::AllIn,
        SeatStatus::Fold | SeatStatus::Disconnect | SeatStatus::Leave => PublicStatus::Out,
    }
}

fn table_status(table: &TableState) -> TableStatus {
    match table.round() {
        Round::Wait => TableStatus::Idle,
        Round::Settle => TableStatus::Showdown,
        _ if table.is_lockup() => TableStatus::Lockup,
        _ => TableStatus::Running,
    }
}

/// Build the snapshot `viewer` is allowed to see. `None` is a spectator.
pub fn project(table: &TableState, viewer: Option<&Address>) -> Snapshot {
    let reveal = table.round() == Round::Settle && table.showdown();
    let own_seat = viewer.and_then(|address| table.position_of(address));

    let seats = table
        .seats()
        .iter()
        .enumerate()
        .map(|(position, seat)| {
            let is_owner = own_seat == Some(position);
            let hole_cards = if is_owner || (reveal && seat.is_active()) {
                seat.hole_cards.clone()
            } else {
                vec![]
            };
            SeatView {
                position,
                address: seat.address.clone(),
                stack: seat.stack,
                bet_amount: seat.bet_amount,
                total_bet: seat.total_bet,
                status: public_status(seat, table.current_seat() == Some(position)),
                hole_cards,
            }
        })
        .collect();

    Snapshot {
        hand: table.hand(),
        round: table.round(),
        status: table_status(table),
        community_cards: table.community_cards().to_vec(),
        pot: table.pot_size(),
        current_bet: table.current_bet(),
        min_raise: table.min_raise(),
        countdown: table.countdown(),
        dealer_seat: table.dealer_seat(),
        current_seat: table.current_seat(),
        is_lockup: table.is_lockup(),
        last_delta: table.last_delta(),
        seats,
        own_seat,
        own_status: own_seat.map(|position| table.seats()[position].status),
        prizes: match table.round() {
            Round::Settle => table.last_settlement().map(|s| s.prizes),
            _ => None,
        },
    }
}
