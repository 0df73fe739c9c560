use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Deserializer, Serialize};
use std::{
    fmt,
    time::{SystemTime, UNIX_EPOCH},
};

use super::constants::HOLE_CARDS;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Spade,
    Diamond,
    Heart,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Club, Suit::Spade, Suit::Diamond, Suit::Heart];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Spade => "♠",
            Self::Diamond => "♦",
            Self::Heart => "♥",
        };
        write!(f, "{repr}")
    }
}

/// Placeholder for card values.
pub type Value = u8;

/// A card is a tuple of a value (ace=1u8 ... king=13u8) and a suit.
/// The evaluator promotes aces to 14 when they play high.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Value, pub Suit);

impl Card {
    /// Compact 1..=52 code, ordered by value then suit.
    pub fn code(&self) -> u8 {
        let suit = Suit::ALL
            .iter()
            .position(|s| *s == self.1)
            .unwrap_or_default() as u8;
        (self.0 - 1) * 4 + suit + 1
    }

    pub fn from_code(code: u8) -> Option<Self> {
        if !(1..=52).contains(&code) {
            return None;
        }
        let idx = code - 1;
        Some(Self(idx / 4 + 1, Suit::ALL[usize::from(idx % 4)]))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = match self.0 {
            1 | 14 => "A",
            11 => "J",
            12 => "Q",
            13 => "K",
            v => &v.to_string(),
        };
        let repr = format!("{value}/{}", self.1);
        write!(f, "{repr:>4}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Rank {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::HighCard => "hi",
            Self::OnePair => "1p",
            Self::TwoPair => "2p",
            Self::ThreeOfAKind => "3k",
            Self::Straight => "s8",
            Self::Flush => "fs",
            Self::FullHouse => "fh",
            Self::FourOfAKind => "4k",
            Self::StraightFlush => "sf",
        };
        write!(f, "{repr}")
    }
}

/// A ranked hand. Ordering is rank first, then the tiebreak values in
/// significance order, so equal `SubHand`s split a pot.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct SubHand {
    pub rank: Rank,
    pub values: Vec<Value>,
}

/// A single-use deck. A new one is shuffled for every hand.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// Build a fresh deck and shuffle it with a Fisher-Yates pass driven by
    /// a PRNG seeded from `seed`, or from the wall clock when `None`.
    pub fn shuffled(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(clock_seed);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut deck = Self::default();
        deck.cards.shuffle(&mut rng);
        deck
    }

    /// Take the next card off the top of the deck.
    pub fn deal_card(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }
}

impl Default for Deck {
    fn default() -> Self {
        let cards = (1u8..=13)
            .flat_map(|value| Suit::ALL.into_iter().map(move |suit| Card(value, suit)))
            .collect();
        Self { cards }
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

/// Type alias for whole chips. Stacks, bets, pots and buy-ins are all
/// counted in whole chips.
pub type Chips = u32;

/// Type alias for seat positions (0..MAX_SEATS).
pub type SeatIndex = usize;

/// Identity of a player at the table.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Address(String);

impl Address {
    /// Longest address kept, in characters
    pub const MAX_LENGTH: usize = 64;

    pub fn new(s: &str) -> Self {
        let address: String = s
            .trim()
            .chars()
            .take(Self::MAX_LENGTH)
            .map(|c| if c.is_ascii_whitespace() { '_' } else { c })
            .collect();
        Self(address)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Address {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

/// Per-seat status within a hand.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatStatus {
    /// In the hand, no voluntary action yet this round.
    #[default]
    None,
    /// Seated mid-hand; dealt in from the next hand.
    Join,
    SmallBlind,
    BigBlind,
    Check,
    Call,
    Raise,
    AllIn,
    Fold,
    Disconnect,
    Leave,
}

impl SeatStatus {
    /// Statuses that remove a seat from turn order and pot contention.
    pub fn is_out(&self) -> bool {
        matches!(self, Self::Fold | Self::Join | Self::Leave | Self::Disconnect)
    }

    /// Whether the seat has acted voluntarily during the current round.
    /// Posting a blind does not count.
    pub fn has_acted(&self) -> bool {
        !matches!(self, Self::None | Self::SmallBlind | Self::BigBlind)
    }
}

impl fmt::Display for SeatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::None => "none",
            Self::Join => "join",
            Self::SmallBlind => "small blind",
            Self::BigBlind => "big blind",
            Self::Check => "check",
            Self::Call => "call",
            Self::Raise => "raise",
            Self::AllIn => "all-in",
            Self::Fold => "fold",
            Self::Disconnect => "disconnect",
            Self::Leave => "leave",
        };
        write!(f, "{repr}")
    }
}

/// Hand phase of a table.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Round {
    #[default]
    Wait,
    Preflop,
    Flop,
    Turn,
    River,
    Settle,
}

impl Round {
    /// Whether a betting round is in progress.
    pub fn is_betting(&self) -> bool {
        matches!(self, Self::Preflop | Self::Flop | Self::Turn | Self::River)
    }

    /// The street that follows this one and the number of community cards
    /// it reveals.
    pub fn next_street(&self) -> Option<(Round, usize)> {
        match self {
            Self::Preflop => Some((Self::Flop, 3)),
            Self::Flop => Some((Self::Turn, 1)),
            Self::Turn => Some((Self::River, 1)),
            _ => None,
        }
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Wait => "wait",
            Self::Preflop => "preflop",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
            Self::Settle => "settle",
        };
        write!(f, "{repr}")
    }
}

/// One chair at the table.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Seat {
    /// `None` when the chair is empty.
    pub address: Option<Address>,
    /// Chips not in play.
    pub stack: Chips,
    /// Chips committed this betting round.
    pub bet_amount: Chips,
    /// Chips committed this hand, across all rounds.
    pub total_bet: Chips,
    pub status: SeatStatus,
    pub hole_cards: Vec<Card>,
}

impl Seat {
    pub fn new(address: Address, stack: Chips, status: SeatStatus) -> Self {
        Self {
            address: Some(address),
            stack,
            status,
            ..Default::default()
        }
    }

    pub fn is_seated(&self) -> bool {
        self.address.is_some()
    }

    pub fn is_occupied_by(&self, address: &Address) -> bool {
        self.address.as_ref() == Some(address)
    }

    /// Seated and still contesting the current hand.
    pub fn is_active(&self) -> bool {
        self.is_seated() && !self.status.is_out()
    }

    /// Active and still able to put chips in.
    pub fn can_act(&self) -> bool {
        self.is_active() && self.status != SeatStatus::AllIn
    }

    /// Whether the seat may be dealt into the next hand.
    pub fn is_ready(&self) -> bool {
        self.is_seated()
            && self.stack > 0
            && !matches!(self.status, SeatStatus::Leave | SeatStatus::Disconnect)
    }

    /// Reset per-hand state and deal in.
    pub fn reset_for_hand(&mut self, hole_cards: Vec<Card>) {
        debug_assert!(hole_cards.len() == HOLE_CARDS);
        self.bet_amount = 0;
        self.total_bet = 0;
        self.status = SeatStatus::None;
        self.hole_cards = hole_cards;
    }

    /// Move up to `amount` from the stack into the current bet. Returns the
    /// chips actually moved; an emptied stack forces all-in.
    pub fn stake(&mut self, amount: Chips) -> Chips {
        let moved = amount.min(self.stack);
        self.stack -= moved;
        self.bet_amount += moved;
        self.total_bet += moved;
        if self.stack == 0 {
            self.status = SeatStatus::AllIn;
        }
        moved
    }
}

/// Player actions during a betting round.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(tag = "type", content = "amount", rename_all = "snake_case")]
pub enum Action {
    AllIn,
    Call,
    Check,
    Fold,
    /// Chips added to the seat's bet by this action.
    Raise(Chips),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllIn => write!(f, "all-in"),
            Self::Call => write!(f, "call"),
            Self::Check => write!(f, "check"),
            Self::Fold => write!(f, "fold"),
            Self::Raise(amount) => write!(f, "raise {amount}"),
        }
    }
}

/// Things that happened at a table, drained by the owner after each
/// mutation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TableEvent {
    Seated {
        address: Address,
        position: SeatIndex,
        buy_in: Chips,
    },
    HandStarted {
        hand: u64,
        dealer: SeatIndex,
    },
    BlindPosted {
        position: SeatIndex,
        amount: Chips,
    },
    Acted {
        position: SeatIndex,
        action: Action,
        amount: Chips,
    },
    TurnExpired {
        position: SeatIndex,
    },
    StreetDealt {
        round: Round,
        cards: Vec<Card>,
    },
    Lockup,
    Prize {
        position: SeatIndex,
        amount: Chips,
    },
    /// A seat was vacated with `stack` chips still on it.
    Unseated {
        address: Address,
        position: SeatIndex,
        stack: Chips,
    },
}
